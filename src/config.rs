use std::path::Path;

use anyhow::Context as _;
use image::imageops::FilterType;

use crate::{
    effects::color::{ColorMatrix, ToneAdjustment},
    foundation::{
        core::Canvas,
        error::{OverlayError, OverlayResult},
    },
    render::composite::{Anchor, BlendMode, Placement},
};

pub const DEFAULT_INPUT_SIZE_LIMIT_BYTES: u64 = 16 * 1024 * 1024;

/// How a bitmap is fitted into a target rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitPolicy {
    /// Scale to cover the target and crop the overflow, centered.
    Cover,
    /// Scale to fit inside the target and pad with transparency, centered.
    Contain,
    /// Stretch to the target, ignoring aspect ratio.
    Fill,
}

/// Where the output canvas size comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CanvasPolicy {
    /// `canvasWidth` x `canvasHeight`.
    Fixed,
    /// The decoded background's own dimensions.
    Background,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResizeFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl ResizeFilter {
    pub fn filter_type(self) -> FilterType {
        match self {
            Self::Nearest => FilterType::Nearest,
            Self::Triangle => FilterType::Triangle,
            Self::CatmullRom => FilterType::CatmullRom,
            Self::Gaussian => FilterType::Gaussian,
            Self::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Sub-rectangle expressed as fractions (0..=1) of an image's width and height.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CropRegion {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl CropRegion {
    /// The bottom `fraction` of the image, full width.
    pub fn bottom(fraction: f32) -> Self {
        Self {
            x: 0.0,
            y: 1.0 - fraction,
            width: 1.0,
            height: fraction,
        }
    }
}

/// Size expressed as fractions of the canvas.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RegionSize {
    pub width: f32,
    pub height: f32,
}

impl RegionSize {
    /// Resolves against `canvas`, flooring like the pixel offsets do. Never returns zero.
    pub fn resolve(self, canvas: Canvas) -> (u32, u32) {
        let w = (canvas.width as f32 * self.width).floor().max(1.0) as u32;
        let h = (canvas.height as f32 * self.height).floor().max(1.0) as u32;
        (w, h)
    }
}

/// Every tunable of the overlay pipeline.
///
/// Field names serialize in camelCase, matching the JSON config file format.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OverlayConfig {
    pub canvas_policy: CanvasPolicy,
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub background_fit_policy: FitPolicy,
    /// JPEG quality for the background round-trip; `None` keeps it lossless.
    pub background_encode_quality: Option<u8>,

    pub route_color_matrix: ColorMatrix,
    pub route_tone_adjustment: ToneAdjustment,
    pub route_threshold: u8,
    /// Negate the thresholded mask, keeping pixels below the cutoff instead.
    pub route_invert: bool,
    pub route_contrast_gain: Option<f32>,
    pub route_resize_fit: FitPolicy,
    pub route_blend_mode: BlendMode,
    pub route_opacity: f32,
    pub route_placement: Placement,

    pub stats_crop_region: Option<CropRegion>,
    pub stats_tone_adjustment: ToneAdjustment,
    pub stats_threshold: u8,
    pub stats_invert: bool,
    pub stats_contrast_gain: Option<f32>,
    pub stats_region: RegionSize,
    pub stats_resize_fit: FitPolicy,
    pub stats_blend_mode: BlendMode,
    pub stats_opacity: f32,
    pub stats_placement: Placement,

    pub resize_filter: ResizeFilter,
    pub input_size_limit_bytes: u64,
    pub max_decoded_pixels: u64,
    pub processing_timeout_ms: Option<u64>,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            canvas_policy: CanvasPolicy::Fixed,
            canvas_width: 1080,
            canvas_height: 1920,
            background_fit_policy: FitPolicy::Cover,
            background_encode_quality: Some(80),

            // Every row is the red excess `2r - g - b`; the map's neutrals land at 0.
            route_color_matrix: ColorMatrix([
                [2.0, -1.0, -1.0],
                [2.0, -1.0, -1.0],
                [2.0, -1.0, -1.0],
            ]),
            route_tone_adjustment: ToneAdjustment {
                brightness: 1.4,
                ..ToneAdjustment::IDENTITY
            },
            route_threshold: 200,
            route_invert: false,
            route_contrast_gain: Some(2.0),
            route_resize_fit: FitPolicy::Contain,
            route_blend_mode: BlendMode::Screen,
            route_opacity: 0.9,
            route_placement: Placement::Anchor(Anchor::Center),

            stats_crop_region: None,
            stats_tone_adjustment: ToneAdjustment {
                brightness: 2.5,
                contrast: 5.0,
                ..ToneAdjustment::IDENTITY
            },
            stats_threshold: 225,
            stats_invert: false,
            stats_contrast_gain: Some(2.0),
            stats_region: RegionSize {
                width: 0.8,
                height: 0.1,
            },
            stats_resize_fit: FitPolicy::Contain,
            stats_blend_mode: BlendMode::Screen,
            stats_opacity: 0.95,
            stats_placement: Placement::Relative {
                left: 0.1,
                top: 0.85,
            },

            resize_filter: ResizeFilter::Triangle,
            input_size_limit_bytes: DEFAULT_INPUT_SIZE_LIMIT_BYTES,
            max_decoded_pixels: 40_000_000,
            processing_timeout_ms: Some(30_000),
        }
    }
}

/// Named starting points for [`OverlayConfig`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Red/orange route on a light map.
    Warm,
    /// Blue route on a light or dark map, including light-blue water.
    Blue,
}

impl Preset {
    pub fn config(self) -> OverlayConfig {
        match self {
            Self::Warm => OverlayConfig::default(),
            Self::Blue => OverlayConfig::blue_route(),
        }
    }
}

impl OverlayConfig {
    pub fn blue_route() -> Self {
        Self {
            // Blue excess `2b - r - g`; water around (170, 210, 240) stays under the cutoff.
            route_color_matrix: ColorMatrix([
                [-1.0, -1.0, 2.0],
                [-1.0, -1.0, 2.0],
                [-1.0, -1.0, 2.0],
            ]),
            route_tone_adjustment: ToneAdjustment {
                brightness: 1.4,
                ..ToneAdjustment::IDENTITY
            },
            route_threshold: 210,
            route_contrast_gain: Some(2.5),
            ..Self::default()
        }
    }

    /// Parses a JSON config, filling keys the document omits from `base`.
    pub fn from_json_with_base(json: &str, base: &OverlayConfig) -> OverlayResult<Self> {
        let overrides: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| OverlayError::config(format!("parse config JSON: {e}")))?;
        let serde_json::Value::Object(overrides) = overrides else {
            return Err(OverlayError::config("config JSON must be an object"));
        };

        let mut merged = serde_json::to_value(base)
            .map_err(|e| OverlayError::config(format!("serialize base config: {e}")))?;
        if let serde_json::Value::Object(map) = &mut merged {
            for (key, value) in overrides {
                map.insert(key, value);
            }
        }

        let cfg: OverlayConfig = serde_json::from_value(merged)
            .map_err(|e| OverlayError::config(format!("invalid config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: &Path, base: &OverlayConfig) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        let cfg = Self::from_json_with_base(&json, base)
            .with_context(|| format!("load config '{}'", path.display()))?;
        Ok(cfg)
    }

    /// The output canvas for a background of the given dimensions.
    pub fn canvas_for(&self, background: (u32, u32)) -> OverlayResult<Canvas> {
        match self.canvas_policy {
            CanvasPolicy::Fixed => Canvas::new(self.canvas_width, self.canvas_height),
            CanvasPolicy::Background => Canvas::new(background.0, background.1),
        }
    }

    pub fn validate(&self) -> OverlayResult<()> {
        if self.canvas_width == 0 || self.canvas_height == 0 {
            return Err(OverlayError::config("canvasWidth and canvasHeight must be > 0"));
        }
        if let Some(q) = self.background_encode_quality
            && !(1..=100).contains(&q)
        {
            return Err(OverlayError::config(
                "backgroundEncodeQuality must be within 1..=100",
            ));
        }
        if !self.route_color_matrix.is_finite() {
            return Err(OverlayError::config("routeColorMatrix entries must be finite"));
        }
        self.route_tone_adjustment.validate("routeToneAdjustment")?;
        self.stats_tone_adjustment.validate("statsToneAdjustment")?;
        check_gain("routeContrastGain", self.route_contrast_gain)?;
        check_gain("statsContrastGain", self.stats_contrast_gain)?;
        check_unit("routeOpacity", self.route_opacity)?;
        check_unit("statsOpacity", self.stats_opacity)?;
        self.route_placement.validate("routePlacement")?;
        self.stats_placement.validate("statsPlacement")?;

        if let Some(crop) = self.stats_crop_region {
            check_unit("statsCropRegion.x", crop.x)?;
            check_unit("statsCropRegion.y", crop.y)?;
            check_extent("statsCropRegion.width", crop.width)?;
            check_extent("statsCropRegion.height", crop.height)?;
        }
        check_extent("statsRegion.width", self.stats_region.width)?;
        check_extent("statsRegion.height", self.stats_region.height)?;

        if self.input_size_limit_bytes == 0 {
            return Err(OverlayError::config("inputSizeLimitBytes must be > 0"));
        }
        if self.max_decoded_pixels == 0 {
            return Err(OverlayError::config("maxDecodedPixels must be > 0"));
        }
        if self.processing_timeout_ms == Some(0) {
            return Err(OverlayError::config(
                "processingTimeoutMs must be > 0 when set",
            ));
        }
        Ok(())
    }
}

fn check_unit(name: &str, v: f32) -> OverlayResult<()> {
    if !v.is_finite() || !(0.0..=1.0).contains(&v) {
        return Err(OverlayError::config(format!(
            "{name} must be finite and within 0..=1"
        )));
    }
    Ok(())
}

fn check_extent(name: &str, v: f32) -> OverlayResult<()> {
    check_unit(name, v)?;
    if v <= 0.0 {
        return Err(OverlayError::config(format!("{name} must be > 0")));
    }
    Ok(())
}

fn check_gain(name: &str, gain: Option<f32>) -> OverlayResult<()> {
    match gain {
        Some(g) if !g.is_finite() || g <= 0.0 => Err(OverlayError::config(format!(
            "{name} must be finite and > 0"
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
