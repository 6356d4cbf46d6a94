use image::{DynamicImage, RgbaImage};

use crate::foundation::error::{OverlayError, OverlayResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> OverlayResult<Self> {
        if width == 0 || height == 0 {
            return Err(OverlayError::composite(format!(
                "canvas must have non-zero area, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }

    pub fn area(self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// Color model of the source a [`Bitmap`] was decoded from.
///
/// Pixels are always stored as RGBA8; this records whether the channels carry hue
/// information or are three copies of one luminance value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorModel {
    Rgb,
    Gray,
}

/// Straight (non-premultiplied) RGBA8 pixel grid.
///
/// Stages take a `&Bitmap` and return a fresh one, so a derived bitmap never aliases
/// its source.
#[derive(Clone, Debug, PartialEq)]
pub struct Bitmap {
    pixels: RgbaImage,
    color_model: ColorModel,
}

impl Bitmap {
    pub fn new(pixels: RgbaImage, color_model: ColorModel) -> Self {
        Self {
            pixels,
            color_model,
        }
    }

    pub fn from_rgba(pixels: RgbaImage) -> Self {
        Self::new(pixels, ColorModel::Rgb)
    }

    /// Wraps a decoded image, recording whether it had color channels.
    pub fn from_dynamic(img: DynamicImage) -> Self {
        let color_model = if img.color().has_color() {
            ColorModel::Rgb
        } else {
            ColorModel::Gray
        };
        Self::new(img.into_rgba8(), color_model)
    }

    /// Fully transparent bitmap.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self::from_rgba(RgbaImage::new(width, height))
    }

    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        Self::from_rgba(RgbaImage::from_pixel(width, height, image::Rgba(rgba)))
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    pub fn color_model(&self) -> ColorModel {
        self.color_model
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn into_pixels(self) -> RgbaImage {
        self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.pixels.get_pixel(x, y).0
    }

    /// Applies `f` to every pixel and returns the result as a new bitmap.
    pub fn map_pixels(&self, color_model: ColorModel, f: impl Fn([u8; 4]) -> [u8; 4]) -> Self {
        let mut out = self.pixels.clone();
        for px in out.pixels_mut() {
            px.0 = f(px.0);
        }
        Self::new(out, color_model)
    }

    /// Fails with an extraction error when the bitmap has no pixels.
    pub fn ensure_non_empty(&self, stage: &str) -> OverlayResult<()> {
        if self.is_empty() {
            return Err(OverlayError::extraction(format!(
                "{stage}: source bitmap has zero area ({}x{})",
                self.width(),
                self.height()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
