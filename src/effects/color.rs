use crate::foundation::{
    core::{Bitmap, ColorModel},
    error::{OverlayError, OverlayResult},
    math::{clamp_u8, luma_u8},
};

/// 3x3 linear recombination of the RGB channels; rows produce R', G', B'.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ColorMatrix(pub [[f32; 3]; 3]);

impl ColorMatrix {
    pub const IDENTITY: Self = Self([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]);

    pub fn scale(k: f32) -> Self {
        Self([[k, 0.0, 0.0], [0.0, k, 0.0], [0.0, 0.0, k]])
    }

    /// Saturation matrix (W3C filter-effects `saturate`); 1.0 is identity, 0.0 is gray.
    pub fn saturate(s: f32) -> Self {
        Self([
            [0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s],
            [0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s],
            [0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s],
        ])
    }

    /// Luminance-preserving hue rotation (W3C filter-effects `hue-rotate`).
    pub fn hue_rotate(degrees: f32) -> Self {
        let (s, c) = degrees.to_radians().sin_cos();
        Self([
            [
                0.213 + c * 0.787 - s * 0.213,
                0.715 - c * 0.715 - s * 0.715,
                0.072 - c * 0.072 + s * 0.928,
            ],
            [
                0.213 - c * 0.213 + s * 0.143,
                0.715 + c * 0.285 + s * 0.140,
                0.072 - c * 0.072 - s * 0.283,
            ],
            [
                0.213 - c * 0.213 - s * 0.787,
                0.715 - c * 0.715 + s * 0.715,
                0.072 + c * 0.928 + s * 0.072,
            ],
        ])
    }

    /// `self * rhs`: applying the product equals applying `rhs` first, then `self`.
    pub fn then_after(self, rhs: Self) -> Self {
        let (a, b) = (self.0, rhs.0);
        let mut out = [[0.0f32; 3]; 3];
        for (i, row) in out.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = (0..3).map(|k| a[i][k] * b[k][j]).sum();
            }
        }
        Self(out)
    }

    pub fn apply(&self, rgb: [f32; 3]) -> [f32; 3] {
        let m = &self.0;
        [
            m[0][0] * rgb[0] + m[0][1] * rgb[1] + m[0][2] * rgb[2],
            m[1][0] * rgb[0] + m[1][1] * rgb[1] + m[1][2] * rgb[2],
            m[2][0] * rgb[0] + m[2][1] * rgb[1] + m[2][2] * rgb[2],
        ]
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().flatten().all(|v| v.is_finite())
    }
}

/// Per-pixel tone controls. Unset fields default to identity.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ToneAdjustment {
    /// Multiplier on all channels.
    pub brightness: f32,
    /// 1.0 leaves saturation unchanged, 0.0 desaturates.
    pub saturation: f32,
    /// Multiplier on the distance from mid-gray (128).
    pub contrast: f32,
    /// Hue rotation in degrees.
    pub hue: f32,
}

impl ToneAdjustment {
    pub const IDENTITY: Self = Self {
        brightness: 1.0,
        saturation: 1.0,
        contrast: 1.0,
        hue: 0.0,
    };

    /// Brightness, then saturation, then hue, folded into one matrix.
    pub fn matrix(&self) -> ColorMatrix {
        ColorMatrix::hue_rotate(self.hue)
            .then_after(ColorMatrix::saturate(self.saturation))
            .then_after(ColorMatrix::scale(self.brightness))
    }

    pub fn validate(&self, name: &str) -> OverlayResult<()> {
        let fields = [
            ("brightness", self.brightness),
            ("saturation", self.saturation),
            ("contrast", self.contrast),
        ];
        for (field, v) in fields {
            if !v.is_finite() || v < 0.0 {
                return Err(OverlayError::config(format!(
                    "{name}.{field} must be finite and >= 0"
                )));
            }
        }
        if !self.hue.is_finite() {
            return Err(OverlayError::config(format!("{name}.hue must be finite")));
        }
        Ok(())
    }
}

impl Default for ToneAdjustment {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Recombines RGB through `matrix`. Requires a color source.
pub fn recombine(src: &Bitmap, matrix: &ColorMatrix) -> OverlayResult<Bitmap> {
    src.ensure_non_empty("recombine")?;
    if src.color_model() == ColorModel::Gray {
        return Err(OverlayError::extraction(
            "recombine: color matrix requested on a grayscale source",
        ));
    }
    Ok(src.map_pixels(ColorModel::Rgb, |[r, g, b, a]| {
        let out = matrix.apply([f32::from(r), f32::from(g), f32::from(b)]);
        [clamp_u8(out[0]), clamp_u8(out[1]), clamp_u8(out[2]), a]
    }))
}

/// Applies brightness, saturation, hue rotation and contrast, in that order.
pub fn modulate(src: &Bitmap, tone: &ToneAdjustment) -> OverlayResult<Bitmap> {
    src.ensure_non_empty("modulate")?;
    let matrix = tone.matrix();
    let contrast = tone.contrast;
    Ok(src.map_pixels(src.color_model(), |[r, g, b, a]| {
        let out = matrix.apply([f32::from(r), f32::from(g), f32::from(b)]);
        let c = |v: f32| clamp_u8((v - 128.0) * contrast + 128.0);
        [c(out[0]), c(out[1]), c(out[2]), a]
    }))
}

pub fn grayscale(src: &Bitmap) -> OverlayResult<Bitmap> {
    src.ensure_non_empty("grayscale")?;
    Ok(src.map_pixels(ColorModel::Gray, |[r, g, b, a]| {
        let y = luma_u8(r, g, b);
        [y, y, y, a]
    }))
}

/// Binarizes on luma: `>= cutoff` becomes white, everything else black.
pub fn threshold(src: &Bitmap, cutoff: u8) -> OverlayResult<Bitmap> {
    src.ensure_non_empty("threshold")?;
    Ok(src.map_pixels(ColorModel::Gray, |[r, g, b, a]| {
        let v = if luma_u8(r, g, b) >= cutoff { 255 } else { 0 };
        [v, v, v, a]
    }))
}

/// Inverts RGB; alpha is kept.
pub fn negate(src: &Bitmap) -> Bitmap {
    src.map_pixels(src.color_model(), |[r, g, b, a]| [255 - r, 255 - g, 255 - b, a])
}

/// `out = gain * in - gain * 128` on RGB, clamped.
pub fn linear_stretch(src: &Bitmap, gain: f32) -> Bitmap {
    let offset = -(gain * 128.0);
    src.map_pixels(src.color_model(), |[r, g, b, a]| {
        let f = |v: u8| clamp_u8(gain * f32::from(v) + offset);
        [f(r), f(g), f(b), a]
    })
}

/// White layer whose alpha is the source luma (scaled by the source alpha).
///
/// Black becomes fully transparent, white fully opaque.
pub fn luma_to_alpha(src: &Bitmap) -> Bitmap {
    src.map_pixels(ColorModel::Rgb, |[r, g, b, a]| {
        let coverage = crate::foundation::math::mul_div255_u8(
            u16::from(luma_u8(r, g, b)),
            u16::from(a),
        );
        [255, 255, 255, coverage]
    })
}

/// Number of pixels whose luma is 255.
pub fn count_white(src: &Bitmap) -> usize {
    src.pixels()
        .pixels()
        .filter(|p| luma_u8(p.0[0], p.0[1], p.0[2]) == 255)
        .count()
}

#[cfg(test)]
#[path = "../../tests/unit/effects/color.rs"]
mod tests;
