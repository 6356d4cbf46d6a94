use crate::foundation::{
    core::{Bitmap, Canvas},
    error::{OverlayError, OverlayResult},
    math::clamp_u8,
};

pub type Rgba8 = [u8; 4];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlendMode {
    /// Source-over.
    Normal,
    /// `1 - (1 - base) * (1 - layer)`; always lightens.
    #[default]
    Screen,
    Multiply,
    /// Linear dodge, saturating at white.
    Add,
}

impl BlendMode {
    fn apply(self, cb: f32, cs: f32) -> f32 {
        match self {
            Self::Normal => cs,
            Self::Screen => cb + cs - cb * cs,
            Self::Multiply => cb * cs,
            Self::Add => (cb + cs).min(1.0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Anchor {
    Center,
    North,
    South,
    East,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

/// Where a layer's top-left corner lands on the canvas.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Placement {
    /// Absolute pixel offset.
    Offset { left: i64, top: i64 },
    /// Offset as fractions of the canvas size, floored to pixels.
    Relative { left: f32, top: f32 },
    /// Gravity-style alignment of the layer inside the canvas.
    Anchor(Anchor),
}

impl Placement {
    pub fn resolve(self, canvas: Canvas, layer: (u32, u32)) -> OverlayResult<(i64, i64)> {
        match self {
            Self::Offset { left, top } => Ok((left, top)),
            Self::Relative { left, top } => {
                if !left.is_finite() || !top.is_finite() {
                    return Err(OverlayError::composite(
                        "relative placement must be finite",
                    ));
                }
                let x = (f64::from(canvas.width) * f64::from(left)).floor() as i64;
                let y = (f64::from(canvas.height) * f64::from(top)).floor() as i64;
                Ok((x, y))
            }
            Self::Anchor(anchor) => {
                let free_x = i64::from(canvas.width) - i64::from(layer.0);
                let free_y = i64::from(canvas.height) - i64::from(layer.1);
                let (fx, fy) = match anchor {
                    Anchor::Center => (1, 1),
                    Anchor::North => (1, 0),
                    Anchor::South => (1, 2),
                    Anchor::East => (2, 1),
                    Anchor::West => (0, 1),
                    Anchor::NorthEast => (2, 0),
                    Anchor::NorthWest => (0, 0),
                    Anchor::SouthEast => (2, 2),
                    Anchor::SouthWest => (0, 2),
                };
                Ok((free_x * fx / 2, free_y * fy / 2))
            }
        }
    }

    pub fn validate(&self, name: &str) -> OverlayResult<()> {
        if let Self::Relative { left, top } = *self
            && (!left.is_finite() || !top.is_finite() || !(0.0..=1.0).contains(&left)
                || !(0.0..=1.0).contains(&top))
        {
            return Err(OverlayError::config(format!(
                "{name}: relative offsets must be finite and within 0..=1"
            )));
        }
        Ok(())
    }
}

/// A bitmap ready to be blended onto the canvas.
#[derive(Clone, Debug)]
pub struct Layer {
    pub bitmap: Bitmap,
    pub blend: BlendMode,
    pub opacity: f32,
    pub placement: Placement,
}

/// Blends one straight-alpha pixel onto another.
///
/// Uses the separable-blend source-over formulation, so an opaque base reduces to
/// `base + coverage * (blend(base, src) - base)` with `coverage = src_alpha * opacity`.
pub fn blend_px(dst: Rgba8, src: Rgba8, mode: BlendMode, opacity: f32) -> Rgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let a_s = f32::from(src[3]) / 255.0 * opacity;
    let a_b = f32::from(dst[3]) / 255.0;
    let a_o = a_s + a_b * (1.0 - a_s);
    if a_o <= 0.0 {
        return [0, 0, 0, 0];
    }

    let mut out = [0u8; 4];
    for i in 0..3 {
        let cb = f32::from(dst[i]) / 255.0;
        let cs = f32::from(src[i]) / 255.0;
        let mixed = (1.0 - a_b) * cs + a_b * mode.apply(cb, cs);
        let premul = a_s * mixed + (1.0 - a_s) * a_b * cb;
        out[i] = clamp_u8(premul / a_o * 255.0);
    }
    out[3] = clamp_u8(a_o * 255.0);
    out
}

/// Paints `layers` onto a copy of `base` in order; later layers land on top.
/// Parts of a layer outside the base are clipped.
pub fn composite_layers(base: &Bitmap, layers: &[Layer]) -> OverlayResult<Bitmap> {
    let mut out = base.pixels().clone();
    for layer in layers {
        blend_onto(&mut out, layer)?;
    }
    Ok(Bitmap::new(out, base.color_model()))
}

fn blend_onto(out: &mut image::RgbaImage, layer: &Layer) -> OverlayResult<()> {
    let canvas = Canvas::new(out.width(), out.height())?;
    if layer.bitmap.is_empty() {
        return Err(OverlayError::composite(format!(
            "layer has zero size ({}x{})",
            layer.bitmap.width(),
            layer.bitmap.height()
        )));
    }

    let (ox, oy) = layer.placement.resolve(canvas, layer.bitmap.dimensions())?;
    let (lw, lh) = (i64::from(layer.bitmap.width()), i64::from(layer.bitmap.height()));
    let overflow = || OverlayError::composite("layer placement offset overflows");
    let x_end = ox.checked_add(lw).ok_or_else(overflow)?;
    let y_end = oy.checked_add(lh).ok_or_else(overflow)?;

    let x0 = ox.max(0);
    let y0 = oy.max(0);
    let x1 = x_end.min(i64::from(canvas.width));
    let y1 = y_end.min(i64::from(canvas.height));

    if x0 >= x1 || y0 >= y1 {
        tracing::debug!(ox, oy, lw, lh, "layer lies entirely outside the canvas; clipped");
        return Ok(());
    }
    if ox < 0 || oy < 0 || x_end > x1 || y_end > y1 {
        tracing::debug!(ox, oy, lw, lh, "layer clipped to canvas bounds");
    }

    let src = layer.bitmap.pixels();
    for y in y0..y1 {
        for x in x0..x1 {
            let s = src.get_pixel((x - ox) as u32, (y - oy) as u32).0;
            let d = out.get_pixel_mut(x as u32, y as u32);
            d.0 = blend_px(d.0, s, layer.blend, layer.opacity);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
