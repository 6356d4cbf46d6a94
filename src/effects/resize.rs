use image::imageops::{self, FilterType};

use crate::{
    config::{CropRegion, FitPolicy},
    foundation::{
        core::Bitmap,
        error::{OverlayError, OverlayResult},
    },
};

/// Fits `src` into a `width` x `height` frame according to `policy`.
///
/// `Contain` pads with fully transparent pixels; `Cover` crops around the center.
pub fn fit(
    src: &Bitmap,
    width: u32,
    height: u32,
    policy: FitPolicy,
    filter: FilterType,
) -> OverlayResult<Bitmap> {
    src.ensure_non_empty("resize")?;
    if width == 0 || height == 0 {
        return Err(OverlayError::composite(format!(
            "resize target must have non-zero area, got {width}x{height}"
        )));
    }
    if src.dimensions() == (width, height) {
        return Ok(src.clone());
    }

    let (sw, sh) = (src.width() as f64, src.height() as f64);
    let (tw, th) = (f64::from(width), f64::from(height));
    let model = src.color_model();

    let out = match policy {
        FitPolicy::Fill => imageops::resize(src.pixels(), width, height, filter),
        FitPolicy::Contain => {
            let scale = (tw / sw).min(th / sh);
            let nw = scaled_dim(sw, scale).min(width);
            let nh = scaled_dim(sh, scale).min(height);
            let scaled = imageops::resize(src.pixels(), nw, nh, filter);
            let mut canvas = image::RgbaImage::new(width, height);
            let x = i64::from((width - nw) / 2);
            let y = i64::from((height - nh) / 2);
            imageops::replace(&mut canvas, &scaled, x, y);
            canvas
        }
        FitPolicy::Cover => {
            let scale = (tw / sw).max(th / sh);
            let nw = scaled_dim(sw, scale).max(width);
            let nh = scaled_dim(sh, scale).max(height);
            let scaled = imageops::resize(src.pixels(), nw, nh, filter);
            let x = (nw - width) / 2;
            let y = (nh - height) / 2;
            imageops::crop_imm(&scaled, x, y, width, height).to_image()
        }
    };

    tracing::trace!(
        from_w = src.width(),
        from_h = src.height(),
        to_w = width,
        to_h = height,
        ?policy,
        "fit"
    );
    Ok(Bitmap::new(out, model))
}

/// Crops the fractional `region` out of `src`.
pub fn crop(src: &Bitmap, region: CropRegion) -> OverlayResult<Bitmap> {
    src.ensure_non_empty("crop")?;
    let (w, h) = (src.width() as f32, src.height() as f32);

    let x0 = (region.x * w).round().clamp(0.0, w) as u32;
    let y0 = (region.y * h).round().clamp(0.0, h) as u32;
    let x1 = ((region.x + region.width) * w).round().clamp(0.0, w) as u32;
    let y1 = ((region.y + region.height) * h).round().clamp(0.0, h) as u32;

    if x1 <= x0 || y1 <= y0 {
        return Err(OverlayError::extraction(format!(
            "crop region {region:?} resolves to zero area on a {}x{} bitmap",
            src.width(),
            src.height()
        )));
    }

    let out = imageops::crop_imm(src.pixels(), x0, y0, x1 - x0, y1 - y0).to_image();
    Ok(Bitmap::new(out, src.color_model()))
}

fn scaled_dim(v: f64, scale: f64) -> u32 {
    (v * scale).round().max(1.0) as u32
}

#[cfg(test)]
#[path = "../../tests/unit/effects/resize.rs"]
mod tests;
