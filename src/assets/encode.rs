use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::{ExtendedColorType, ImageEncoder as _, ImageFormat, codecs::jpeg::JpegEncoder};

use crate::foundation::{
    core::Bitmap,
    error::{OverlayError, OverlayResult},
};

pub const PNG_MIME: &str = "image/png";

/// Lossless RGBA PNG.
pub fn encode_png(bitmap: &Bitmap) -> OverlayResult<Vec<u8>> {
    if bitmap.is_empty() {
        return Err(OverlayError::encode("cannot encode an empty bitmap"));
    }
    let mut out = Vec::new();
    image::codecs::png::PngEncoder::new(&mut out)
        .write_image(
            bitmap.pixels().as_raw(),
            bitmap.width(),
            bitmap.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| OverlayError::encode(format!("png: {e}")))?;
    Ok(out)
}

pub fn to_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

pub fn encode_png_data_uri(bitmap: &Bitmap) -> OverlayResult<String> {
    let png = encode_png(bitmap)?;
    tracing::debug!(bytes = png.len(), "encoded output png");
    Ok(to_data_uri(PNG_MIME, &png))
}

/// Passes `bitmap` through a lossy JPEG encode/decode at `quality` (1..=100).
///
/// Alpha is dropped; the result is opaque.
pub fn jpeg_round_trip(bitmap: &Bitmap, quality: u8) -> OverlayResult<Bitmap> {
    if bitmap.is_empty() {
        return Err(OverlayError::encode("cannot encode an empty bitmap"));
    }
    let rgb = image::DynamicImage::ImageRgba8(bitmap.pixels().clone()).to_rgb8();

    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100))
        .encode_image(&rgb)
        .map_err(|e| OverlayError::encode(format!("jpeg q{quality}: {e}")))?;

    let decoded = image::load_from_memory_with_format(&buf, ImageFormat::Jpeg)
        .map_err(|e| OverlayError::encode(format!("re-read jpeg: {e}")))?;
    Ok(Bitmap::new(decoded.into_rgba8(), bitmap.color_model()))
}

/// Writes a PNG file, creating parent directories as needed.
pub fn write_png(path: &std::path::Path, bitmap: &Bitmap) -> anyhow::Result<()> {
    use anyhow::Context as _;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create dir '{}'", parent.display()))?;
    }
    let png = encode_png(bitmap)?;
    std::fs::write(path, png).with_context(|| format!("write '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/encode.rs"]
mod tests;
