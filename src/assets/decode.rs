use std::io::Cursor;

use base64::{
    Engine as _,
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};
use image::ImageFormat;

use crate::foundation::{
    core::Bitmap,
    error::{OverlayError, OverlayResult},
};

const BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// A payload split into its declared MIME type (if any) and base64 body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DataUri<'a> {
    pub mime: Option<&'a str>,
    pub payload: &'a str,
}

/// Container formats the decoder accepts, identified by magic bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceFormat {
    Jpeg,
    Png,
    WebP,
    Heif,
}

impl SourceFormat {
    fn image_format(self) -> Option<ImageFormat> {
        match self {
            Self::Jpeg => Some(ImageFormat::Jpeg),
            Self::Png => Some(ImageFormat::Png),
            Self::WebP => Some(ImageFormat::WebP),
            Self::Heif => None,
        }
    }
}

/// Splits `data:<mime>;base64,<payload>`; anything without a `data:` prefix is raw base64.
pub fn split_data_uri(input: &str) -> OverlayResult<DataUri<'_>> {
    let input = input.trim();
    let Some(rest) = input.strip_prefix("data:") else {
        return Ok(DataUri {
            mime: None,
            payload: input,
        });
    };

    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| OverlayError::decode("data URI is missing the ',' separator"))?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or_else(|| OverlayError::decode("only base64-encoded data URIs are supported"))?;

    Ok(DataUri {
        mime: (!mime.is_empty()).then_some(mime),
        payload,
    })
}

/// Rejects inputs whose combined encoded length exceeds `limit`, before any decoding.
pub fn check_payload_size(inputs: &[&str], limit: u64) -> OverlayResult<()> {
    let actual: u64 = inputs.iter().map(|s| s.len() as u64).sum();
    if actual > limit {
        return Err(OverlayError::payload_too_large(actual, limit));
    }
    Ok(())
}

/// Standard-alphabet base64; padding is optional and embedded whitespace is ignored.
pub fn decode_base64(payload: &str) -> OverlayResult<Vec<u8>> {
    let decoded = if payload.bytes().any(|b| b.is_ascii_whitespace()) {
        let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        BASE64.decode(compact)
    } else {
        BASE64.decode(payload)
    };
    let bytes =
        decoded.map_err(|e| OverlayError::decode(format!("malformed base64 payload: {e}")))?;

    if bytes.is_empty() {
        return Err(OverlayError::decode("image payload is empty"));
    }
    Ok(bytes)
}

pub fn sniff_format(bytes: &[u8]) -> OverlayResult<SourceFormat> {
    let kind = infer::get(bytes)
        .ok_or_else(|| OverlayError::decode("unrecognized image signature"))?;
    match kind.mime_type() {
        "image/jpeg" => Ok(SourceFormat::Jpeg),
        "image/png" => Ok(SourceFormat::Png),
        "image/webp" => Ok(SourceFormat::WebP),
        "image/heif" | "image/heic" => Ok(SourceFormat::Heif),
        other => Err(OverlayError::decode(format!(
            "unsupported image format '{other}' (expected JPEG, PNG, WebP or HEIC)"
        ))),
    }
}

/// Decodes raw container bytes into a bitmap, refusing images above `max_pixels`.
pub fn decode_image(bytes: &[u8], max_pixels: u64) -> OverlayResult<Bitmap> {
    let format = sniff_format(bytes)?;
    let Some(image_format) = format.image_format() else {
        return decode_heif(bytes, max_pixels);
    };

    let (w, h) = image::ImageReader::with_format(Cursor::new(bytes), image_format)
        .into_dimensions()
        .map_err(|e| OverlayError::decode(format!("read {format:?} header: {e}")))?;
    check_pixel_count(w, h, max_pixels)?;

    let mut reader = image::ImageReader::with_format(Cursor::new(bytes), image_format);
    let mut limits = image::Limits::default();
    limits.max_image_width = Some(w);
    limits.max_image_height = Some(h);
    limits.max_alloc = Some(max_pixels.saturating_mul(8));
    reader.limits(limits);

    let img = reader
        .decode()
        .map_err(|e| OverlayError::decode(format!("decode {format:?}: {e}")))?;
    Ok(Bitmap::from_dynamic(img))
}

/// Full decoder entry point: data URI or raw base64 in, bitmap out.
#[tracing::instrument(skip(input), fields(input_len = input.len()))]
pub fn decode_payload(input: &str, max_pixels: u64) -> OverlayResult<Bitmap> {
    let uri = split_data_uri(input)?;
    let bytes = decode_base64(uri.payload)?;
    let bitmap = decode_image(&bytes, max_pixels)?;
    tracing::debug!(
        declared_mime = uri.mime.unwrap_or("-"),
        bytes = bytes.len(),
        width = bitmap.width(),
        height = bitmap.height(),
        "decoded image payload"
    );
    Ok(bitmap)
}

fn check_pixel_count(width: u32, height: u32, max_pixels: u64) -> OverlayResult<()> {
    let pixels = u64::from(width) * u64::from(height);
    if pixels == 0 {
        return Err(OverlayError::decode("image has zero area"));
    }
    if pixels > max_pixels {
        return Err(OverlayError::decode(format!(
            "image is {width}x{height} ({pixels} px), above the {max_pixels} px limit"
        )));
    }
    Ok(())
}

#[cfg(feature = "heic")]
fn decode_heif(bytes: &[u8], max_pixels: u64) -> OverlayResult<Bitmap> {
    use libheif_rs::{ColorSpace, HeifContext, LibHeif, RgbChroma};

    let lib = LibHeif::new();
    let ctx = HeifContext::read_from_bytes(bytes)
        .map_err(|e| OverlayError::decode(format!("read HEIF container: {e}")))?;
    let handle = ctx
        .primary_image_handle()
        .map_err(|e| OverlayError::decode(format!("HEIF primary image: {e}")))?;
    check_pixel_count(handle.width(), handle.height(), max_pixels)?;

    let decoded = lib
        .decode(&handle, ColorSpace::Rgb(RgbChroma::Rgb), None)
        .map_err(|e| OverlayError::decode(format!("decode HEIF: {e}")))?;
    let planes = decoded.planes();
    let plane = planes
        .interleaved
        .ok_or_else(|| OverlayError::decode("HEIF image has no interleaved RGB plane"))?;

    let row_len = plane.width as usize * 3;
    let mut rgb = Vec::with_capacity(row_len * plane.height as usize);
    for row in plane.data.chunks(plane.stride).take(plane.height as usize) {
        rgb.extend_from_slice(&row[..row_len]);
    }
    let img = image::RgbImage::from_raw(plane.width, plane.height, rgb)
        .ok_or_else(|| OverlayError::decode("HEIF plane size mismatch"))?;
    Ok(Bitmap::from_dynamic(image::DynamicImage::ImageRgb8(img)))
}

#[cfg(not(feature = "heic"))]
fn decode_heif(_bytes: &[u8], _max_pixels: u64) -> OverlayResult<Bitmap> {
    Err(OverlayError::decode(
        "HEIC/HEIF input requires the `heic` feature",
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
