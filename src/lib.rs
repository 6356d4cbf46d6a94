//! Route-overlay extracts the route line and the stats block from an activity-app
//! screenshot and composites them onto a background photo.
//!
//! The pipeline is a fixed, configuration-driven sequence:
//!
//! - Decode the two payloads (data URI or raw base64; JPEG, PNG, WebP, HEIC with `heic`)
//! - Extract the route and stats masks from the screenshot ([`extract_layers`])
//! - Reframe the background and blend the masks on top ([`compose_bitmaps`])
//! - Encode the result as a PNG data URI ([`run_overlay`])
//!
//! [`create_router`] exposes the same pipeline over HTTP.
#![forbid(unsafe_code)]

mod api;
mod assets;
mod config;
mod effects;
mod extract;
mod foundation;
mod render;

pub use crate::api::routes::{BODY_ENVELOPE_BYTES, body_limit, create_router};
pub use crate::api::server::run_server;
pub use crate::api::types::{ApiError, HealthResponse, PROCESSING_ERROR, status_for};
pub use crate::assets::decode::{
    DataUri, SourceFormat, check_payload_size, decode_base64, decode_image, decode_payload,
    sniff_format, split_data_uri,
};
pub use crate::assets::encode::{
    PNG_MIME, encode_png, encode_png_data_uri, jpeg_round_trip, to_data_uri, write_png,
};
pub use crate::config::{
    CanvasPolicy, CropRegion, DEFAULT_INPUT_SIZE_LIMIT_BYTES, FitPolicy, OverlayConfig, Preset,
    RegionSize, ResizeFilter,
};
pub use crate::effects::color::{
    ColorMatrix, ToneAdjustment, count_white, grayscale, linear_stretch, luma_to_alpha, modulate,
    negate, recombine, threshold,
};
pub use crate::effects::resize::{crop, fit};
pub use crate::extract::{ExtractedLayers, extract_layers, extract_route, extract_stats};
pub use crate::foundation::core::{Bitmap, Canvas, ColorModel};
pub use crate::foundation::error::{OverlayError, OverlayResult};
pub use crate::render::composite::{
    Anchor, BlendMode, Layer, Placement, Rgba8, blend_px, composite_layers,
};
pub use crate::render::pipeline::{
    CompositeRequest, OverlayRequest, OverlayResponse, compose_bitmaps, prepare_background,
    process_request, run_overlay,
};
