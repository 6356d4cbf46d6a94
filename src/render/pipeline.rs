use std::time::{Duration, Instant};

use crate::{
    assets::{
        decode::{check_payload_size, decode_payload},
        encode::{encode_png_data_uri, jpeg_round_trip},
    },
    config::OverlayConfig,
    effects::resize::fit,
    extract::{ExtractedLayers, extract_layers},
    foundation::{
        core::{Bitmap, Canvas},
        error::{OverlayError, OverlayResult},
    },
    render::composite::{Layer, composite_layers},
};

/// Body of `POST /api/overlay`.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayRequest {
    /// Activity-app screenshot, data URI or raw base64.
    pub strava_image: String,
    /// Background photo, data URI or raw base64.
    pub base_image: String,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayResponse {
    /// `data:image/png;base64,...`
    pub result_image: String,
}

/// Everything one composite is built from. Lives for a single request.
#[derive(Clone, Debug)]
pub struct CompositeRequest {
    pub canvas: Canvas,
    pub background: Bitmap,
    pub layers: ExtractedLayers,
}

impl CompositeRequest {
    /// Decoded screenshot + background in, reframed background and extracted layers out.
    pub fn prepare(
        screenshot: &Bitmap,
        background: &Bitmap,
        config: &OverlayConfig,
    ) -> OverlayResult<Self> {
        let canvas = config.canvas_for(background.dimensions())?;
        let (background, layers) = rayon::join(
            || prepare_background(background, config, canvas),
            || extract_layers(screenshot, config, canvas),
        );
        Ok(Self {
            canvas,
            background: background?,
            layers: layers?,
        })
    }

    /// Blends the layers onto the background: route first, stats on top.
    pub fn composite(self, config: &OverlayConfig) -> OverlayResult<Bitmap> {
        let ExtractedLayers { route, stats } = self.layers;
        let layers = [
            Layer {
                bitmap: route,
                blend: config.route_blend_mode,
                opacity: config.route_opacity,
                placement: config.route_placement,
            },
            Layer {
                bitmap: stats,
                blend: config.stats_blend_mode,
                opacity: config.stats_opacity,
                placement: config.stats_placement,
            },
        ];
        composite_layers(&self.background, &layers)
    }
}

/// Reframes the background to `canvas`, then applies the optional JPEG round-trip.
pub fn prepare_background(
    background: &Bitmap,
    config: &OverlayConfig,
    canvas: Canvas,
) -> OverlayResult<Bitmap> {
    let framed = fit(
        background,
        canvas.width,
        canvas.height,
        config.background_fit_policy,
        config.resize_filter.filter_type(),
    )?;
    match config.background_encode_quality {
        Some(q) => jpeg_round_trip(&framed, q),
        None => Ok(framed),
    }
}

/// Bitmap-level pipeline: extraction plus compositing, no codecs on either end.
pub fn compose_bitmaps(
    screenshot: &Bitmap,
    background: &Bitmap,
    config: &OverlayConfig,
) -> OverlayResult<Bitmap> {
    CompositeRequest::prepare(screenshot, background, config)?.composite(config)
}

/// Wall-clock budget for one overlay, checked between pipeline stages.
#[derive(Clone, Copy, Debug)]
struct Deadline {
    started: Instant,
    limit: Option<Duration>,
}

impl Deadline {
    fn new(started: Instant, limit_ms: Option<u64>) -> Self {
        Self {
            started,
            limit: limit_ms.map(Duration::from_millis),
        }
    }

    fn check(&self, stage: &'static str) -> OverlayResult<()> {
        let Some(limit) = self.limit else {
            return Ok(());
        };
        let elapsed = self.started.elapsed();
        if elapsed > limit {
            tracing::warn!(stage, elapsed_ms = elapsed.as_millis() as u64, "overlay over budget");
            return Err(OverlayError::Timeout(limit.as_millis() as u64));
        }
        Ok(())
    }
}

/// Full request pipeline: size check, decode, extract, composite, PNG data URI.
///
/// The combined encoded length is checked against `inputSizeLimitBytes` before either
/// input is decoded. With `processingTimeoutMs` set, the remaining stages are skipped once
/// the budget is spent.
#[tracing::instrument(
    skip_all,
    fields(screenshot_len = screenshot.len(), background_len = background.len())
)]
pub fn run_overlay(
    config: &OverlayConfig,
    screenshot: &str,
    background: &str,
) -> OverlayResult<String> {
    let started = Instant::now();
    let deadline = Deadline::new(started, config.processing_timeout_ms);
    check_payload_size(&[screenshot, background], config.input_size_limit_bytes)?;

    let (shot, base) = rayon::join(
        || decode_payload(screenshot, config.max_decoded_pixels),
        || decode_payload(background, config.max_decoded_pixels),
    );
    let (shot, base) = (shot?, base?);
    deadline.check("decode")?;

    let request = CompositeRequest::prepare(&shot, &base, config)?;
    deadline.check("extract")?;
    let out = request.composite(config)?;
    deadline.check("composite")?;

    let uri = encode_png_data_uri(&out)?;
    tracing::info!(
        width = out.width(),
        height = out.height(),
        output_len = uri.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "overlay composed"
    );
    Ok(uri)
}

pub fn process_request(
    config: &OverlayConfig,
    request: &OverlayRequest,
) -> OverlayResult<OverlayResponse> {
    let result_image = run_overlay(config, &request.strava_image, &request.base_image)?;
    Ok(OverlayResponse { result_image })
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
