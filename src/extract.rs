use crate::{
    config::OverlayConfig,
    effects::{
        color::{grayscale, linear_stretch, luma_to_alpha, modulate, negate, recombine, threshold},
        resize::{crop, fit},
    },
    foundation::{
        core::{Bitmap, Canvas},
        error::OverlayResult,
    },
};

/// Route and stats masks cut from one screenshot.
#[derive(Clone, Debug)]
pub struct ExtractedLayers {
    /// Canvas-sized mask of the route line.
    pub route: Bitmap,
    /// Mask of the stats block, sized to `statsRegion`.
    pub stats: Bitmap,
}

/// Isolates the route line as a white, background-transparent layer the size of `canvas`.
///
/// Steps: color matrix, tone adjustment, threshold, negate when `routeInvert` is set,
/// optional contrast stretch, luma-to-alpha, then fit to the canvas.
#[tracing::instrument(skip_all, fields(src_w = src.width(), src_h = src.height()))]
pub fn extract_route(
    src: &Bitmap,
    config: &OverlayConfig,
    canvas: Canvas,
) -> OverlayResult<Bitmap> {
    let recombined = recombine(src, &config.route_color_matrix)?;
    let toned = modulate(&recombined, &config.route_tone_adjustment)?;
    let mask = binarize(
        &toned,
        config.route_threshold,
        config.route_invert,
        config.route_contrast_gain,
    )?;
    let layer = fit(
        &mask,
        canvas.width,
        canvas.height,
        config.route_resize_fit,
        config.resize_filter.filter_type(),
    )?;
    tracing::debug!(w = layer.width(), h = layer.height(), "route layer ready");
    Ok(layer)
}

/// Isolates the stats text block, sized to `statsRegion` of `canvas`.
///
/// Steps: optional crop, grayscale, brightness/contrast boost, threshold, negate when
/// `statsInvert` is set, optional contrast stretch, luma-to-alpha, then fit to the region.
/// With the defaults, bright text is opaque and its dark surround transparent.
#[tracing::instrument(skip_all, fields(src_w = src.width(), src_h = src.height()))]
pub fn extract_stats(
    src: &Bitmap,
    config: &OverlayConfig,
    canvas: Canvas,
) -> OverlayResult<Bitmap> {
    let cropped;
    let src = match config.stats_crop_region {
        Some(region) => {
            cropped = crop(src, region)?;
            &cropped
        }
        None => src,
    };

    let gray = grayscale(src)?;
    let toned = modulate(&gray, &config.stats_tone_adjustment)?;
    let mask = binarize(
        &toned,
        config.stats_threshold,
        config.stats_invert,
        config.stats_contrast_gain,
    )?;
    let (w, h) = config.stats_region.resolve(canvas);
    let layer = fit(
        &mask,
        w,
        h,
        config.stats_resize_fit,
        config.resize_filter.filter_type(),
    )?;
    tracing::debug!(w, h, "stats layer ready");
    Ok(layer)
}

/// Runs both extractions on the same screenshot, in parallel.
pub fn extract_layers(
    src: &Bitmap,
    config: &OverlayConfig,
    canvas: Canvas,
) -> OverlayResult<ExtractedLayers> {
    let (route, stats) = rayon::join(
        || extract_route(src, config, canvas),
        || extract_stats(src, config, canvas),
    );
    Ok(ExtractedLayers {
        route: route?,
        stats: stats?,
    })
}

/// Threshold to a black/white mask, then turn white into opaque coverage.
fn binarize(src: &Bitmap, cutoff: u8, invert: bool, gain: Option<f32>) -> OverlayResult<Bitmap> {
    let mut mask = threshold(src, cutoff)?;
    if invert {
        mask = negate(&mask);
    }
    let stretched = match gain {
        Some(gain) => linear_stretch(&mask, gain),
        None => mask,
    };
    Ok(luma_to_alpha(&stretched))
}

#[cfg(test)]
#[path = "../tests/unit/extract.rs"]
mod tests;
