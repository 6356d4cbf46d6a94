use std::{sync::Arc, time::Duration};

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State, rejection::JsonRejection},
    http::StatusCode,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};

use super::types::{ApiError, ApiReply, HealthResponse, error_reply};
use crate::{
    config::OverlayConfig,
    foundation::error::{OverlayError, OverlayResult},
    render::pipeline::{OverlayRequest, OverlayResponse, process_request},
};

/// Room for the JSON envelope around the two base64 strings.
pub const BODY_ENVELOPE_BYTES: usize = 64 * 1024;

/// Router with `POST /api/overlay` and `GET /api/health`, CORS open to any origin.
pub fn create_router(config: Arc<OverlayConfig>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/overlay", post(overlay_handler))
        .route("/api/health", get(health_handler))
        .layer(DefaultBodyLimit::max(body_limit(&config)))
        .layer(cors)
        .with_state(config)
}

/// The HTTP body cap: the payload limit plus the envelope, so an oversize request still
/// reaches the handler's own size check.
pub fn body_limit(config: &OverlayConfig) -> usize {
    usize::try_from(config.input_size_limit_bytes)
        .unwrap_or(usize::MAX)
        .saturating_add(BODY_ENVELOPE_BYTES)
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

#[tracing::instrument(skip_all)]
async fn overlay_handler(
    State(config): State<Arc<OverlayConfig>>,
    payload: Result<Json<OverlayRequest>, JsonRejection>,
) -> ApiReply<OverlayResponse> {
    let Json(request) = payload.map_err(reject_body)?;
    match run_blocking(config, request).await {
        Ok(response) => Ok(Json(response)),
        Err(err) => {
            tracing::warn!(kind = err.kind(), error = %err, "overlay request failed");
            Err(error_reply(&err))
        }
    }
}

/// Runs the pipeline on the blocking pool, bounded by `processingTimeoutMs`.
///
/// On timeout the blocking task stops at its next stage boundary and its result is dropped.
async fn run_blocking(
    config: Arc<OverlayConfig>,
    request: OverlayRequest,
) -> OverlayResult<OverlayResponse> {
    let timeout_ms = config.processing_timeout_ms;
    let task = tokio::task::spawn_blocking(move || process_request(&config, &request));

    let joined = match timeout_ms {
        Some(ms) => tokio::time::timeout(Duration::from_millis(ms), task)
            .await
            .map_err(|_| OverlayError::Timeout(ms))?,
        None => task.await,
    };
    joined.map_err(|e| OverlayError::Other(anyhow::anyhow!("pipeline task failed: {e}")))?
}

fn reject_body(rejection: JsonRejection) -> (StatusCode, Json<ApiError>) {
    let status = match rejection.status() {
        StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
        _ => StatusCode::BAD_REQUEST,
    };
    tracing::warn!(%status, "rejected request body: {}", rejection.body_text());
    (status, Json(ApiError::processing(rejection.body_text())))
}
