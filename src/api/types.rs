use axum::{Json, http::StatusCode};

use crate::foundation::error::OverlayError;

/// Summary carried by every failed request.
pub const PROCESSING_ERROR: &str = "Error processing images";

/// Uniform failure body: `{ "error": ..., "details": ... }`.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ApiError {
    pub error: String,
    pub details: String,
}

impl ApiError {
    pub fn processing(details: impl Into<String>) -> Self {
        Self {
            error: PROCESSING_ERROR.to_string(),
            details: details.into(),
        }
    }
}

pub type ApiReply<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// 413 for oversize payloads, 500 for every other pipeline failure.
pub fn status_for(err: &OverlayError) -> StatusCode {
    match err {
        OverlayError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn error_reply(err: &OverlayError) -> (StatusCode, Json<ApiError>) {
    (status_for(err), Json(ApiError::processing(err.to_string())))
}

#[cfg(test)]
#[path = "../../tests/unit/api/types.rs"]
mod tests;
