//! HTTP adapter: an axum router over the overlay pipeline.

pub(crate) mod routes;
pub(crate) mod server;
pub(crate) mod types;
