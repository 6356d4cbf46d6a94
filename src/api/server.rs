use std::{net::SocketAddr, sync::Arc};

use super::routes::create_router;
use crate::config::OverlayConfig;

/// Serves the overlay API on `addr` until Ctrl-C.
pub async fn run_server(addr: SocketAddr, config: Arc<OverlayConfig>) -> std::io::Result<()> {
    let app = create_router(config);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "overlay API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
