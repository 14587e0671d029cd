//! Upload service for sea-surface-temperature heatmaps.
//!
//! Provides endpoints for:
//! - `GET /` - Browser upload form
//! - `POST /upload` - Render a heatmap from a base map and a grid archive
//! - `GET /health` - Health check
//! - `GET /metrics` - Prometheus metrics

pub mod archive;
pub mod config;
pub mod error;
pub mod handlers;
pub mod render;
pub mod state;
pub mod workspace;

use axum::{
    extract::{DefaultBodyLimit, Extension},
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

pub use config::ServiceConfig;
pub use error::{ApiError, ApiResult};
pub use render::RenderJob;
pub use state::AppState;

/// Build the HTTP router.
pub fn build_router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(handlers::form_handler))
        .route("/upload", post(handlers::upload_handler))
        .route("/health", get(handlers::health_handler))
        .route("/metrics", get(handlers::metrics_handler))
        .layer(Extension(state))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Bind `addr` and serve until ctrl-c.
pub async fn start_server(state: Arc<AppState>, addr: SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);

    info!(address = %addr, "Starting SST heatmap server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
