//! HTTP surface of the waste classifier
//!
//! Thin axum handlers around the inference pipeline. The router is built
//! from an already-loaded [`AppState`], so tests can drive it with a stub
//! engine and no model artifact.

pub mod error;
pub mod routes;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

pub use state::{AppState, ServerConfig, SharedState};

/// Build the application router
pub fn router(state: SharedState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(routes::index::index))
        .route("/health", get(routes::health::health_check))
        .route("/classes", get(routes::classes::list_classes))
        .route("/classes/:name", get(routes::classes::get_class))
        .route("/predict", post(routes::predict::predict))
        .route("/stats", get(routes::stats::get_stats))
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

/// Bind the configured address and serve until the process is stopped
pub async fn serve(state: SharedState) -> anyhow::Result<()> {
    let addr = state.config.bind_addr()?;
    let app = router(state);

    info!("Starting server on http://{}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
