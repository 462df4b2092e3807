//! Health check endpoint

use axum::{extract::State, Json};
use serde::Serialize;

use super::timestamp;
use crate::server::state::SharedState;
use crate::utils::round_to;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_seconds: f64,
    pub uptime_hours: f64,
    pub total_requests: u64,
    pub average_prediction_time_ms: f64,
    pub timestamp: String,
    pub model_loaded: bool,
    pub backend: String,
    pub version: String,
}

/// GET /health - Health check endpoint
pub async fn health_check(State(state): State<SharedState>) -> Json<HealthResponse> {
    let uptime = state.uptime_seconds();
    let snapshot = state.telemetry.snapshot();

    // The engine is loaded before the server binds, so it is always present here
    Json(HealthResponse {
        status: "healthy".to_string(),
        uptime_seconds: round_to(uptime, 2),
        uptime_hours: round_to(uptime / 3600.0, 2),
        total_requests: snapshot.total_requests,
        average_prediction_time_ms: round_to(snapshot.avg_ms, 2),
        timestamp: timestamp(),
        model_loaded: true,
        backend: state.engine.backend_name().to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
