//! Request and latency statistics endpoint

use axum::{extract::State, Json};
use serde::Serialize;

use super::timestamp;
use crate::server::state::SharedState;
use crate::utils::round_to;

#[derive(Serialize)]
pub struct LatencySummary {
    pub count: usize,
    pub average_latency_ms: f64,
    pub min_latency_ms: f64,
    pub max_latency_ms: f64,
}

#[derive(Serialize)]
pub struct StatsResponse {
    pub total_requests: u64,
    pub uptime_hours: f64,
    pub predictions: LatencySummary,
    pub timestamp: String,
}

/// GET /stats - Request totals and latency over the recent window
pub async fn get_stats(State(state): State<SharedState>) -> Json<StatsResponse> {
    let snapshot = state.telemetry.snapshot();

    Json(StatsResponse {
        total_requests: snapshot.total_requests,
        uptime_hours: round_to(state.uptime_seconds() / 3600.0, 2),
        predictions: LatencySummary {
            count: snapshot.count,
            average_latency_ms: round_to(snapshot.avg_ms, 2),
            min_latency_ms: round_to(snapshot.min_ms, 2),
            max_latency_ms: round_to(snapshot.max_ms, 2),
        },
        timestamp: timestamp(),
    })
}
