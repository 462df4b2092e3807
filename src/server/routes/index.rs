//! Service metadata endpoint

use axum::Json;
use serde_json::{json, Value};

/// GET / - Service name, version and endpoint list
pub async fn index() -> Json<Value> {
    Json(json!({
        "message": "Waste Classifier API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "/health": "GET - Health check and uptime",
            "/predict": "POST - Make prediction (send image file)",
            "/stats": "GET - API statistics",
            "/classes": "GET - List all classes",
            "/classes/{name}": "GET - Display name and disposal tip for one class",
        }
    }))
}
