//! Class catalog endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::catalog::ClassInfo;
use crate::server::state::SharedState;

#[derive(Serialize)]
pub struct ClassesResponse {
    pub classes: Vec<String>,
    pub num_classes: usize,
}

/// GET /classes - List all classes in model output order
pub async fn list_classes(State(state): State<SharedState>) -> Json<ClassesResponse> {
    Json(ClassesResponse {
        classes: state.catalog.names().to_vec(),
        num_classes: state.catalog.len(),
    })
}

/// GET /classes/:name - Display information for a single class
pub async fn get_class(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<Json<ClassInfo>, (StatusCode, Json<Value>)> {
    state.catalog.class_info(&name).map(Json).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(json!({
                "success": false,
                "error": format!("Unknown class: {}", name),
            })),
        )
    })
}
