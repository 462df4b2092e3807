//! HTTP mapping for classifier errors

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::utils::error::ClassifierError;

/// Hint returned with every validation failure
pub const UPLOAD_HINT: &str = "Please send an image file with key \"image\"";

/// Returned with 413 responses
pub const SIZE_HINT: &str = "Please send a smaller image";

/// Message returned with every processing failure
pub const PROCESSING_MESSAGE: &str = "Error processing image";

impl IntoResponse for ClassifierError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let message = match self {
            ClassifierError::PayloadTooLarge(_) => SIZE_HINT,
            _ if self.is_client_error() => UPLOAD_HINT,
            _ => PROCESSING_MESSAGE,
        };

        let body = json!({
            "success": false,
            "error": self.to_string(),
            "message": message,
        });

        (status, Json(body)).into_response()
    }
}
