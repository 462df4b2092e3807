//! Prediction endpoint
//!
//! Counts the request, pulls the `image` file out of the multipart body,
//! runs decode + inference on the blocking pool and records the latency of
//! every successful prediction.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Bytes,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::timestamp;
use crate::inference::{build_result, normalize, PredictionResult};
use crate::server::state::SharedState;
use crate::utils::error::{ClassifierError, Result, ResultExt};

/// Multipart field carrying the upload
pub const IMAGE_FIELD: &str = "image";

const NO_IMAGE_PROVIDED: &str = "No image file provided";
const EMPTY_FILENAME: &str = "Empty filename";

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub success: bool,
    #[serde(flatten)]
    pub result: PredictionResult,
    pub timestamp: String,
}

/// POST /predict - Classify an uploaded image
pub async fn predict(
    State(state): State<SharedState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<PredictResponse>> {
    // Every attempt counts, including ones rejected below
    state.telemetry.count_request();
    let start = Instant::now();

    match run_prediction(&state, multipart, start).await {
        Ok(result) => {
            info!(
                "Predicted '{}' ({:.2}%) in {:.2} ms",
                result.predicted_class, result.confidence_percent, result.latency_ms
            );
            Ok(Json(PredictResponse {
                success: true,
                result,
                timestamp: timestamp(),
            }))
        }
        Err(err) => {
            warn!("Prediction request failed: {}", err);
            Err(err)
        }
    }
}

async fn run_prediction(
    state: &SharedState,
    multipart: std::result::Result<Multipart, MultipartRejection>,
    start: Instant,
) -> Result<PredictionResult> {
    let mut multipart = multipart.map_err(|rejection| {
        debug!("Multipart rejected: {}", rejection);
        ClassifierError::Validation(NO_IMAGE_PROVIDED.to_string())
    })?;

    let limit = state.config.max_upload_bytes;
    let bytes = read_image_field(&mut multipart, limit).await?;
    debug!("Received upload of {} bytes", bytes.len());

    let engine = Arc::clone(&state.engine);
    let probabilities = tokio::task::spawn_blocking(move || -> Result<Vec<f32>> {
        let tensor = normalize(&bytes)?;
        engine.predict(&tensor)
    })
    .await
    .context("prediction task failed")??;

    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    let result = build_result(&probabilities, &state.catalog, latency_ms)?;
    debug!("Top-1 margin {:.4}", result.margin());

    state.telemetry.record(latency_ms);
    Ok(result)
}

/// Find the `image` file field and read it fully
async fn read_image_field(multipart: &mut Multipart, limit: usize) -> Result<Bytes> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit, "Malformed multipart body"))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        // A plain form value named "image" is not a file upload
        let Some(file_name) = field.file_name() else {
            continue;
        };
        if file_name.is_empty() {
            return Err(ClassifierError::Validation(EMPTY_FILENAME.to_string()));
        }

        return field
            .bytes()
            .await
            .map_err(|e| multipart_error(e, limit, "Failed to read upload"));
    }

    Err(ClassifierError::Validation(NO_IMAGE_PROVIDED.to_string()))
}

// The body limit surfaces as a multipart stream error carrying 413
fn multipart_error(err: MultipartError, limit: usize, what: &str) -> ClassifierError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ClassifierError::PayloadTooLarge(limit)
    } else {
        ClassifierError::Validation(format!("{}: {}", what, err))
    }
}
