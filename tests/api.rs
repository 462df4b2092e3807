//! Integration tests for the HTTP surface
//!
//! Drives the router in-process with stub engines, so no model artifact is
//! needed.

use std::io::Cursor;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use serde_json::Value;
use tower::ServiceExt;

use waste_classifier::backend::{backend_name, default_device, InferenceBackend};
use waste_classifier::catalog::ClassCatalog;
use waste_classifier::inference::{BurnEngine, ImageTensor, InferenceEngine};
use waste_classifier::model::WasteClassifierConfig;
use waste_classifier::server::{self, AppState, ServerConfig, SharedState};
use waste_classifier::{ClassifierError, Result};

const BOUNDARY: &str = "waste-classifier-test-boundary";

/// Always returns the same probability vector
struct FixedEngine(Vec<f32>);

impl InferenceEngine for FixedEngine {
    fn predict(&self, tensor: &ImageTensor) -> Result<Vec<f32>> {
        assert_eq!(tensor.shape(), [1, 224, 224, 3]);
        Ok(self.0.clone())
    }

    fn backend_name(&self) -> &str {
        "fixed"
    }
}

/// Always fails
struct FailingEngine;

impl InferenceEngine for FailingEngine {
    fn predict(&self, _tensor: &ImageTensor) -> Result<Vec<f32>> {
        Err(ClassifierError::Inference("backend exploded".to_string()))
    }
}

fn plastic_engine() -> FixedEngine {
    // cardboard, food organics, glass, metal, misc, paper, plastic, textile, vegetation
    FixedEngine(vec![0.05, 0.02, 0.1, 0.03, 0.01, 0.04, 0.6, 0.1, 0.05])
}

fn state_with(engine: impl InferenceEngine + 'static) -> SharedState {
    state_with_config(ServerConfig::default(), engine)
}

fn state_with_config(config: ServerConfig, engine: impl InferenceEngine + 'static) -> SharedState {
    Arc::new(AppState::new(
        config,
        ClassCatalog::default(),
        Arc::new(engine),
    ))
}

/// Untrained network with the production input shape and a narrow body
fn burn_engine() -> BurnEngine<InferenceBackend> {
    let config = WasteClassifierConfig::new()
        .with_num_classes(ClassCatalog::default().len())
        .with_base_filters(4)
        .with_hidden_size(16);
    let device = default_device();
    BurnEngine::from_model(config.init(&device), device, backend_name())
}

fn jpeg_bytes() -> Vec<u8> {
    let img = RgbImage::from_pixel(224, 224, Rgb([120, 80, 200]));
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Jpeg)
        .unwrap();
    buf
}

/// A multipart part: field name, optional file name, content
struct Part<'a> {
    name: &'a str,
    file_name: Option<&'a str>,
    data: &'a [u8],
}

fn multipart_request(parts: &[Part<'_>]) -> Request<Body> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part.file_name {
            Some(file_name) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                        part.name, file_name
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(b"Content-Type: image/jpeg\r\n\r\n");
            }
            None => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", part.name)
                        .as_bytes(),
                );
            }
        }
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/predict")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn post_image(state: &SharedState, file_name: &str, data: &[u8]) -> (StatusCode, Value) {
    let request = multipart_request(&[Part {
        name: "image",
        file_name: Some(file_name),
        data,
    }]);
    send(server::router(state.clone()), request).await
}

#[tokio::test]
async fn predict_valid_jpeg_returns_ranked_result() {
    let state = state_with(plastic_engine());
    let (status, body) = post_image(&state, "test_image.jpg", &jpeg_bytes()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["predicted_class"], "plastic");
    assert_eq!(body["confidence"], 0.6);
    assert_eq!(body["confidence_percent"], 60.0);
    assert!(body["latency_ms"].as_f64().unwrap() >= 0.0);
    assert!(body["timestamp"].is_string());

    let catalog = ClassCatalog::default();
    let predicted = body["predicted_class"].as_str().unwrap();
    assert!(catalog.index_of(predicted).is_some());

    let all = body["all_predictions"].as_object().unwrap();
    assert_eq!(all.len(), 9);
    let keys: Vec<&str> = all.keys().map(String::as_str).collect();
    assert_eq!(keys[0], "plastic");
    // glass and textile tie at 0.1; catalog order is kept
    assert_eq!(keys[1], "glass");
    assert_eq!(keys[2], "textile trash");
    let values: Vec<f64> = all.values().map(|v| v.as_f64().unwrap()).collect();
    assert!(values.windows(2).all(|w| w[0] >= w[1]));

    let snapshot = state.telemetry.snapshot();
    assert_eq!(snapshot.total_requests, 1);
    assert_eq!(snapshot.count, 1);
}

#[tokio::test]
async fn predict_through_burn_model_returns_catalog_class() {
    let state = state_with(burn_engine());
    let (status, body) = post_image(&state, "test_image.jpg", &jpeg_bytes()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let catalog = ClassCatalog::default();
    let predicted = body["predicted_class"].as_str().unwrap();
    assert!(catalog.index_of(predicted).is_some());

    let all = body["all_predictions"].as_object().unwrap();
    assert_eq!(all.len(), catalog.len());
    assert_eq!(all.keys().next().map(String::as_str), Some(predicted));

    let sum: f64 = all.values().map(|v| v.as_f64().unwrap()).sum();
    assert!((sum - 1.0).abs() < 1e-2);
    assert_eq!(state.telemetry.snapshot().count, 1);
}

#[tokio::test]
async fn oversized_upload_is_payload_too_large() {
    let config = ServerConfig {
        max_upload_bytes: 16 * 1024,
        ..ServerConfig::default()
    };
    let state = state_with_config(config, plastic_engine());
    let big = vec![0xAB_u8; 64 * 1024];

    let (status, body) = post_image(&state, "big.png", &big).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Upload exceeds 16384 bytes");
    assert_eq!(body["message"], "Please send a smaller image");

    let snapshot = state.telemetry.snapshot();
    assert_eq!(snapshot.total_requests, 1);
    assert_eq!(snapshot.count, 0);
}

#[tokio::test]
async fn upload_within_raised_limit_is_accepted() {
    let jpeg = jpeg_bytes();
    let config = ServerConfig {
        max_upload_bytes: jpeg.len() + 4096,
        ..ServerConfig::default()
    };
    let state = state_with_config(config, plastic_engine());

    let (status, body) = post_image(&state, "test_image.jpg", &jpeg).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["predicted_class"], "plastic");
}

#[tokio::test]
async fn predict_without_image_field_is_bad_request() {
    let state = state_with(plastic_engine());
    let request = multipart_request(&[Part {
        name: "file",
        file_name: Some("test_image.jpg"),
        data: &jpeg_bytes(),
    }]);

    let (status, body) = send(server::router(state.clone()), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "No image file provided");
}

#[tokio::test]
async fn predict_with_plain_form_value_is_bad_request() {
    let state = state_with(plastic_engine());
    let request = multipart_request(&[Part {
        name: "image",
        file_name: None,
        data: b"just text",
    }]);

    let (status, body) = send(server::router(state), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No image file provided");
}

#[tokio::test]
async fn predict_with_empty_filename_is_bad_request() {
    let state = state_with(plastic_engine());
    let (status, body) = post_image(&state, "", &jpeg_bytes()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Empty filename");
}

#[tokio::test]
async fn predict_without_multipart_body_is_bad_request() {
    let state = state_with(plastic_engine());
    let request = Request::builder()
        .method("POST")
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();

    let (status, body) = send(server::router(state), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn predict_corrupt_image_is_server_error() {
    let state = state_with(plastic_engine());
    let (status, body) = post_image(&state, "broken.jpg", b"\x00\x01not really a jpeg").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Error processing image");
    assert!(body["error"].as_str().unwrap().contains("decode"));

    // Counted, but no latency sample
    let snapshot = state.telemetry.snapshot();
    assert_eq!(snapshot.total_requests, 1);
    assert_eq!(snapshot.count, 0);
}

#[tokio::test]
async fn predict_inference_failure_surfaces_message() {
    let state = state_with(FailingEngine);
    let (status, body) = post_image(&state, "test_image.jpg", &jpeg_bytes()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("backend exploded"));
}

#[tokio::test]
async fn predict_with_wrong_output_width_is_server_error() {
    let state = state_with(FixedEngine(vec![0.5, 0.5]));
    let (status, body) = post_image(&state, "test_image.jpg", &jpeg_bytes()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn failed_requests_count_toward_totals_only() {
    let state = state_with(plastic_engine());
    post_image(&state, "", &jpeg_bytes()).await;
    post_image(&state, "broken.jpg", b"garbage").await;
    post_image(&state, "ok.jpg", &jpeg_bytes()).await;

    let (status, body) = send(server::router(state.clone()), get("/stats")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_requests"], 3);
    assert_eq!(body["predictions"]["count"], 1);
    assert!(body["predictions"]["min_latency_ms"].as_f64().unwrap() >= 0.0);
    assert_eq!(
        body["predictions"]["min_latency_ms"],
        body["predictions"]["max_latency_ms"]
    );
}

#[tokio::test]
async fn stats_are_zero_before_any_prediction() {
    let state = state_with(plastic_engine());
    let (status, body) = send(server::router(state), get("/stats")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_requests"], 0);
    assert_eq!(body["predictions"]["count"], 0);
    assert_eq!(body["predictions"]["average_latency_ms"], 0.0);
    assert_eq!(body["predictions"]["min_latency_ms"], 0.0);
    assert_eq!(body["predictions"]["max_latency_ms"], 0.0);
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn health_reports_model_and_counters() {
    let state = state_with(plastic_engine());
    post_image(&state, "ok.jpg", &jpeg_bytes()).await;

    let (status, body) = send(server::router(state), get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["model_loaded"], true);
    assert_eq!(body["total_requests"], 1);
    assert_eq!(body["backend"], "fixed");
    assert!(body["uptime_seconds"].as_f64().unwrap() >= 0.0);
    assert!(body["uptime_hours"].is_number());
    assert!(body["average_prediction_time_ms"].is_number());
}

#[tokio::test]
async fn classes_lists_catalog_in_order() {
    let state = state_with(plastic_engine());
    let (status, body) = send(server::router(state), get("/classes")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["num_classes"], 9);
    assert_eq!(body["classes"][0], "cardboard");
    assert_eq!(body["classes"][8], "vegetation");
}

#[tokio::test]
async fn class_details_lookup() {
    let state = state_with(plastic_engine());

    let (status, body) = send(server::router(state.clone()), get("/classes/food%20organics")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["index"], 1);
    assert_eq!(body["display_name"], "Food Organics");
    assert!(body["disposal_tip"].is_string());

    let (status, body) = send(server::router(state), get("/classes/styrofoam")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn index_lists_endpoints() {
    let state = state_with(plastic_engine());
    let (status, body) = send(server::router(state), get("/")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Waste Classifier API");
    assert!(body["endpoints"]["/predict"].is_string());
    assert!(body["version"].is_string());
}
