//! Inference module for the prediction request pipeline
//!
//! This module provides:
//! - Image normalization into the model's input tensor
//! - The inference engine seam and its burn implementation
//! - Ranking of the model's probabilities into a client-facing result
//! - Rolling latency telemetry shared across requests
//!
//! ## Pipeline
//!
//! ```text
//! bytes -> normalize -> InferenceEngine::predict -> build_result -> TelemetryRing::record
//! ```

pub mod engine;
pub mod predictor;
pub mod preprocess;
pub mod telemetry;

// Re-export main types for convenience
pub use engine::{BurnEngine, InferenceEngine};
pub use predictor::{build_result, ClassProbability, PredictionResult, RankedPredictions};
pub use preprocess::{normalize, normalize_image, ImageTensor};
pub use telemetry::{TelemetryRing, TelemetrySnapshot, DEFAULT_WINDOW};
