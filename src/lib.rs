//! # Waste Classifier
//!
//! A small HTTP service that serves predictions from a pretrained waste
//! image classifier, built on the Burn framework and axum.
//!
//! ## Modules
//!
//! - `catalog`: The ordered class list that labels the model's outputs
//! - `model`: CNN architecture built with Burn
//! - `inference`: Image normalization, the engine seam, ranking, and latency telemetry
//! - `server`: axum router, shared state, and HTTP error mapping
//! - `utils`: Logging, error types, and helpers
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use waste_classifier::backend::{backend_name, default_device, InferenceBackend};
//! use waste_classifier::inference::BurnEngine;
//! use waste_classifier::model::WasteClassifierConfig;
//! use waste_classifier::server::{self, AppState, ServerConfig};
//! use waste_classifier::ClassCatalog;
//!
//! let config = ServerConfig::default();
//! let engine = BurnEngine::<InferenceBackend>::load(
//!     &config.model_path,
//!     &WasteClassifierConfig::new(),
//!     default_device(),
//!     backend_name(),
//! )?;
//! let state = Arc::new(AppState::new(config, ClassCatalog::default(), Arc::new(engine)));
//! server::serve(state).await?;
//! ```

pub mod backend;
pub mod catalog;
pub mod inference;
pub mod model;
pub mod server;
pub mod utils;

// Re-export commonly used items for convenience
pub use catalog::{ClassCatalog, ClassInfo};
pub use inference::{
    build_result, normalize, BurnEngine, ImageTensor, InferenceEngine, PredictionResult,
    TelemetryRing, TelemetrySnapshot,
};
pub use model::{WasteClassifier, WasteClassifierConfig};
pub use utils::error::{ClassifierError, Result};

/// Side length of the square model input
pub const IMAGE_SIZE: usize = 224;

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
