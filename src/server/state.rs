//! Application state for the waste classifier server
//!
//! Holds the loaded engine, the class catalog and the telemetry ring. Built
//! once at startup and shared by every handler.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::catalog::ClassCatalog;
use crate::inference::{InferenceEngine, TelemetryRing, DEFAULT_WINDOW};
use crate::utils::error::{ClassifierError, Result};

/// Server configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Path to the model record file
    pub model_path: PathBuf,
    /// Largest accepted request body in bytes
    pub max_upload_bytes: usize,
    /// Number of latency samples kept for statistics
    pub latency_window: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            model_path: PathBuf::from("models/waste_classifier.mpk"),
            max_upload_bytes: 10 * 1024 * 1024,
            latency_window: DEFAULT_WINDOW,
        }
    }
}

impl ServerConfig {
    /// Reject settings the server cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.max_upload_bytes == 0 {
            return Err(ClassifierError::Config(
                "max upload size must be greater than zero".to_string(),
            ));
        }
        if self.latency_window == 0 {
            return Err(ClassifierError::Config(
                "latency window must hold at least one sample".to_string(),
            ));
        }
        Ok(())
    }

    /// Socket address to bind
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ClassifierError::Config(format!("invalid bind address: {}", e)))
    }
}

/// Shared application state
pub struct AppState {
    /// Server configuration
    pub config: ServerConfig,
    /// Class names, index-aligned with the model output
    pub catalog: ClassCatalog,
    /// Loaded model
    pub engine: Arc<dyn InferenceEngine>,
    /// Request counters and latency window
    pub telemetry: TelemetryRing,
}

impl AppState {
    pub fn new(config: ServerConfig, catalog: ClassCatalog, engine: Arc<dyn InferenceEngine>) -> Self {
        let telemetry = TelemetryRing::with_capacity(config.latency_window);
        Self {
            config,
            catalog,
            engine,
            telemetry,
        }
    }

    /// Get uptime in seconds
    pub fn uptime_seconds(&self) -> f64 {
        self.telemetry.uptime().as_secs_f64()
    }
}

pub type SharedState = Arc<AppState>;
