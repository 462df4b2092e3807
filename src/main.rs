//! Waste Classifier Server
//!
//! HTTP API server that loads the trained waste classifier once at startup
//! and serves predictions, health, class and latency statistics endpoints.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

use waste_classifier::backend::{backend_name, default_device, InferenceBackend};
use waste_classifier::catalog::ClassCatalog;
use waste_classifier::inference::BurnEngine;
use waste_classifier::model::WasteClassifierConfig;
use waste_classifier::server::{self, AppState, ServerConfig};
use waste_classifier::utils::logging::{init_logging, LogConfig, LogLevel};

/// Waste Classifier Server
#[derive(Parser, Debug)]
#[command(name = "waste-classifier-server")]
#[command(version)]
#[command(about = "HTTP API serving waste image classification predictions")]
struct Cli {
    /// Port to listen on
    #[arg(short, long, default_value = "5000", env = "WASTE_CLASSIFIER_PORT")]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = "0.0.0.0", env = "WASTE_CLASSIFIER_HOST")]
    host: String,

    /// Path to the trained model record
    #[arg(
        short,
        long,
        default_value = "models/waste_classifier.mpk",
        env = "WASTE_CLASSIFIER_MODEL"
    )]
    model: PathBuf,

    /// Largest accepted upload, in megabytes
    #[arg(long, default_value = "10")]
    max_upload_mb: usize,

    /// Number of recent prediction latencies kept for statistics
    #[arg(long, default_value = "100")]
    latency_window: usize,

    /// Enable verbose logging
    #[arg(short, long, default_value = "false")]
    verbose: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "WASTE_CLASSIFIER_LOG")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut log_config = if cli.verbose {
        LogConfig::verbose()
    } else {
        LogConfig::default()
    };
    if let Some(level) = cli.log_level.as_deref() {
        log_config = log_config.with_level(LogLevel::parse(level));
    }
    init_logging(&log_config).map_err(anyhow::Error::msg)?;

    let config = ServerConfig {
        host: cli.host,
        port: cli.port,
        model_path: cli.model,
        max_upload_bytes: cli.max_upload_mb.saturating_mul(1024 * 1024),
        latency_window: cli.latency_window,
    };
    config.validate()?;

    let catalog = ClassCatalog::default();

    info!("Waste Classifier Server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    info!("  Model:          {:?}", config.model_path);
    info!("  Backend:        {}", backend_name());
    info!("  Classes:        {}", catalog.len());
    info!("  Max upload:     {} bytes", config.max_upload_bytes);
    info!("  Latency window: {}", config.latency_window);

    let model_config = WasteClassifierConfig::new().with_num_classes(catalog.len());

    // A missing or incompatible model is fatal before any traffic is served
    let engine = BurnEngine::<InferenceBackend>::load(
        &config.model_path,
        &model_config,
        default_device(),
        backend_name(),
    )
    .map_err(|e| {
        error!("{}", e);
        e
    })
    .context("model could not be loaded")?;

    let state = Arc::new(AppState::new(config, catalog, Arc::new(engine)));
    server::serve(state).await
}
