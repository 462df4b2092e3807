//! Utilities module for logging, error handling, and helper functions
//!
//! This module provides:
//! - Structured logging with tracing
//! - Error handling types
//! - Rounding helpers shared by the response builders

pub mod error;
pub mod logging;

// Re-export main types for convenience
pub use error::{ClassifierError, Result};
pub use logging::init_logging;

/// Round a value to a fixed number of decimal places
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}
