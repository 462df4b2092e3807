//! Model module for the CNN architecture using the Burn framework
//!
//! The network is trained elsewhere; this crate only constructs the module
//! skeleton so that a saved record can be loaded into it for inference.

pub mod cnn;

// Re-export main types for convenience
pub use cnn::{WasteClassifier, WasteClassifierConfig};
