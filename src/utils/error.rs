//! Error Handling Module
//!
//! Defines the error taxonomy for the waste classifier service.
//! Uses thiserror for ergonomic error definitions.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for classifier operations
#[derive(Error, Debug)]
pub enum ClassifierError {
    /// The request itself was unusable (missing upload, empty filename)
    #[error("{0}")]
    Validation(String),

    /// The request body went over the configured upload limit
    #[error("Upload exceeds {0} bytes")]
    PayloadTooLarge(usize),

    /// The uploaded bytes could not be decoded as an image
    #[error("Failed to decode image: {0}")]
    Decode(String),

    /// The model failed to produce a usable probability vector
    #[error("Inference error: {0}")]
    Inference(String),

    /// The model artifact is missing or incompatible
    #[error("Failed to load model from '{0}': {1}")]
    ModelLoad(PathBuf, String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClassifierError {
    /// HTTP status code for this error kind
    ///
    /// Validation problems and oversized uploads are the caller's fault;
    /// everything else is a per-request processing failure.
    pub fn status_code(&self) -> u16 {
        match self {
            ClassifierError::Validation(_) => 400,
            ClassifierError::PayloadTooLarge(_) => 413,
            _ => 500,
        }
    }

    /// Whether the error was caused by the client's input
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}

impl From<image::ImageError> for ClassifierError {
    fn from(err: image::ImageError) -> Self {
        ClassifierError::Decode(err.to_string())
    }
}

/// Convenience Result type for classifier operations
pub type Result<T> = std::result::Result<T, ClassifierError>;

/// Extension trait for turning foreign errors into inference failures
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, msg: &str) -> Result<T>;
}

impl<T, E: std::error::Error> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, msg: &str) -> Result<T> {
        self.map_err(|e| ClassifierError::Inference(format!("{}: {}", msg, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ClassifierError::Inference("bad output".to_string());
        assert_eq!(format!("{}", err), "Inference error: bad output");

        let err = ClassifierError::Validation("Empty filename".to_string());
        assert_eq!(format!("{}", err), "Empty filename");
    }

    #[test]
    fn test_model_load_error() {
        let path = PathBuf::from("/models/waste_classifier.mpk");
        let err = ClassifierError::ModelLoad(path, "file not found".to_string());
        assert!(format!("{}", err).contains("waste_classifier.mpk"));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(ClassifierError::Validation("x".into()).status_code(), 400);
        assert_eq!(ClassifierError::Decode("x".into()).status_code(), 500);
        assert_eq!(ClassifierError::Inference("x".into()).status_code(), 500);
        assert_eq!(ClassifierError::PayloadTooLarge(1024).status_code(), 413);
        assert!(ClassifierError::Validation("x".into()).is_client_error());
        assert!(ClassifierError::PayloadTooLarge(1024).is_client_error());
        assert!(!ClassifierError::Decode("x".into()).is_client_error());
    }

    #[test]
    fn test_result_context() {
        let result: std::result::Result<i32, std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::Other, "device lost"));

        let err = result.context("Forward pass failed").unwrap_err();
        assert!(matches!(err, ClassifierError::Inference(_)));
        assert!(err.to_string().contains("device lost"));
    }

    #[test]
    fn test_payload_too_large_display() {
        let err = ClassifierError::PayloadTooLarge(10 * 1024 * 1024);
        assert_eq!(err.to_string(), "Upload exceeds 10485760 bytes");
    }
}
