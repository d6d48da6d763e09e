//! Error types for the chargecast prediction service
//!
//! This module provides structured error handling using thiserror for
//! error definitions and anyhow for error propagation at the binary boundary.

use thiserror::Error;

/// Main error type for chargecast operations
#[derive(Error, Debug)]
pub enum ChargecastError {
    /// Input record violates the declared field domains
    #[error("Validation error: {0}")]
    Validation(String),

    /// Bad fit-time or startup configuration (unknown strategy, empty dataset, ...)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Prediction artifacts failed to load at startup; every inference call
    /// fails with this until the process is restarted with valid artifacts
    #[error("Model unavailable: prediction artifacts are not loaded")]
    ModelUnavailable,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Artifact or request serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Training dataset parsing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

/// Result type alias for chargecast operations
pub type Result<T> = std::result::Result<T, ChargecastError>;

/// Convert anyhow::Error to ChargecastError
impl From<anyhow::Error> for ChargecastError {
    fn from(err: anyhow::Error) -> Self {
        ChargecastError::Other(err.to_string())
    }
}
