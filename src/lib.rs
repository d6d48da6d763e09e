//! Chargecast - Health Insurance Charge Prediction Service
//!
//! A small MLOps demonstration: a tabular regression model trained offline,
//! persisted as JSON artifacts, and served through a thin HTTP API.
//!
//! # Architecture
//!
//! - **Types**: raw input records, field-domain validation, response shapes
//! - **Encoder**: ordinal/one-hot feature encoding with persisted mappings
//! - **Model**: the opaque regressor behind the [`model::Predictor`] trait
//! - **Inference**: load-once artifacts, validate/encode/predict per request
//! - **Training**: the offline CSV-to-artifacts pipeline
//! - **API**: axum HTTP surface (/health, /predict, /batch-predict)
//!
//! # Example
//!
//! ```ignore
//! use chargecast::{ApiServer, InferenceService, ServiceConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServiceConfig::from_env();
//!     let service = Arc::new(InferenceService::load(&config));
//!     ApiServer::new(config.addr, service).serve().await
//! }
//! ```

pub mod api;
pub mod config;
pub mod dataset;
pub mod encoder;
pub mod error;
pub mod inference;
pub mod model;
pub mod training;
pub mod types;

// Re-export commonly used types
pub use api::ApiServer;
pub use config::ServiceConfig;
pub use encoder::{EncodingMapping, TransformOutcome};
pub use error::{ChargecastError, Result};
pub use inference::InferenceService;
pub use model::{LinearModel, Predictor};
pub use training::{run_training, TrainingReport};
pub use types::{EncodingStrategy, PredictionResult, RawRecord};
