//! HTTP API for the prediction service

mod server;

pub use server::{ApiServer, HealthResponse};
