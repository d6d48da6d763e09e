//! HTTP API server for the prediction service
//!
//! Application-level failures are returned as `200 {"error": ...}` rather
//! than non-200 status codes; the documented client contract distinguishes
//! transport failure from the error envelope, not from status codes.

use crate::error::Result;
use crate::inference::InferenceService;
use crate::types::{PredictionResult, RawRecord};
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info};

/// Shared handler state: the read-only inference service
#[derive(Clone)]
struct AppState {
    service: Arc<InferenceService>,
}

/// Success-or-error response envelope
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ApiResponse<T> {
    Ok(T),
    Err { error: String },
}

impl<T> From<Result<T>> for ApiResponse<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(value) => ApiResponse::Ok(value),
            Err(e) => ApiResponse::Err {
                error: e.to_string(),
            },
        }
    }
}

/// API server for the prediction service
pub struct ApiServer {
    addr: SocketAddr,
    service: Arc<InferenceService>,
}

impl ApiServer {
    /// Create a new API server around a loaded inference service
    pub fn new(addr: SocketAddr, service: Arc<InferenceService>) -> Self {
        Self { addr, service }
    }

    /// Build router
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .route("/predict", post(predict_handler))
            .route("/batch-predict", post(batch_predict_handler))
            .with_state(state)
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
    }

    /// Bind and serve until the process exits
    pub async fn serve(self) -> anyhow::Result<()> {
        let state = AppState {
            service: self.service.clone(),
        };
        let router = Self::build_router(state);

        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        info!("Prediction API listening on http://{}", self.addr);
        if !self.service.is_ready() {
            info!("Serving degraded: prediction artifacts are not loaded");
        }

        axum::serve(listener, router).await?;
        Ok(())
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

/// Health check handler; succeeds while the process is alive
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        message: "API is running".to_string(),
    })
}

/// Single prediction handler
async fn predict_handler(
    State(state): State<AppState>,
    Json(record): Json<RawRecord>,
) -> Json<ApiResponse<PredictionResult>> {
    debug!("Predict request: {:?}", record);
    Json(state.service.predict_one(&record).into())
}

/// Batch prediction handler; results keep input order
async fn batch_predict_handler(
    State(state): State<AppState>,
    Json(records): Json<Vec<RawRecord>>,
) -> Json<ApiResponse<Vec<PredictionResult>>> {
    debug!("Batch predict request: {} records", records.len());
    Json(state.service.predict_batch(&records).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::EncodingMapping;
    use crate::model::LinearModel;
    use crate::types::EncodingStrategy;

    fn record(age: i64, bmi: f64, children: i64, sex: &str, smoker: &str, region: &str) -> RawRecord {
        RawRecord {
            age,
            bmi,
            children,
            sex: sex.to_string(),
            smoker: smoker.to_string(),
            region: region.to_string(),
        }
    }

    fn ready_state() -> AppState {
        let dataset = vec![
            record(19, 27.9, 0, "female", "yes", "southwest"),
            record(33, 22.7, 1, "male", "no", "southeast"),
            record(46, 30.1, 2, "female", "no", "northwest"),
            record(52, 26.3, 3, "male", "yes", "northeast"),
            record(23, 34.4, 0, "male", "no", "southwest"),
            record(61, 25.8, 1, "female", "no", "northeast"),
            record(37, 29.8, 2, "male", "yes", "southeast"),
            record(29, 31.9, 4, "female", "no", "northwest"),
            record(45, 24.6, 5, "male", "no", "southwest"),
            record(50, 33.1, 0, "female", "yes", "northwest"),
        ];
        let mapping = EncodingMapping::fit(&dataset, EncodingStrategy::Ordinal).unwrap();
        let outcome = mapping.transform(&dataset);
        let targets = vec![
            16884.92, 1725.55, 8240.59, 27808.73, 2007.95, 13228.85, 19023.26, 5138.26, 9386.16,
            24671.66,
        ];
        let model = LinearModel::fit(&outcome.matrix, &targets, mapping.feature_names()).unwrap();
        AppState {
            service: Arc::new(InferenceService::new(mapping, Box::new(model))),
        }
    }

    fn degraded_state() -> AppState {
        AppState {
            service: Arc::new(InferenceService::unavailable()),
        }
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let response = health_handler().await;
        assert_eq!(response.0.status, "ok");
        assert_eq!(response.0.message, "API is running");
    }

    #[tokio::test]
    async fn test_predict_endpoint_success() {
        let state = ready_state();
        let input = record(30, 25.0, 0, "female", "no", "northeast");

        let response = predict_handler(State(state), Json(input)).await;
        match response.0 {
            ApiResponse::Ok(result) => {
                assert!(result.predicted_charge.is_finite());
                assert!(chrono::DateTime::parse_from_rfc3339(&result.prediction_time).is_ok());
            }
            ApiResponse::Err { error } => panic!("unexpected error: {}", error),
        }
    }

    #[tokio::test]
    async fn test_predict_endpoint_validation_error_envelope() {
        let state = ready_state();
        let input = record(17, 25.0, 0, "female", "no", "northeast");

        let response = predict_handler(State(state), Json(input)).await;
        match response.0 {
            ApiResponse::Err { error } => assert!(error.contains("age")),
            ApiResponse::Ok(_) => panic!("expected an error envelope"),
        }
    }

    #[tokio::test]
    async fn test_predict_endpoint_degraded_service() {
        let state = degraded_state();
        let input = record(30, 25.0, 0, "female", "no", "northeast");

        let response = predict_handler(State(state), Json(input)).await;
        match response.0 {
            ApiResponse::Err { error } => assert!(error.contains("not loaded")),
            ApiResponse::Ok(_) => panic!("expected an error envelope"),
        }
    }

    #[tokio::test]
    async fn test_batch_endpoint_preserves_order() {
        let state = ready_state();
        let inputs = vec![
            record(25, 22.0, 0, "female", "no", "southwest"),
            record(55, 31.0, 2, "male", "yes", "northeast"),
        ];

        let single_first = state.service.predict_one(&inputs[0]).unwrap();
        let single_second = state.service.predict_one(&inputs[1]).unwrap();

        let response = batch_predict_handler(State(state), Json(inputs)).await;
        match response.0 {
            ApiResponse::Ok(results) => {
                assert_eq!(results.len(), 2);
                assert_eq!(results[0].predicted_charge, single_first.predicted_charge);
                assert_eq!(results[1].predicted_charge, single_second.predicted_charge);
                assert_eq!(results[0].prediction_time, results[1].prediction_time);
            }
            ApiResponse::Err { error } => panic!("unexpected error: {}", error),
        }
    }

    #[test]
    fn test_error_envelope_serialization() {
        let response: ApiResponse<PredictionResult> = ApiResponse::Err {
            error: "Model unavailable".to_string(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["error"], "Model unavailable");

        let response: ApiResponse<PredictionResult> = ApiResponse::Ok(PredictionResult {
            predicted_charge: 1234.56,
            prediction_time: "2024-01-01T00:00:00+00:00".to_string(),
        });
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["predicted_charge"], 1234.56);
    }
}
