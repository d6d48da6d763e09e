//! Inference service: validate, encode, predict, format
//!
//! The service is an explicitly constructed context object: artifacts are
//! loaded once at process start and shared read-only across request handlers.
//! If either artifact fails to load the service starts degraded and every
//! prediction call fails with `ModelUnavailable` until the process is
//! restarted with valid artifacts.

use crate::config::ServiceConfig;
use crate::encoder::EncodingMapping;
use crate::error::{ChargecastError, Result};
use crate::model::{LinearModel, Predictor};
use crate::types::{PredictionResult, RawRecord};
use chrono::Utc;
use tracing::{error, info, warn};

/// Loaded prediction artifacts, immutable after startup
struct Artifacts {
    mapping: EncodingMapping,
    predictor: Box<dyn Predictor>,
}

/// Prediction service shared by all request handlers
pub struct InferenceService {
    artifacts: Option<Artifacts>,
}

impl InferenceService {
    /// Load artifacts from the configured model directory
    ///
    /// A load failure is logged once and yields a degraded service rather
    /// than an error: /health must keep answering while every prediction
    /// call reports the misconfiguration.
    pub fn load(config: &ServiceConfig) -> Self {
        match Self::try_load(config) {
            Ok(service) => service,
            Err(e) => {
                error!(
                    "Failed to load prediction artifacts from {}: {}; serving degraded",
                    config.model_dir.display(),
                    e
                );
                Self { artifacts: None }
            }
        }
    }

    fn try_load(config: &ServiceConfig) -> Result<Self> {
        let mapping = EncodingMapping::load(config.preprocessor_path())?;
        let model = LinearModel::load(config.model_path())?;

        if mapping.feature_names() != model.feature_names() {
            return Err(ChargecastError::Configuration(format!(
                "preprocessor columns {:?} do not match model columns {:?}",
                mapping.feature_names(),
                model.feature_names()
            )));
        }

        info!(
            "Loaded prediction artifacts ({} encoding, {} feature columns)",
            mapping.strategy(),
            mapping.width()
        );
        Ok(Self::new(mapping, Box::new(model)))
    }

    /// Build a service from already-loaded artifacts
    pub fn new(mapping: EncodingMapping, predictor: Box<dyn Predictor>) -> Self {
        Self {
            artifacts: Some(Artifacts { mapping, predictor }),
        }
    }

    /// Build a degraded service with no artifacts
    pub fn unavailable() -> Self {
        Self { artifacts: None }
    }

    /// Whether prediction artifacts are loaded
    pub fn is_ready(&self) -> bool {
        self.artifacts.is_some()
    }

    /// Predict the annual charge for one record
    pub fn predict_one(&self, record: &RawRecord) -> Result<PredictionResult> {
        record.validate()?;
        let charges = self.predict_valid(std::slice::from_ref(record))?;

        Ok(PredictionResult {
            predicted_charge: charges[0],
            prediction_time: Utc::now().to_rfc3339(),
        })
    }

    /// Predict annual charges for a batch of records
    ///
    /// The batch is atomic: every record is validated up front and any
    /// violation fails the whole call. One matrix is built and the predictor
    /// is invoked once, so results keep input order and all share a single
    /// timestamp.
    pub fn predict_batch(&self, records: &[RawRecord]) -> Result<Vec<PredictionResult>> {
        for (index, record) in records.iter().enumerate() {
            record.validate().map_err(|e| match e {
                ChargecastError::Validation(msg) => {
                    ChargecastError::Validation(format!("record {}: {}", index, msg))
                }
                other => other,
            })?;
        }

        let charges = self.predict_valid(records)?;
        let prediction_time = Utc::now().to_rfc3339();

        Ok(charges
            .into_iter()
            .map(|predicted_charge| PredictionResult {
                predicted_charge,
                prediction_time: prediction_time.clone(),
            })
            .collect())
    }

    /// Encode already-validated records and run the predictor
    fn predict_valid(&self, records: &[RawRecord]) -> Result<Vec<f64>> {
        let artifacts = self.artifacts.as_ref().ok_or(ChargecastError::ModelUnavailable)?;

        let outcome = artifacts.mapping.transform(records);
        for unknown in &outcome.unknown {
            warn!(
                "Unseen {} category {:?} in record {} encoded with the fallback sentinel",
                unknown.column, unknown.value, unknown.row
            );
        }

        let charges = artifacts.predictor.predict(&outcome.matrix)?;
        Ok(charges.into_iter().map(round_to_cents).collect())
    }
}

/// Round to 2 decimal places using round-half-to-even
pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EncodingStrategy;

    fn record(age: i64, sex: &str, smoker: &str, region: &str) -> RawRecord {
        full_record(age, 25.0, 0, sex, smoker, region)
    }

    fn full_record(
        age: i64,
        bmi: f64,
        children: i64,
        sex: &str,
        smoker: &str,
        region: &str,
    ) -> RawRecord {
        RawRecord {
            age,
            bmi,
            children,
            sex: sex.to_string(),
            smoker: smoker.to_string(),
            region: region.to_string(),
        }
    }

    fn reference_dataset() -> Vec<RawRecord> {
        vec![
            full_record(19, 27.9, 0, "female", "yes", "southwest"),
            full_record(33, 22.7, 1, "male", "no", "southeast"),
            full_record(46, 30.1, 2, "female", "no", "northwest"),
            full_record(52, 26.3, 3, "male", "yes", "northeast"),
            full_record(23, 34.4, 0, "male", "no", "southwest"),
            full_record(61, 25.8, 1, "female", "no", "northeast"),
            full_record(37, 29.8, 2, "male", "yes", "southeast"),
            full_record(29, 31.9, 4, "female", "no", "northwest"),
            full_record(45, 24.6, 5, "male", "no", "southwest"),
            full_record(50, 33.1, 0, "female", "yes", "northwest"),
        ]
    }

    fn fitted_service() -> InferenceService {
        let dataset = reference_dataset();
        let mapping = EncodingMapping::fit(&dataset, EncodingStrategy::Ordinal).unwrap();
        let outcome = mapping.transform(&dataset);
        let targets = vec![
            16884.92, 1725.55, 8240.59, 27808.73, 2007.95, 13228.85, 19023.26, 5138.26, 9386.16,
            24671.66,
        ];
        let model = LinearModel::fit(&outcome.matrix, &targets, mapping.feature_names()).unwrap();
        InferenceService::new(mapping, Box::new(model))
    }

    #[test]
    fn test_round_to_cents_half_even() {
        assert_eq!(round_to_cents(0.125), 0.12);
        assert_eq!(round_to_cents(0.375), 0.38);
        assert_eq!(round_to_cents(12.3449), 12.34);
        assert_eq!(round_to_cents(-0.125), -0.12);
    }

    #[test]
    fn test_predict_one_contract() {
        let service = fitted_service();
        let result = service.predict_one(&record(30, "female", "no", "northeast")).unwrap();

        assert!(result.predicted_charge.is_finite());
        assert_eq!(result.predicted_charge, round_to_cents(result.predicted_charge));
        assert!(chrono::DateTime::parse_from_rfc3339(&result.prediction_time).is_ok());
    }

    #[test]
    fn test_prediction_is_deterministic() {
        let service = fitted_service();
        let input = record(30, "female", "no", "northeast");
        let first = service.predict_one(&input).unwrap();
        let second = service.predict_one(&input).unwrap();
        assert_eq!(first.predicted_charge, second.predicted_charge);
    }

    #[test]
    fn test_batch_matches_single() {
        let service = fitted_service();
        let input = record(42, "male", "yes", "southwest");

        let single = service.predict_one(&input).unwrap();
        let batch = service.predict_batch(std::slice::from_ref(&input)).unwrap();

        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].predicted_charge, single.predicted_charge);
    }

    #[test]
    fn test_batch_shares_one_timestamp() {
        let service = fitted_service();
        let inputs = vec![
            record(25, "female", "no", "southwest"),
            record(55, "male", "yes", "northeast"),
        ];
        let results = service.predict_batch(&inputs).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].prediction_time, results[1].prediction_time);
    }

    #[test]
    fn test_batch_is_atomic_on_invalid_record() {
        let service = fitted_service();
        let inputs = vec![
            record(25, "female", "no", "southwest"),
            record(17, "male", "yes", "northeast"),
        ];
        let err = service.predict_batch(&inputs).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("record 1"));
        assert!(msg.contains("age"));
    }

    #[test]
    fn test_degraded_service_reports_unavailable() {
        let service = InferenceService::unavailable();
        assert!(!service.is_ready());

        let err = service.predict_one(&record(30, "female", "no", "northeast")).unwrap_err();
        assert!(matches!(err, ChargecastError::ModelUnavailable));
    }

    #[test]
    fn test_unseen_region_does_not_fail() {
        // Mapping fitted without the northeast region; a schema-valid record
        // mentioning it must still predict
        let dataset: Vec<RawRecord> = reference_dataset()
            .into_iter()
            .filter(|r| r.region != "northeast")
            .collect();
        let mapping = EncodingMapping::fit(&dataset, EncodingStrategy::Ordinal).unwrap();
        let outcome = mapping.transform(&dataset);
        let targets: Vec<f64> = (0..dataset.len()).map(|i| 1000.0 + 500.0 * i as f64).collect();
        let model = LinearModel::fit(&outcome.matrix, &targets, mapping.feature_names()).unwrap();
        let service = InferenceService::new(mapping, Box::new(model));

        let result = service.predict_one(&record(30, "female", "no", "northeast")).unwrap();
        assert!(result.predicted_charge.is_finite());
    }

    #[test]
    fn test_load_missing_artifacts_degrades() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServiceConfig::default().with_model_dir(dir.path());
        let service = InferenceService::load(&config);
        assert!(!service.is_ready());
    }
}
