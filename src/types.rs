//! Core data types for the chargecast prediction service
//!
//! This module defines the raw input record, its validated field domains,
//! the encoding strategy selector, and the prediction response shape shared
//! by the inference service and the HTTP API.

use crate::error::{ChargecastError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Inclusive age domain observed in the reference dataset
pub const AGE_MIN: i64 = 18;
pub const AGE_MAX: i64 = 64;

/// Inclusive BMI domain observed in the reference dataset
pub const BMI_MIN: f64 = 15.96;
pub const BMI_MAX: f64 = 53.13;

/// Inclusive children/dependents domain
pub const CHILDREN_MIN: i64 = 0;
pub const CHILDREN_MAX: i64 = 5;

/// Accepted categorical values
pub const SEX_VALUES: [&str; 2] = ["male", "female"];
pub const SMOKER_VALUES: [&str; 2] = ["yes", "no"];
pub const REGION_VALUES: [&str; 4] = ["northeast", "northwest", "southeast", "southwest"];

/// One individual's attributes prior to encoding
///
/// All six fields are mandatory. Values outside the declared domains are
/// rejected by [`RawRecord::validate`] before they reach the encoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Age of the individual (18-64)
    pub age: i64,

    /// Body Mass Index of the individual (15.96-53.13)
    pub bmi: f64,

    /// Number of children/dependents covered by the insurance (0-5)
    pub children: i64,

    /// Gender of the individual (male/female)
    pub sex: String,

    /// Whether the individual is a smoker (yes/no)
    pub smoker: String,

    /// Region where the individual resides
    pub region: String,
}

impl RawRecord {
    /// Validate all fields against their declared domains
    ///
    /// Collects every violation so the caller sees all offending fields at
    /// once, not just the first one.
    pub fn validate(&self) -> Result<()> {
        let mut violations = Vec::new();

        if self.age < AGE_MIN || self.age > AGE_MAX {
            violations.push(format!(
                "age must be between {} and {} (got {})",
                AGE_MIN, AGE_MAX, self.age
            ));
        }

        if !self.bmi.is_finite() || self.bmi < BMI_MIN || self.bmi > BMI_MAX {
            violations.push(format!(
                "bmi must be between {} and {} (got {})",
                BMI_MIN, BMI_MAX, self.bmi
            ));
        }

        if self.children < CHILDREN_MIN || self.children > CHILDREN_MAX {
            violations.push(format!(
                "children must be between {} and {} (got {})",
                CHILDREN_MIN, CHILDREN_MAX, self.children
            ));
        }

        if !SEX_VALUES.contains(&self.sex.as_str()) {
            violations.push(format!(
                "sex must be one of {} (got {:?})",
                SEX_VALUES.join("/"),
                self.sex
            ));
        }

        if !SMOKER_VALUES.contains(&self.smoker.as_str()) {
            violations.push(format!(
                "smoker must be one of {} (got {:?})",
                SMOKER_VALUES.join("/"),
                self.smoker
            ));
        }

        if !REGION_VALUES.contains(&self.region.as_str()) {
            violations.push(format!(
                "region must be one of {} (got {:?})",
                REGION_VALUES.join("/"),
                self.region
            ));
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ChargecastError::Validation(violations.join("; ")))
        }
    }
}

/// Encoding strategy for the multi-categorical `region` column
///
/// Selected once at fit time and frozen into the persisted mapping; the
/// downstream regressor is trained against one fixed column layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodingStrategy {
    /// Single integer column with codes 0..n in first-seen order
    Ordinal,
    /// One 0/1 column per observed category, in first-seen order
    Onehot,
}

impl FromStr for EncodingStrategy {
    type Err = ChargecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ordinal" => Ok(EncodingStrategy::Ordinal),
            "onehot" => Ok(EncodingStrategy::Onehot),
            other => Err(ChargecastError::Configuration(format!(
                "unknown encoding strategy {:?} (expected \"ordinal\" or \"onehot\")",
                other
            ))),
        }
    }
}

impl std::fmt::Display for EncodingStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EncodingStrategy::Ordinal => write!(f, "ordinal"),
            EncodingStrategy::Onehot => write!(f, "onehot"),
        }
    }
}

/// Response for a single prediction, produced fresh per request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Predicted annual insurance charge, rounded to 2 decimal places
    pub predicted_charge: f64,

    /// ISO-8601 timestamp of when the prediction was made
    pub prediction_time: String,
}
