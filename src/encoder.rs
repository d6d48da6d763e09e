//! Feature encoder: raw tabular records to model-ready numeric rows
//!
//! The encoding mapping is fitted once over a reference dataset, frozen, and
//! persisted alongside the regression model. The transform step replays the
//! fitted mapping at inference time; the category-to-integer assignments and
//! the derived column order must match the fit exactly, because the regressor
//! was trained against one fixed column layout. Mapping persistence is the
//! guard against fit/inference drift, not runtime checks.

use crate::error::{ChargecastError, Result};
use crate::types::{EncodingStrategy, RawRecord};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Sentinel for a categorical value never seen during fitting
const UNKNOWN_SENTINEL: f64 = -1.0;

/// Immutable category-to-integer mapping fitted over a reference dataset
///
/// Category codes follow first-seen order during fitting; alphabetical order
/// is not guaranteed anywhere. The mapping is bundled with its strategy tag
/// and derived feature names so that a reloaded artifact reproduces the fit
/// exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodingMapping {
    strategy: EncodingStrategy,
    sex_categories: Vec<String>,
    smoker_categories: Vec<String>,
    region_categories: Vec<String>,
    feature_names: Vec<String>,
}

/// One categorical value that was not present in the fitted mapping
///
/// Carried alongside the encoded matrix so callers can log data drift
/// without changing the non-throwing transform contract.
#[derive(Debug, Clone, PartialEq)]
pub struct UnknownCategory {
    /// Index of the record within the transformed batch
    pub row: usize,
    /// Source column name
    pub column: &'static str,
    /// The unrecognized value
    pub value: String,
}

/// Result of transforming a batch of records
#[derive(Debug, Clone, PartialEq)]
pub struct TransformOutcome {
    /// One numeric row per input record, in input order
    pub matrix: Vec<Vec<f64>>,
    /// Categorical values that fell back to the unknown-category sentinel
    pub unknown: Vec<UnknownCategory>,
}

impl EncodingMapping {
    /// Fit an encoding mapping over a reference dataset
    ///
    /// Scans the binary columns (sex, smoker) and the region column, assigning
    /// integer codes in order of first appearance. Numerical columns (age,
    /// bmi, children) pass through unchanged.
    pub fn fit(records: &[RawRecord], strategy: EncodingStrategy) -> Result<Self> {
        if records.is_empty() {
            return Err(ChargecastError::Configuration(
                "cannot fit an encoding mapping on an empty dataset".to_string(),
            ));
        }

        let mut sex_categories = Vec::new();
        let mut smoker_categories = Vec::new();
        let mut region_categories = Vec::new();

        for record in records {
            discover(&mut sex_categories, &record.sex);
            discover(&mut smoker_categories, &record.smoker);
            discover(&mut region_categories, &record.region);
        }

        let mut feature_names: Vec<String> = ["age", "bmi", "children", "sex", "smoker"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        match strategy {
            EncodingStrategy::Ordinal => feature_names.push("region".to_string()),
            EncodingStrategy::Onehot => {
                for category in &region_categories {
                    feature_names.push(format!("region_{}", category));
                }
            }
        }

        debug!(
            "Fitted {} encoding mapping: sex={:?} smoker={:?} region={:?}",
            strategy, sex_categories, smoker_categories, region_categories
        );

        Ok(Self {
            strategy,
            sex_categories,
            smoker_categories,
            region_categories,
            feature_names,
        })
    }

    /// Apply the fitted mapping to a batch of records
    ///
    /// Values not seen during fitting never fail: ordinal columns fall back
    /// to the -1 sentinel and one-hot region rows stay all zero. Each such
    /// fallback is reported in the outcome so the caller can decide whether
    /// to log it.
    pub fn transform(&self, records: &[RawRecord]) -> TransformOutcome {
        let mut matrix = Vec::with_capacity(records.len());
        let mut unknown = Vec::new();

        for (row, record) in records.iter().enumerate() {
            let mut values = Vec::with_capacity(self.feature_names.len());
            values.push(record.age as f64);
            values.push(record.bmi);
            values.push(record.children as f64);

            values.push(encode_ordinal(
                &self.sex_categories,
                &record.sex,
                row,
                "sex",
                &mut unknown,
            ));
            values.push(encode_ordinal(
                &self.smoker_categories,
                &record.smoker,
                row,
                "smoker",
                &mut unknown,
            ));

            match self.strategy {
                EncodingStrategy::Ordinal => {
                    values.push(encode_ordinal(
                        &self.region_categories,
                        &record.region,
                        row,
                        "region",
                        &mut unknown,
                    ));
                }
                EncodingStrategy::Onehot => {
                    let position = self
                        .region_categories
                        .iter()
                        .position(|c| c == &record.region);
                    for index in 0..self.region_categories.len() {
                        values.push(if position == Some(index) { 1.0 } else { 0.0 });
                    }
                    if position.is_none() {
                        unknown.push(UnknownCategory {
                            row,
                            column: "region",
                            value: record.region.clone(),
                        });
                    }
                }
            }

            matrix.push(values);
        }

        TransformOutcome { matrix, unknown }
    }

    /// Strategy this mapping was fitted with
    pub fn strategy(&self) -> EncodingStrategy {
        self.strategy
    }

    /// Canonical feature-column names, in transform output order
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Region categories in first-seen (code) order
    pub fn region_categories(&self) -> &[String] {
        &self.region_categories
    }

    /// Sex categories in first-seen (code) order
    pub fn sex_categories(&self) -> &[String] {
        &self.sex_categories
    }

    /// Smoker categories in first-seen (code) order
    pub fn smoker_categories(&self) -> &[String] {
        &self.smoker_categories
    }

    /// Width of the transform output rows
    pub fn width(&self) -> usize {
        self.feature_names.len()
    }

    /// Serialize the mapping to a JSON artifact
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| {
            ChargecastError::Other(format!(
                "Failed to write preprocessor artifact {}: {}",
                path.display(),
                e
            ))
        })?;
        info!("Saved encoding mapping to {}", path.display());
        Ok(())
    }

    /// Load a previously saved mapping
    ///
    /// The loaded mapping is functionally identical to the saved one: same
    /// category-to-integer assignments, same column order.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| {
            ChargecastError::Other(format!(
                "Failed to read preprocessor artifact {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// Record a category in first-seen order
fn discover(categories: &mut Vec<String>, value: &str) {
    if !categories.iter().any(|c| c == value) {
        categories.push(value.to_string());
    }
}

/// Encode one categorical value as its fitted ordinal code, or the sentinel
fn encode_ordinal(
    categories: &[String],
    value: &str,
    row: usize,
    column: &'static str,
    unknown: &mut Vec<UnknownCategory>,
) -> f64 {
    match categories.iter().position(|c| c == value) {
        Some(code) => code as f64,
        None => {
            unknown.push(UnknownCategory {
                row,
                column,
                value: value.to_string(),
            });
            UNKNOWN_SENTINEL
        }
    }
}
