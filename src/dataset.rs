//! Training-dataset loading
//!
//! Reads the cleaned health-insurance CSV (age, sex, bmi, children, smoker,
//! region, charges) into raw records plus the charge targets.

use crate::error::{ChargecastError, Result};
use crate::types::RawRecord;
use serde::Deserialize;
use std::io;
use std::path::Path;
use tracing::info;

/// One row of the training CSV, matched by header name
#[derive(Debug, Deserialize)]
struct TrainingRow {
    age: i64,
    sex: String,
    bmi: f64,
    children: i64,
    smoker: String,
    region: String,
    charges: f64,
}

/// Training dataset: raw records with their charge targets, in file order
#[derive(Debug, Clone)]
pub struct TrainingSet {
    pub records: Vec<RawRecord>,
    pub charges: Vec<f64>,
}

impl TrainingSet {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Load the training dataset from a CSV file
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<TrainingSet> {
    let path = path.as_ref();
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| {
            ChargecastError::Other(format!("Failed to open dataset {}: {}", path.display(), e))
        })?;

    let dataset = from_reader(reader)?;
    info!("Loaded {} training rows from {}", dataset.len(), path.display());
    Ok(dataset)
}

/// Parse a training dataset from any CSV reader
pub fn from_reader<R: io::Read>(mut reader: csv::Reader<R>) -> Result<TrainingSet> {
    let mut records = Vec::new();
    let mut charges = Vec::new();

    for row in reader.deserialize() {
        let row: TrainingRow = row?;
        records.push(RawRecord {
            age: row.age,
            bmi: row.bmi,
            children: row.children,
            sex: row.sex,
            smoker: row.smoker,
            region: row.region,
        });
        charges.push(row.charges);
    }

    if records.is_empty() {
        return Err(ChargecastError::Configuration(
            "training dataset contains no rows".to_string(),
        ));
    }

    Ok(TrainingSet { records, charges })
}
