//! Offline training pipeline
//!
//! Mirrors the one-shot feature-engineering + model-fitting step that
//! produces the artifacts the inference service replays per request:
//! load the cleaned CSV, fit the encoding mapping under the chosen strategy,
//! transform, fit the regressor, persist both artifacts.

use crate::config::{MODEL_FILE, PREPROCESSOR_FILE};
use crate::dataset;
use crate::encoder::EncodingMapping;
use crate::error::Result;
use crate::model::LinearModel;
use crate::types::EncodingStrategy;
use std::fs;
use std::path::Path;
use tracing::info;

/// Summary of one training run
#[derive(Debug, Clone)]
pub struct TrainingReport {
    /// Number of training rows
    pub rows: usize,
    /// Feature columns the model was fitted against, in order
    pub feature_names: Vec<String>,
    /// Mean absolute error over the training set
    pub mae: f64,
    /// Root mean squared error over the training set
    pub rmse: f64,
    /// Coefficient of determination over the training set
    pub r2: f64,
}

/// Run the full training pipeline and write artifacts into `model_dir`
pub fn run_training<P: AsRef<Path>, Q: AsRef<Path>>(
    data: P,
    model_dir: Q,
    strategy: EncodingStrategy,
) -> Result<TrainingReport> {
    let model_dir = model_dir.as_ref();
    let dataset = dataset::load_csv(data)?;

    let mapping = EncodingMapping::fit(&dataset.records, strategy)?;
    log_mapping_summary(&mapping);

    let outcome = mapping.transform(&dataset.records);
    debug_assert!(outcome.unknown.is_empty(), "fit-time transform saw unknown categories");

    let model = LinearModel::fit(&outcome.matrix, &dataset.charges, mapping.feature_names())?;

    let predictions = {
        use crate::model::Predictor;
        model.predict(&outcome.matrix)?
    };
    let report = TrainingReport {
        rows: dataset.len(),
        feature_names: mapping.feature_names().to_vec(),
        mae: mean_absolute_error(&dataset.charges, &predictions),
        rmse: root_mean_squared_error(&dataset.charges, &predictions),
        r2: r2_score(&dataset.charges, &predictions),
    };
    info!(
        "Training fit over {} rows: MAE={:.2} RMSE={:.2} R2={:.4}",
        report.rows, report.mae, report.rmse, report.r2
    );

    fs::create_dir_all(model_dir)?;
    mapping.save(model_dir.join(PREPROCESSOR_FILE))?;
    model.save(model_dir.join(MODEL_FILE))?;
    info!("Wrote prediction artifacts to {}", model_dir.display());

    Ok(report)
}

/// Log the fitted category-to-code assignments for reference
fn log_mapping_summary(mapping: &EncodingMapping) {
    info!("Encoding mappings summary ({} strategy)", mapping.strategy());
    info!("  sex: {:?}", code_pairs(mapping.sex_categories()));
    info!("  smoker: {:?}", code_pairs(mapping.smoker_categories()));
    match mapping.strategy() {
        EncodingStrategy::Ordinal => {
            info!("  region: {:?}", code_pairs(mapping.region_categories()));
        }
        EncodingStrategy::Onehot => {
            info!("  region categories: {:?}", mapping.region_categories());
        }
    }
    info!("  feature columns: {:?}", mapping.feature_names());
}

fn code_pairs(categories: &[String]) -> Vec<(String, usize)> {
    categories
        .iter()
        .enumerate()
        .map(|(code, category)| (category.clone(), code))
        .collect()
}

fn mean_absolute_error(targets: &[f64], predictions: &[f64]) -> f64 {
    let n = targets.len() as f64;
    targets
        .iter()
        .zip(predictions)
        .map(|(t, p)| (t - p).abs())
        .sum::<f64>()
        / n
}

fn root_mean_squared_error(targets: &[f64], predictions: &[f64]) -> f64 {
    let n = targets.len() as f64;
    (targets
        .iter()
        .zip(predictions)
        .map(|(t, p)| (t - p).powi(2))
        .sum::<f64>()
        / n)
        .sqrt()
}

fn r2_score(targets: &[f64], predictions: &[f64]) -> f64 {
    let mean = targets.iter().sum::<f64>() / targets.len() as f64;
    let ss_tot: f64 = targets.iter().map(|t| (t - mean).powi(2)).sum();
    let ss_res: f64 = targets
        .iter()
        .zip(predictions)
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    if ss_tot == 0.0 {
        return 0.0;
    }
    1.0 - ss_res / ss_tot
}
