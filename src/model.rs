//! Regression model: the opaque predictor behind the inference service
//!
//! The service only depends on the [`Predictor`] trait; [`LinearModel`] is the
//! concrete ordinary-least-squares regressor fitted by the training pipeline
//! and persisted as a JSON artifact. Swapping in a different regressor means
//! implementing the trait for it, nothing else changes.

use crate::error::{ChargecastError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

/// Opaque regression function over a numeric feature matrix
pub trait Predictor: Send + Sync {
    /// Predict one scalar per input row, in input order
    fn predict(&self, matrix: &[Vec<f64>]) -> Result<Vec<f64>>;
}

/// Tikhonov damping applied to the feature diagonal of the normal equations.
/// Keeps the system solvable when feature columns are collinear, e.g. a full
/// set of one-hot columns alongside the intercept.
const RIDGE: f64 = 1e-6;

/// Least-squares linear regressor with a small ridge damping term
///
/// Carries the feature names it was fitted against so a mismatched
/// preprocessor artifact fails loudly instead of silently mis-predicting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    intercept: f64,
    coefficients: Vec<f64>,
    feature_names: Vec<String>,
}

impl LinearModel {
    /// Fit by ordinary least squares (normal equations)
    pub fn fit(matrix: &[Vec<f64>], targets: &[f64], feature_names: &[String]) -> Result<Self> {
        if matrix.is_empty() {
            return Err(ChargecastError::Configuration(
                "cannot fit a model on an empty feature matrix".to_string(),
            ));
        }
        if matrix.len() != targets.len() {
            return Err(ChargecastError::Configuration(format!(
                "feature matrix has {} rows but {} targets were given",
                matrix.len(),
                targets.len()
            )));
        }
        let width = feature_names.len();
        if let Some(row) = matrix.iter().find(|row| row.len() != width) {
            return Err(ChargecastError::Configuration(format!(
                "feature row has width {} but {} feature names were given",
                row.len(),
                width
            )));
        }

        // Normal equations over the design matrix augmented with a bias column:
        // solve (X'X + ridge) w = X'y for w = [intercept, coefficients...].
        // The intercept is not damped.
        let n = width + 1;
        let mut xtx = vec![vec![0.0; n]; n];
        let mut xty = vec![0.0; n];

        for (row, &y) in matrix.iter().zip(targets) {
            for i in 0..n {
                let xi = if i == 0 { 1.0 } else { row[i - 1] };
                xty[i] += xi * y;
                for j in 0..n {
                    let xj = if j == 0 { 1.0 } else { row[j - 1] };
                    xtx[i][j] += xi * xj;
                }
            }
        }
        for i in 1..n {
            xtx[i][i] += RIDGE;
        }

        let weights = solve(xtx, xty)?;

        Ok(Self {
            intercept: weights[0],
            coefficients: weights[1..].to_vec(),
            feature_names: feature_names.to_vec(),
        })
    }

    /// Feature names this model was fitted against, in column order
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Fitted coefficients, one per feature column
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Fitted intercept
    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Serialize the model to a JSON artifact
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| {
            ChargecastError::Other(format!(
                "Failed to write model artifact {}: {}",
                path.display(),
                e
            ))
        })?;
        info!("Saved model to {}", path.display());
        Ok(())
    }

    /// Load a previously saved model
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| {
            ChargecastError::Other(format!(
                "Failed to read model artifact {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(serde_json::from_str(&json)?)
    }
}

impl Predictor for LinearModel {
    fn predict(&self, matrix: &[Vec<f64>]) -> Result<Vec<f64>> {
        let width = self.coefficients.len();
        let mut predictions = Vec::with_capacity(matrix.len());

        for row in matrix {
            if row.len() != width {
                return Err(ChargecastError::Configuration(format!(
                    "feature row has width {} but the model was fitted on {} columns",
                    row.len(),
                    width
                )));
            }
            let dot: f64 = row.iter().zip(&self.coefficients).map(|(x, c)| x * c).sum();
            predictions.push(self.intercept + dot);
        }

        Ok(predictions)
    }
}

/// Solve a dense linear system by Gaussian elimination with partial pivoting
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>> {
    let n = b.len();

    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
            .ok_or_else(|| ChargecastError::Configuration("empty linear system".to_string()))?;
        if a[pivot][col].abs() < 1e-12 {
            return Err(ChargecastError::Configuration(
                "design matrix is singular; the dataset does not determine the model \
                 (a feature column may be constant or duplicated)"
                    .to_string(),
            ));
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in (col + 1)..n {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = ((row + 1)..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }

    Ok(x)
}
