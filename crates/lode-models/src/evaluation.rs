//! Forecast accuracy metrics.

use crate::error::EvaluationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Accuracy of one set of predictions against the truth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Root mean squared error
    pub rmse: f64,
    /// Mean absolute error
    pub mae: f64,
    /// Mean signed error (prediction minus truth)
    pub bias: f64,
    /// Number of scored points
    pub n: usize,
}

impl Metrics {
    /// Named scalar view, keyed by metric name.
    pub fn to_map(&self) -> BTreeMap<&'static str, f64> {
        BTreeMap::from([
            ("rmse", self.rmse),
            ("mae", self.mae),
            ("bias", self.bias),
            ("n", self.n as f64),
        ])
    }
}

fn check(y_true: &[f64], y_pred: &[f64]) -> Result<(), EvaluationError> {
    if y_true.len() != y_pred.len() {
        return Err(EvaluationError::LengthMismatch {
            truth: y_true.len(),
            predicted: y_pred.len(),
        });
    }
    if y_true.is_empty() {
        return Err(EvaluationError::Empty);
    }
    Ok(())
}

/// Root mean squared error.
pub fn rmse(y_true: &[f64], y_pred: &[f64]) -> Result<f64, EvaluationError> {
    check(y_true, y_pred)?;
    let mse = y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (p - t).powi(2))
        .sum::<f64>()
        / y_true.len() as f64;
    Ok(mse.sqrt())
}

/// Mean absolute error.
pub fn mae(y_true: &[f64], y_pred: &[f64]) -> Result<f64, EvaluationError> {
    check(y_true, y_pred)?;
    Ok(y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (p - t).abs())
        .sum::<f64>()
        / y_true.len() as f64)
}

/// Score predictions against the truth.
pub fn evaluate(y_true: &[f64], y_pred: &[f64]) -> Result<Metrics, EvaluationError> {
    check(y_true, y_pred)?;
    let n = y_true.len();
    let bias = y_true.iter().zip(y_pred).map(|(t, p)| p - t).sum::<f64>() / n as f64;
    Ok(Metrics {
        rmse: rmse(y_true, y_pred)?,
        mae: mae(y_true, y_pred)?,
        bias,
        n,
    })
}
