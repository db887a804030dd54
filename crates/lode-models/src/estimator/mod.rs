//! Forecasting estimators
//!
//! Every model implements [`Estimator`]: fit on a feature matrix and target,
//! then predict one value per feature row. The benchmark runner depends only
//! on this contract.

pub mod baseline;
pub mod boosting;
pub mod forest;
pub mod tree;

pub use baseline::{HistoricalMean, NaiveBaseline};
pub use boosting::{BoostingConfig, GradientBoostingRegressor};
pub use forest::{ForestConfig, RandomForestRegressor};
pub use tree::{RegressionTree, TreeConfig};

use crate::error::{ModelError, Result};
use lode_features::FeatureMatrix;

/// Uniform fit/predict contract for forecasting models
pub trait Estimator: std::fmt::Debug {
    /// Short model identifier
    fn name(&self) -> &str;

    /// Fit the model to features and target (one target per feature row)
    fn fit(&mut self, features: &FeatureMatrix, target: &[f64]) -> Result<()>;

    /// Predict one value per feature row
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::NotFitted`] when called before [`Estimator::fit`].
    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<f64>>;

    /// Whether `fit` has completed
    fn is_fitted(&self) -> bool;
}

/// Shared argument checks for `fit`.
pub(crate) fn check_training(features: &FeatureMatrix, target: &[f64]) -> Result<()> {
    if features.n_rows() != target.len() {
        return Err(ModelError::DimensionMismatch {
            expected: features.n_rows(),
            actual: target.len(),
        });
    }
    if target.is_empty() {
        return Err(ModelError::EmptyTrainingSet);
    }
    if features.n_features() == 0 {
        return Err(ModelError::NoFeatures);
    }
    Ok(())
}

/// Column-count check for models trained on a fixed width.
pub(crate) fn check_width(features: &FeatureMatrix, expected: usize) -> Result<()> {
    if features.n_features() != expected {
        return Err(ModelError::DimensionMismatch {
            expected,
            actual: features.n_features(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn test_zero_column_matrix_rejected() {
        let x = FeatureMatrix::new(Vec::new(), Array2::zeros((8, 0))).unwrap();
        let y = vec![1.0; 8];

        let mut models: Vec<Box<dyn Estimator>> = vec![
            Box::new(NaiveBaseline::default()),
            Box::new(HistoricalMean::default()),
            Box::new(RegressionTree::default()),
            Box::new(RandomForestRegressor::default()),
            Box::new(GradientBoostingRegressor::default()),
        ];
        for model in &mut models {
            assert!(
                matches!(model.fit(&x, &y), Err(ModelError::NoFeatures)),
                "{} accepted a matrix without columns",
                model.name()
            );
            assert!(!model.is_fitted());
        }
    }
}
