//! Squared-loss gradient boosting over shallow regression trees.
//!
//! Starts from the target mean; each stage fits a tree to the current
//! residuals and adds it scaled by the learning rate.

use super::tree::{RegressionTree, TreeConfig};
use super::{Estimator, check_training, check_width};
use crate::error::{ModelError, Result};
use lode_features::FeatureMatrix;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Gradient boosting configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoostingConfig {
    /// Number of boosting stages
    pub n_estimators: usize,
    /// Shrinkage applied to every stage
    pub learning_rate: f64,
    /// Depth of each stage's tree
    pub max_depth: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Fraction of rows drawn (without replacement) per stage
    pub subsample: f64,
    /// Random seed
    pub seed: u64,
}

impl Default for BoostingConfig {
    fn default() -> Self {
        Self {
            n_estimators: 200,
            learning_rate: 0.05,
            max_depth: 3,
            min_samples_leaf: 2,
            subsample: 1.0,
            seed: 42,
        }
    }
}

/// Gradient boosting regressor
#[derive(Debug, Clone)]
pub struct GradientBoostingRegressor {
    config: BoostingConfig,
    init: Option<f64>,
    stages: Vec<RegressionTree>,
    n_features: usize,
}

impl GradientBoostingRegressor {
    /// Create an unfitted regressor.
    pub const fn new(config: BoostingConfig) -> Self {
        Self {
            config,
            init: None,
            stages: Vec::new(),
            n_features: 0,
        }
    }

    /// Configuration in use.
    pub const fn config(&self) -> &BoostingConfig {
        &self.config
    }

    /// Number of fitted stages.
    pub fn n_stages(&self) -> usize {
        self.stages.len()
    }

    fn validate(&self) -> Result<()> {
        if !(self.config.learning_rate > 0.0 && self.config.learning_rate <= 1.0) {
            return Err(ModelError::InvalidParameter(format!(
                "learning_rate must be in (0, 1], got {}",
                self.config.learning_rate
            )));
        }
        if !(self.config.subsample > 0.0 && self.config.subsample <= 1.0) {
            return Err(ModelError::InvalidParameter(format!(
                "subsample must be in (0, 1], got {}",
                self.config.subsample
            )));
        }
        Ok(())
    }
}

impl Default for GradientBoostingRegressor {
    fn default() -> Self {
        Self::new(BoostingConfig::default())
    }
}

impl Estimator for GradientBoostingRegressor {
    fn name(&self) -> &str {
        "gradient_boosting"
    }

    fn fit(&mut self, features: &FeatureMatrix, target: &[f64]) -> Result<()> {
        check_training(features, target)?;
        self.validate()?;

        let x = features.values();
        let n = target.len();
        let init = target.iter().sum::<f64>() / n as f64;
        let mut current = vec![init; n];
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let sample_size = ((n as f64 * self.config.subsample).ceil() as usize).clamp(1, n);

        let tree_config = TreeConfig {
            max_depth: self.config.max_depth,
            min_samples_split: 2 * self.config.min_samples_leaf.max(1),
            min_samples_leaf: self.config.min_samples_leaf,
            max_features: None,
            seed: self.config.seed,
        };

        let mut stages = Vec::with_capacity(self.config.n_estimators);
        let mut all: Vec<usize> = (0..n).collect();
        for _ in 0..self.config.n_estimators {
            let residuals: Vec<f64> = target.iter().zip(&current).map(|(y, f)| y - f).collect();

            let rows: &[usize] = if sample_size < n {
                all.shuffle(&mut rng);
                &all[..sample_size]
            } else {
                &all
            };

            let mut tree = RegressionTree::new(tree_config.clone());
            tree.fit_rows(x, &residuals, rows, &mut rng);

            for (i, row) in x.rows().into_iter().enumerate() {
                current[i] += self.config.learning_rate * tree.predict_row(row);
            }
            stages.push(tree);
        }

        self.init = Some(init);
        self.stages = stages;
        self.n_features = features.n_features();
        debug!(
            stages = self.stages.len(),
            samples = n,
            "Fitted gradient boosting"
        );
        Ok(())
    }

    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<f64>> {
        let init = self
            .init
            .ok_or_else(|| ModelError::NotFitted(self.name().to_string()))?;
        check_width(features, self.n_features)?;

        Ok(features
            .values()
            .rows()
            .into_iter()
            .map(|row| {
                init + self.config.learning_rate
                    * self
                        .stages
                        .iter()
                        .map(|tree| tree.predict_row(row))
                        .sum::<f64>()
            })
            .collect())
    }

    fn is_fitted(&self) -> bool {
        self.init.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn quadratic(n: usize) -> (FeatureMatrix, Vec<f64>) {
        let x: Vec<f64> = (0..n).map(|i| i as f64 / n as f64).collect();
        let y = x.iter().map(|v| 10.0 * v * v).collect();
        (FeatureMatrix::from_columns(vec!["x".into()], &[x]).unwrap(), y)
    }

    fn sse(pred: &[f64], y: &[f64]) -> f64 {
        pred.iter().zip(y).map(|(p, t)| (p - t).powi(2)).sum()
    }

    #[test]
    fn test_zero_stages_predicts_mean() {
        let (x, y) = quadratic(20);
        let mut model = GradientBoostingRegressor::new(BoostingConfig {
            n_estimators: 0,
            ..Default::default()
        });
        model.fit(&x, &y).unwrap();

        let mean = y.iter().sum::<f64>() / y.len() as f64;
        for p in model.predict(&x).unwrap() {
            assert_relative_eq!(p, mean, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_more_stages_reduce_training_error() {
        let (x, y) = quadratic(50);
        let fit = |stages| {
            let mut model = GradientBoostingRegressor::new(BoostingConfig {
                n_estimators: stages,
                learning_rate: 0.1,
                ..Default::default()
            });
            model.fit(&x, &y).unwrap();
            sse(&model.predict(&x).unwrap(), &y)
        };
        assert!(fit(50) < fit(5));
    }

    #[test]
    fn test_subsample_is_seeded() {
        let (x, y) = quadratic(40);
        let config = BoostingConfig {
            n_estimators: 30,
            subsample: 0.5,
            seed: 9,
            ..Default::default()
        };
        let mut a = GradientBoostingRegressor::new(config.clone());
        let mut b = GradientBoostingRegressor::new(config);
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        assert_eq!(a.predict(&x).unwrap(), b.predict(&x).unwrap());
    }

    #[rstest]
    #[case(0.0, 1.0)]
    #[case(1.5, 1.0)]
    #[case(0.1, 0.0)]
    #[case(0.1, 1.2)]
    fn test_rejects_invalid_parameters(#[case] learning_rate: f64, #[case] subsample: f64) {
        let (x, y) = quadratic(10);
        let mut model = GradientBoostingRegressor::new(BoostingConfig {
            learning_rate,
            subsample,
            ..Default::default()
        });
        assert!(matches!(
            model.fit(&x, &y),
            Err(ModelError::InvalidParameter(_))
        ));
        assert!(!model.is_fitted());
    }
}
