//! Bagged regression trees with per-split feature subsampling.

use super::tree::{RegressionTree, TreeConfig};
use super::{Estimator, check_training, check_width};
use crate::error::{ModelError, Result};
use lode_features::FeatureMatrix;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Random forest configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestConfig {
    /// Number of trees in the forest
    pub n_trees: usize,
    /// Maximum depth of each tree
    pub max_depth: usize,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Features per split (a third of the total if None)
    pub max_features: Option<usize>,
    /// Draw a bootstrap sample per tree
    pub bootstrap: bool,
    /// Random seed
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 8,
            min_samples_split: 4,
            min_samples_leaf: 2,
            max_features: None,
            bootstrap: true,
            seed: 42,
        }
    }
}

/// Random forest regressor
#[derive(Debug, Clone)]
pub struct RandomForestRegressor {
    config: ForestConfig,
    trees: Vec<RegressionTree>,
    n_features: usize,
}

impl RandomForestRegressor {
    /// Create an unfitted forest.
    pub const fn new(config: ForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            n_features: 0,
        }
    }

    /// Configuration in use.
    pub const fn config(&self) -> &ForestConfig {
        &self.config
    }

    /// Number of fitted trees.
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Default for RandomForestRegressor {
    fn default() -> Self {
        Self::new(ForestConfig::default())
    }
}

impl Estimator for RandomForestRegressor {
    fn name(&self) -> &str {
        "random_forest"
    }

    fn fit(&mut self, features: &FeatureMatrix, target: &[f64]) -> Result<()> {
        check_training(features, target)?;
        if self.config.n_trees == 0 {
            return Err(ModelError::InvalidParameter(
                "n_trees must be positive".to_string(),
            ));
        }

        let n_samples = target.len();
        let n_features = features.n_features();
        let max_features = self
            .config
            .max_features
            .unwrap_or_else(|| (n_features / 3).max(1));

        let trees = (0..self.config.n_trees)
            .map(|i| {
                let seed = self.config.seed.wrapping_add(i as u64);
                let mut rng = StdRng::seed_from_u64(seed);
                let indices: Vec<usize> = if self.config.bootstrap {
                    (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
                } else {
                    (0..n_samples).collect()
                };

                let mut tree = RegressionTree::new(TreeConfig {
                    max_depth: self.config.max_depth,
                    min_samples_split: self.config.min_samples_split,
                    min_samples_leaf: self.config.min_samples_leaf,
                    max_features: Some(max_features),
                    seed,
                });
                tree.fit_rows(features.values(), target, &indices, &mut rng);
                tree
            })
            .collect();

        self.trees = trees;
        self.n_features = n_features;
        debug!(
            trees = self.trees.len(),
            samples = n_samples,
            max_features,
            "Fitted random forest"
        );
        Ok(())
    }

    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<f64>> {
        if self.trees.is_empty() {
            return Err(ModelError::NotFitted(self.name().to_string()));
        }
        check_width(features, self.n_features)?;

        let n_trees = self.trees.len() as f64;
        Ok(features
            .values()
            .rows()
            .into_iter()
            .map(|row| {
                self.trees
                    .iter()
                    .map(|tree| tree.predict_row(row))
                    .sum::<f64>()
                    / n_trees
            })
            .collect())
    }

    fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn linear_data(n: usize) -> (FeatureMatrix, Vec<f64>) {
        let x1: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let x2: Vec<f64> = (0..n).map(|i| ((i * 7) % 5) as f64).collect();
        let y = x1.iter().zip(&x2).map(|(a, b)| 2.0 * a + b).collect();
        let m = FeatureMatrix::from_columns(vec!["x1".into(), "x2".into()], &[x1, x2]).unwrap();
        (m, y)
    }

    fn small_forest(seed: u64) -> RandomForestRegressor {
        RandomForestRegressor::new(ForestConfig {
            n_trees: 20,
            seed,
            ..Default::default()
        })
    }

    #[test]
    fn test_fit_predict_tracks_signal() {
        let (x, y) = linear_data(60);
        let mut forest = small_forest(7);
        forest.fit(&x, &y).unwrap();
        assert_eq!(forest.n_trees(), 20);

        let pred = forest.predict(&x).unwrap();
        let mae = pred.iter().zip(&y).map(|(p, t)| (p - t).abs()).sum::<f64>() / y.len() as f64;
        assert!(mae < 10.0, "in-sample MAE too large: {mae}");
    }

    #[test]
    fn test_same_seed_is_deterministic() {
        let (x, y) = linear_data(40);
        let mut a = small_forest(3);
        let mut b = small_forest(3);
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();

        for (p, q) in a.predict(&x).unwrap().iter().zip(b.predict(&x).unwrap()) {
            assert_relative_eq!(*p, q);
        }
    }

    #[test]
    fn test_predictions_within_target_range() {
        let (x, y) = linear_data(30);
        let mut forest = small_forest(11);
        forest.fit(&x, &y).unwrap();

        let lo = y.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = y.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        for p in forest.predict(&x).unwrap() {
            assert!(p >= lo - 1e-9 && p <= hi + 1e-9);
        }
    }

    #[test]
    fn test_unfitted_and_invalid() {
        let (x, y) = linear_data(10);
        assert!(matches!(
            RandomForestRegressor::default().predict(&x),
            Err(ModelError::NotFitted(_))
        ));

        let mut empty = RandomForestRegressor::new(ForestConfig {
            n_trees: 0,
            ..Default::default()
        });
        assert!(matches!(
            empty.fit(&x, &y),
            Err(ModelError::InvalidParameter(_))
        ));
    }
}
