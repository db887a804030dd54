//! CART regression tree, the building block of both ensembles.
//!
//! Splits minimise the summed squared error of the two children. Candidate
//! thresholds are midpoints between consecutive distinct feature values,
//! evaluated in a single sorted sweep per feature.

use super::{Estimator, check_training, check_width};
use crate::error::{ModelError, Result};
use lode_features::FeatureMatrix;
use ndarray::{Array2, ArrayView1};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Regression tree configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Maximum depth (root is depth 0)
    pub max_depth: usize,
    /// Minimum samples a node needs to be split
    pub min_samples_split: usize,
    /// Minimum samples in each child
    pub min_samples_leaf: usize,
    /// Features considered per split (None = all)
    pub max_features: Option<usize>,
    /// Seed for feature subsampling
    pub seed: u64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 6,
            min_samples_split: 4,
            min_samples_leaf: 2,
            max_features: None,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn predict(&self, row: ArrayView1<'_, f64>) -> f64 {
        match self {
            Self::Leaf { value } => *value,
            Self::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if row[*feature] <= *threshold {
                    left.predict(row)
                } else {
                    right.predict(row)
                }
            }
        }
    }

    fn depth(&self) -> usize {
        match self {
            Self::Leaf { .. } => 0,
            Self::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

/// Best split found for a node
struct SplitCandidate {
    gain: f64,
    feature: usize,
    threshold: f64,
}

/// Single regression tree
#[derive(Debug, Clone)]
pub struct RegressionTree {
    config: TreeConfig,
    root: Option<Node>,
    n_features: usize,
}

impl RegressionTree {
    /// Create an unfitted tree.
    pub const fn new(config: TreeConfig) -> Self {
        Self {
            config,
            root: None,
            n_features: 0,
        }
    }

    /// Depth of the fitted tree (0 for a single leaf).
    pub fn depth(&self) -> Option<usize> {
        self.root.as_ref().map(Node::depth)
    }

    /// Fit on the subset of rows in `indices` (repeats allowed, as in a
    /// bootstrap sample).
    pub(crate) fn fit_rows(
        &mut self,
        x: &Array2<f64>,
        y: &[f64],
        indices: &[usize],
        rng: &mut StdRng,
    ) {
        self.n_features = x.ncols();
        self.root = Some(self.build(x, y, indices, 0, rng));
    }

    /// Predict a single row. Unfitted trees predict zero.
    pub(crate) fn predict_row(&self, row: ArrayView1<'_, f64>) -> f64 {
        self.root.as_ref().map_or(0.0, |root| root.predict(row))
    }

    fn build(
        &self,
        x: &Array2<f64>,
        y: &[f64],
        indices: &[usize],
        depth: usize,
        rng: &mut StdRng,
    ) -> Node {
        let n = indices.len();
        let sum: f64 = indices.iter().map(|&i| y[i]).sum();
        let mean = if n == 0 { 0.0 } else { sum / n as f64 };
        let leaf = Node::Leaf { value: mean };

        if depth >= self.config.max_depth || n < self.config.min_samples_split.max(2) {
            return leaf;
        }
        let parent_sse: f64 = indices.iter().map(|&i| (y[i] - mean).powi(2)).sum();
        if parent_sse < 1e-12 {
            return leaf;
        }

        let Some(best) = self.best_split(x, y, indices, parent_sse, rng) else {
            return leaf;
        };

        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .copied()
            .partition(|&i| x[[i, best.feature]] <= best.threshold);

        Node::Split {
            feature: best.feature,
            threshold: best.threshold,
            left: Box::new(self.build(x, y, &left, depth + 1, rng)),
            right: Box::new(self.build(x, y, &right, depth + 1, rng)),
        }
    }

    fn best_split(
        &self,
        x: &Array2<f64>,
        y: &[f64],
        indices: &[usize],
        parent_sse: f64,
        rng: &mut StdRng,
    ) -> Option<SplitCandidate> {
        let n = indices.len();
        let min_leaf = self.config.min_samples_leaf.max(1);

        let mut candidates: Vec<usize> = (0..x.ncols()).collect();
        if let Some(k) = self.config.max_features {
            candidates.shuffle(rng);
            candidates.truncate(k.clamp(1, x.ncols()));
        }

        let total_sum: f64 = indices.iter().map(|&i| y[i]).sum();
        let total_sq: f64 = indices.iter().map(|&i| y[i] * y[i]).sum();

        let mut best: Option<SplitCandidate> = None;
        for feature in candidates {
            let mut order = indices.to_vec();
            order.sort_by(|&a, &b| x[[a, feature]].total_cmp(&x[[b, feature]]));

            let mut left_sum = 0.0;
            let mut left_sq = 0.0;
            for k in 0..n - 1 {
                let i = order[k];
                left_sum += y[i];
                left_sq += y[i] * y[i];

                let n_left = k + 1;
                let n_right = n - n_left;
                if n_left < min_leaf || n_right < min_leaf {
                    continue;
                }
                let here = x[[i, feature]];
                let next = x[[order[k + 1], feature]];
                if here == next {
                    continue;
                }

                let sse_left = left_sq - left_sum * left_sum / n_left as f64;
                let right_sum = total_sum - left_sum;
                let sse_right = (total_sq - left_sq) - right_sum * right_sum / n_right as f64;
                let gain = parent_sse - sse_left - sse_right;

                if gain > 1e-12 && best.as_ref().is_none_or(|b| gain > b.gain) {
                    best = Some(SplitCandidate {
                        gain,
                        feature,
                        threshold: 0.5 * (here + next),
                    });
                }
            }
        }
        best
    }
}

impl Default for RegressionTree {
    fn default() -> Self {
        Self::new(TreeConfig::default())
    }
}

impl Estimator for RegressionTree {
    fn name(&self) -> &str {
        "regression_tree"
    }

    fn fit(&mut self, features: &FeatureMatrix, target: &[f64]) -> Result<()> {
        check_training(features, target)?;
        let indices: Vec<usize> = (0..target.len()).collect();
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        self.fit_rows(features.values(), target, &indices, &mut rng);
        Ok(())
    }

    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<f64>> {
        if self.root.is_none() {
            return Err(ModelError::NotFitted(self.name().to_string()));
        }
        check_width(features, self.n_features)?;
        Ok(features
            .values()
            .rows()
            .into_iter()
            .map(|row| self.predict_row(row))
            .collect())
    }

    fn is_fitted(&self) -> bool {
        self.root.is_some()
    }
}
