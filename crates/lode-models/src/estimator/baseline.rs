//! Baseline predictors.

use super::{Estimator, check_training};
use crate::error::{ModelError, Result};
use lode_features::{FeatureMatrix, LEVEL_FEATURE};

/// Persistence forecast: the value `H` months ahead equals today's level.
#[derive(Debug, Default, Clone)]
pub struct NaiveBaseline {
    fitted: bool,
}

impl NaiveBaseline {
    /// Create an unfitted baseline.
    pub const fn new() -> Self {
        Self { fitted: false }
    }
}

impl Estimator for NaiveBaseline {
    fn name(&self) -> &str {
        "naive"
    }

    fn fit(&mut self, features: &FeatureMatrix, target: &[f64]) -> Result<()> {
        check_training(features, target)?;
        if features.index_of(LEVEL_FEATURE).is_none() {
            return Err(ModelError::MissingFeature(LEVEL_FEATURE.to_string()));
        }
        self.fitted = true;
        Ok(())
    }

    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<f64>> {
        if !self.fitted {
            return Err(ModelError::NotFitted(self.name().to_string()));
        }
        features
            .column(LEVEL_FEATURE)
            .map(|level| level.to_vec())
            .ok_or_else(|| ModelError::MissingFeature(LEVEL_FEATURE.to_string()))
    }

    fn is_fitted(&self) -> bool {
        self.fitted
    }
}

/// Constant forecast: the mean of the training targets.
#[derive(Debug, Default, Clone)]
pub struct HistoricalMean {
    mean: Option<f64>,
}

impl HistoricalMean {
    /// Create an unfitted predictor.
    pub const fn new() -> Self {
        Self { mean: None }
    }

    /// Fitted mean, if any.
    pub const fn mean(&self) -> Option<f64> {
        self.mean
    }
}

impl Estimator for HistoricalMean {
    fn name(&self) -> &str {
        "historical_mean"
    }

    fn fit(&mut self, features: &FeatureMatrix, target: &[f64]) -> Result<()> {
        check_training(features, target)?;
        self.mean = Some(target.iter().sum::<f64>() / target.len() as f64);
        Ok(())
    }

    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<f64>> {
        let mean = self
            .mean
            .ok_or_else(|| ModelError::NotFitted(self.name().to_string()))?;
        Ok(vec![mean; features.n_rows()])
    }

    fn is_fitted(&self) -> bool {
        self.mean.is_some()
    }
}
