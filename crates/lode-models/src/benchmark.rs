//! Chronological hold-out benchmark of several estimators.

use crate::error::{ModelError, Result};
use crate::estimator::Estimator;
use crate::evaluation::{Metrics, evaluate};
use chrono::NaiveDate;
use lode_data::Mineral;
use lode_features::FeatureSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Benchmark configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    /// Share of rows (oldest first) used for training
    pub train_fraction: f64,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            train_fraction: 0.8,
        }
    }
}

/// Held-out score of one model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelScore {
    /// Model name
    pub model: String,
    /// Test-set metrics
    pub metrics: Metrics,
}

/// All model scores for one (mineral, horizon)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRun {
    /// Mineral forecast
    pub mineral: Mineral,
    /// Forecast horizon in months
    pub horizon: usize,
    /// Training rows
    pub train_rows: usize,
    /// Test rows
    pub test_rows: usize,
    /// First test month
    pub test_start: Option<NaiveDate>,
    /// Scores in model order
    pub scores: Vec<ModelScore>,
}

impl BenchmarkRun {
    /// Score with the lowest RMSE.
    pub fn best(&self) -> Option<&ModelScore> {
        self.scores
            .iter()
            .min_by(|a, b| a.metrics.rmse.total_cmp(&b.metrics.rmse))
    }
}

/// Fit every model on `train` and score it on `test`.
pub fn run_benchmark(
    models: &mut [Box<dyn Estimator>],
    train: &FeatureSet,
    test: &FeatureSet,
) -> Result<Vec<ModelScore>> {
    if train.is_empty() || test.is_empty() {
        return Err(ModelError::InsufficientData {
            train: train.len(),
            test: test.len(),
        });
    }

    let x_train = train.matrix()?;
    let y_train = train.target()?;
    let x_test = test.matrix()?;
    let y_test = test.target()?;

    models
        .iter_mut()
        .map(|model| {
            model.fit(&x_train, &y_train)?;
            let predictions = model.predict(&x_test)?;
            let metrics = evaluate(&y_test, &predictions)?;
            debug!(
                model = model.name(),
                rmse = metrics.rmse,
                mae = metrics.mae,
                "Scored model"
            );
            Ok(ModelScore {
                model: model.name().to_string(),
                metrics,
            })
        })
        .collect()
}

/// Split a feature set chronologically and benchmark every model on it.
pub fn benchmark_feature_set(
    models: &mut [Box<dyn Estimator>],
    features: &FeatureSet,
    config: &BenchmarkConfig,
) -> Result<BenchmarkRun> {
    let (train, test) = features.split_chronological(config.train_fraction)?;
    let scores = run_benchmark(models, &train, &test)?;
    let test_start = test.dates()?.first().copied();

    info!(
        mineral = %features.mineral(),
        horizon = features.horizon(),
        train_rows = train.len(),
        test_rows = test.len(),
        "Benchmark complete"
    );

    Ok(BenchmarkRun {
        mineral: features.mineral(),
        horizon: features.horizon(),
        train_rows: train.len(),
        test_rows: test.len(),
        test_start,
        scores,
    })
}
