#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/lode/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod benchmark;
pub mod error;
pub mod estimator;
pub mod evaluation;
pub mod registry;

pub use benchmark::{
    BenchmarkConfig, BenchmarkRun, ModelScore, benchmark_feature_set, run_benchmark,
};
pub use error::{EvaluationError, ModelError, Result};
pub use estimator::{
    BoostingConfig, Estimator, ForestConfig, GradientBoostingRegressor, HistoricalMean,
    NaiveBaseline, RandomForestRegressor, RegressionTree, TreeConfig,
};
pub use evaluation::{Metrics, evaluate, mae, rmse};
pub use registry::{ModelInfo, ModelKind, available_models, build_model, default_models};
