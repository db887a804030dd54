//! Error types for lode-models

use lode_features::FeatureError;
use thiserror::Error;

/// Errors that can occur while fitting, predicting or scoring models
#[derive(Debug, Error)]
pub enum ModelError {
    /// `predict` was called before `fit`
    #[error("Model '{0}' has not been fitted")]
    NotFitted(String),

    /// No rows to train on
    #[error("Empty training set")]
    EmptyTrainingSet,

    /// Feature matrix has no columns
    #[error("Feature matrix has no columns")]
    NoFeatures,

    /// Row or column counts disagree
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected size
        expected: usize,
        /// Actual size
        actual: usize,
    },

    /// A feature the model relies on is absent
    #[error("Missing feature: {0}")]
    MissingFeature(String),

    /// Unknown model name
    #[error("Unknown model: {0}")]
    UnknownModel(String),

    /// Invalid configuration value
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Too few rows for a train/test split
    #[error("Insufficient data: {train} training rows, {test} test rows")]
    InsufficientData {
        /// Rows in the training split
        train: usize,
        /// Rows in the test split
        test: usize,
    },

    /// Metric reduction failed
    #[error("Evaluation error: {0}")]
    Evaluation(#[from] EvaluationError),

    /// Feature set could not be materialized
    #[error("Feature error: {0}")]
    Feature(#[from] FeatureError),
}

/// Errors from metric reductions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluationError {
    /// Truth and prediction lengths differ
    #[error("Length mismatch: {truth} true values, {predicted} predictions")]
    LengthMismatch {
        /// Number of true values
        truth: usize,
        /// Number of predictions
        predicted: usize,
    },

    /// Nothing to score
    #[error("Cannot evaluate an empty sample")]
    Empty,
}

/// Result type alias for model operations
pub type Result<T> = std::result::Result<T, ModelError>;
