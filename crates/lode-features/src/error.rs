//! Error types for feature construction.

use thiserror::Error;

/// Result type for feature operations.
pub type Result<T> = std::result::Result<T, FeatureError>;

/// Errors that can occur while building features.
#[derive(Debug, Error)]
pub enum FeatureError {
    /// A series the feature set depends on is not in the panel
    #[error("Missing series '{column}' in panel")]
    MissingSeries {
        /// Panel column that was expected
        column: String,
    },

    /// Forecast horizon outside `1..=i64::MAX` months
    #[error("Invalid forecast horizon {0}: must be at least 1 month and fit in i64")]
    InvalidHorizon(usize),

    /// Lag too large to express as a row shift
    #[error("Invalid lag {0}: must fit in i64")]
    InvalidLag(usize),

    /// Two generated features share a name
    #[error("Duplicate feature '{0}'; rename the exogenous series")]
    DuplicateFeature(String),

    /// Train fraction outside (0, 1)
    #[error("Invalid train fraction {0}: must be strictly between 0 and 1")]
    InvalidSplit(f64),

    /// Feature names and matrix columns disagree
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Panel access error
    #[error("Data error: {0}")]
    Data(#[from] lode_data::DataError),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}
