//! Error types for data operations.

use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while loading sources and assembling the panel.
///
/// Row-level noise (unparseable month tokens, non-numeric cells, unknown
/// categories) never surfaces here; those rows are filtered by the loaders.
#[derive(Debug, Error)]
pub enum DataError {
    /// No month-coded columns were found in a production sheet
    #[error("No month-coded columns found in {source_name}; the sheet layout has changed")]
    NoMonthColumns {
        /// Source being loaded
        source_name: String,
    },

    /// An identifier column required by the layout is absent
    #[error("Column '{column}' not found in {source_name}")]
    MissingColumn {
        /// Column that was expected
        column: String,
        /// Source being loaded
        source_name: String,
    },

    /// No column of a macro sheet holds a single numeric value
    #[error("No usable numeric series in macro source '{series}'")]
    NoUsableSeries {
        /// Logical series name requested by the caller
        series: String,
    },

    /// A panel fragment repeats a month
    #[error("Fragment has duplicate dates for month {month}")]
    DuplicateDates {
        /// Offending month, formatted as YYYY-MM
        month: String,
    },

    /// Two panel fragments carry the same column
    #[error("Column '{0}' appears in more than one fragment")]
    DuplicateColumn(String),

    /// A sheet has no header row or no rows at all
    #[error("Empty sheet: {0}")]
    EmptySheet(String),

    /// Unsupported file extension
    #[error("Unsupported spreadsheet format: {0}")]
    UnsupportedFormat(String),

    /// Workbook reading error
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    /// CSV reading error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
