//! Export of benchmark scores to CSV and JSON.
//!
//! CSV output is flat: one record per (mineral, horizon, model). JSON output
//! keeps the nested run structure.

use chrono::NaiveDate;
use lode_data::Mineral;
use lode_models::BenchmarkRun;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::string::FromUtf8Error;
use thiserror::Error;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialized output was not valid UTF-8.
    #[error("Invalid UTF-8 in output: {0}")]
    Utf8(#[from] FromUtf8Error),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values format.
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }
}

/// One model's held-out score, flattened with its run context.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoreRecord {
    /// Mineral forecast.
    pub mineral: Mineral,

    /// Forecast horizon in months.
    pub horizon: usize,

    /// Model name.
    pub model: String,

    /// Root mean squared error.
    pub rmse: f64,

    /// Mean absolute error.
    pub mae: f64,

    /// Mean signed error.
    pub bias: f64,

    /// Number of test points.
    pub n: usize,

    /// Training rows.
    pub train_rows: usize,

    /// First test month.
    pub test_start: Option<NaiveDate>,
}

impl ScoreRecord {
    /// Flatten every score of a run.
    pub fn from_run(run: &BenchmarkRun) -> Vec<Self> {
        run.scores
            .iter()
            .map(|score| Self {
                mineral: run.mineral,
                horizon: run.horizon,
                model: score.model.clone(),
                rmse: score.metrics.rmse,
                mae: score.metrics.mae,
                bias: score.metrics.bias,
                n: score.metrics.n,
                train_rows: run.train_rows,
                test_start: run.test_start,
            })
            .collect()
    }
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

/// Serialize records as CSV with a header row.
pub(crate) fn records_to_csv<'a, I>(records: I) -> Result<String, ExportError>
where
    I: IntoIterator<Item = &'a ScoreRecord>,
{
    let mut wtr = csv::Writer::from_writer(vec![]);
    for record in records {
        wtr.serialize(record)?;
    }
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

impl Exporter for Vec<ScoreRecord> {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => records_to_csv(self),
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

impl Exporter for BenchmarkRun {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => records_to_csv(&ScoreRecord::from_run(self)),
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}
