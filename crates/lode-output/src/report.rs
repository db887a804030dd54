//! Benchmark report rendering.

use crate::export::{ExportError, ExportFormat, Exporter, ScoreRecord, records_to_csv};
use chrono::{DateTime, Utc};
use lode_models::BenchmarkRun;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Results of a benchmark session over several (mineral, horizon) pairs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkReport {
    /// Report generation timestamp.
    pub timestamp: DateTime<Utc>,

    /// Share of rows used for training.
    pub train_fraction: f64,

    /// One entry per (mineral, horizon).
    pub runs: Vec<BenchmarkRun>,
}

impl BenchmarkReport {
    /// Create a new report.
    pub fn new(train_fraction: f64, runs: Vec<BenchmarkRun>) -> Self {
        Self {
            timestamp: Utc::now(),
            train_fraction,
            runs,
        }
    }

    /// Flat score records across all runs.
    pub fn records(&self) -> Vec<ScoreRecord> {
        self.runs.iter().flat_map(ScoreRecord::from_run).collect()
    }

    /// Convert report to JSON string.
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Format as ASCII table for terminal display.
    pub fn to_ascii_table(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "\nForecast Benchmark ({:.0}% train / {:.0}% test)\n",
            self.train_fraction * 100.0,
            (1.0 - self.train_fraction) * 100.0
        ));
        output.push_str(&"=".repeat(72));
        output.push('\n');

        for run in &self.runs {
            let start = run
                .test_start
                .map_or_else(|| "n/a".to_string(), |d| d.format("%Y-%m").to_string());
            output.push_str(&format!(
                "\n{} | horizon {} | train {} | test {} from {}\n",
                run.mineral, run.horizon, run.train_rows, run.test_rows, start
            ));
            output.push_str(&"-".repeat(72));
            output.push('\n');
            output.push_str(&format!(
                "{:<20} {:>12} {:>12} {:>12} {:>8}\n",
                "Model", "RMSE", "MAE", "Bias", "N"
            ));
            output.push_str(&"-".repeat(72));
            output.push('\n');

            let best = run.best().map(|s| s.model.as_str());
            for score in &run.scores {
                let marker = if Some(score.model.as_str()) == best {
                    " *"
                } else {
                    ""
                };
                output.push_str(&format!(
                    "{:<20} {:>12.4} {:>12.4} {:>12.4} {:>8}{}\n",
                    score.model,
                    score.metrics.rmse,
                    score.metrics.mae,
                    score.metrics.bias,
                    score.metrics.n,
                    marker
                ));
            }
        }

        output.push_str(&"=".repeat(72));
        output.push('\n');
        output.push_str("* lowest RMSE\n");

        output
    }

    /// Format as Markdown for documentation.
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str("# Forecast Benchmark\n\n");
        output.push_str(&format!(
            "**Generated:** {}  \n**Train fraction:** {:.2}\n\n",
            self.timestamp.format("%Y-%m-%d %H:%M UTC"),
            self.train_fraction
        ));

        for run in &self.runs {
            output.push_str(&format!(
                "## {} (horizon {})\n\n",
                run.mineral, run.horizon
            ));
            output.push_str(&format!(
                "Train rows: {}, test rows: {}\n\n",
                run.train_rows, run.test_rows
            ));
            output.push_str("| Model | RMSE | MAE | Bias | N |\n");
            output.push_str("|-------|------|-----|------|---|\n");
            for score in &run.scores {
                output.push_str(&format!(
                    "| {} | {:.4} | {:.4} | {:.4} | {} |\n",
                    score.model,
                    score.metrics.rmse,
                    score.metrics.mae,
                    score.metrics.bias,
                    score.metrics.n
                ));
            }
            output.push('\n');
        }

        output
    }
}

impl fmt::Display for BenchmarkReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Forecast Benchmark: {} runs", self.runs.len())?;
        for run in &self.runs {
            if let Some(best) = run.best() {
                writeln!(
                    f,
                    "  {} h={}: best {} (RMSE {:.4})",
                    run.mineral, run.horizon, best.model, best.metrics.rmse
                )?;
            }
        }
        Ok(())
    }
}

impl Exporter for BenchmarkReport {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => records_to_csv(&self.records()),
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use lode_data::Mineral;
    use lode_models::{Metrics, ModelScore};

    fn score(model: &str, rmse: f64) -> ModelScore {
        ModelScore {
            model: model.to_string(),
            metrics: Metrics {
                rmse,
                mae: rmse / 2.0,
                bias: 0.0,
                n: 6,
            },
        }
    }

    fn report() -> BenchmarkReport {
        let run = |mineral, horizon| BenchmarkRun {
            mineral,
            horizon,
            train_rows: 24,
            test_rows: 6,
            test_start: NaiveDate::from_ymd_opt(2021, 1, 1),
            scores: vec![score("naive", 3.0), score("gradient_boosting", 1.5)],
        };
        BenchmarkReport::new(0.8, vec![run(Mineral::Gold, 1), run(Mineral::Copper, 6)])
    }

    #[test]
    fn test_records_span_runs() {
        let records = report().records();
        assert_eq!(records.len(), 4);
        assert_eq!(records[2].mineral, Mineral::Copper);
        assert_eq!(records[2].horizon, 6);
    }

    #[test]
    fn test_ascii_table_marks_best() {
        let table = report().to_ascii_table();
        assert!(table.contains("Gold | horizon 1 | train 24 | test 6"));
        assert!(table.contains("80% train / 20% test"));
        assert!(table.contains("from 2021-01"));

        let best_line = table
            .lines()
            .find(|l| l.starts_with("gradient_boosting"))
            .unwrap();
        assert!(best_line.ends_with(" *"));
        let naive_line = table.lines().find(|l| l.starts_with("naive")).unwrap();
        assert!(!naive_line.ends_with(" *"));
    }

    #[test]
    fn test_markdown_sections() {
        let md = report().to_markdown();
        assert!(md.contains("## Gold (horizon 1)"));
        assert!(md.contains("## Copper (horizon 6)"));
        assert!(md.contains("| naive | 3.0000 | 1.5000 | 0.0000 | 6 |"));
    }

    #[test]
    fn test_display_summary() {
        let text = report().to_string();
        assert!(text.contains("2 runs"));
        assert!(text.contains("Gold h=1: best gradient_boosting (RMSE 1.5000)"));
    }

    #[test]
    fn test_export_csv_has_one_row_per_score() {
        let csv = report().export_to_string(ExportFormat::Csv).unwrap();
        assert_eq!(csv.lines().count(), 5);
        assert!(csv.contains("copper,6,gradient_boosting"));
    }

    #[test]
    fn test_json_round_trip_fields() {
        let json = report().to_json().unwrap();
        assert!(json.contains("\"train_fraction\": 0.8"));
        assert!(json.contains("\"runs\""));
    }
}
