//! Macro-indicator loading.
//!
//! Macro downloads (CPI, exchange rates, policy rates) come in whatever layout
//! the publisher chose. The loader uses a best-effort heuristic: the date
//! column is the first header mentioning "date" or "observation" (falling
//! back to the first column), and the series is the first other column that
//! holds at least one number. Nothing stronger is guaranteed.

use crate::error::{DataError, Result};
use crate::month_code::YearMonth;
use crate::panel::date_column;
use crate::sheet::Sheet;
use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Workbook tab conventionally holding monthly data.
pub const MONTHLY_TAB: &str = "Monthly";

const DATE_HINTS: &[&str] = &["date", "observation"];

/// One macro input: a logical series name and the file it comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroSource {
    /// Column name the series gets in the panel
    pub name: String,
    /// Spreadsheet path
    pub path: PathBuf,
}

impl MacroSource {
    /// Create a macro source.
    pub fn new(name: impl Into<String>, path: impl AsRef<Path>) -> Self {
        Self {
            name: name.into(),
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Read the file (preferring the `Monthly` tab) and load the series.
    pub fn load(&self) -> Result<DataFrame> {
        let sheet = Sheet::open(&self.path, Some(MONTHLY_TAB))?;
        load_macro_series(&sheet, &self.name)
    }
}

impl FromStr for MacroSource {
    type Err = String;

    /// Parse `NAME=PATH`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (name, path) = s
            .split_once('=')
            .ok_or_else(|| format!("expected NAME=PATH, got '{s}'"))?;
        let name = name.trim();
        let path = path.trim();
        if name.is_empty() || path.is_empty() {
            return Err(format!("expected NAME=PATH, got '{s}'"));
        }
        Ok(Self::new(name, path))
    }
}

/// Index of the column most likely to hold dates.
fn date_column_index(sheet: &Sheet) -> usize {
    sheet
        .header()
        .iter()
        .position(|h| {
            let h = h.to_lowercase();
            DATE_HINTS.iter().any(|hint| h.contains(hint))
        })
        .unwrap_or(0)
}

/// Load a single macro series into a panel fragment named `series_name`.
///
/// Dates are floored to their month. When several observations fall in the
/// same month, the latest-dated one holding a value is kept.
///
/// # Errors
///
/// Returns [`DataError::NoUsableSeries`] when no column other than the date
/// column has a numeric value on a dated row.
pub fn load_macro_series(sheet: &Sheet, series_name: &str) -> Result<DataFrame> {
    let no_series = || DataError::NoUsableSeries {
        series: series_name.to_string(),
    };
    if sheet.header().is_empty() {
        return Err(no_series());
    }

    let date_idx = date_column_index(sheet);
    let mut dated: Vec<(NaiveDate, usize)> = (0..sheet.rows().len())
        .filter_map(|row| sheet.cell(row, date_idx).as_date().map(|d| (d, row)))
        .collect();

    let value_idx = (0..sheet.header().len())
        .filter(|&idx| idx != date_idx)
        .find(|&idx| {
            dated
                .iter()
                .any(|&(_, row)| sheet.cell(row, idx).as_f64().is_some())
        })
        .ok_or_else(no_series)?;

    tracing::debug!(
        source = sheet.name(),
        date_column = %sheet.header()[date_idx],
        value_column = %sheet.header()[value_idx],
        series = series_name,
        "selected macro columns"
    );

    dated.sort_by_key(|&(date, _)| date);
    let mut by_month: BTreeMap<YearMonth, Option<f64>> = BTreeMap::new();
    for (date, row) in dated {
        let month = YearMonth::from_date(date);
        match sheet.cell(row, value_idx).as_f64() {
            Some(value) => {
                by_month.insert(month, Some(value));
            }
            None => {
                by_month.entry(month).or_insert(None);
            }
        }
    }

    let months: Vec<YearMonth> = by_month.keys().copied().collect();
    let values: Vec<Option<f64>> = by_month.into_values().collect();
    let frame = DataFrame::new(vec![
        date_column(&months)?,
        Series::new(series_name.into(), values).into(),
    ])?;

    tracing::info!(
        source = sheet.name(),
        series = series_name,
        months = frame.height(),
        "loaded macro series"
    );

    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::frame_months;
    use crate::sheet::Cell;

    fn sheet(text: &str) -> Sheet {
        Sheet::from_csv_reader("macro", text.as_bytes()).unwrap()
    }

    fn values(frame: &DataFrame, name: &str) -> Vec<Option<f64>> {
        frame
            .column(name)
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_iter()
            .collect()
    }

    #[test]
    fn test_skips_non_numeric_first_column() {
        let text = "\
observation_date,notes,CPI
2020-01-31,prelim,
2020-02-29,final,101.5
";
        let frame = load_macro_series(&sheet(text), "cpi").unwrap();

        assert_eq!(frame.get_columns()[1].name().as_str(), "cpi");
        assert_eq!(values(&frame, "cpi"), vec![None, Some(101.5)]);
        assert_eq!(
            frame_months(&frame).unwrap(),
            vec![
                YearMonth::new(2020, 1).unwrap(),
                YearMonth::new(2020, 2).unwrap()
            ]
        );
    }

    #[test]
    fn test_falls_back_to_first_column_for_dates() {
        let text = "\
Period,Rate
2019-12,6.5
2020M01,6.25
Source: Reserve Bank,
";
        let frame = load_macro_series(&sheet(text), "repo_rate").unwrap();
        assert_eq!(values(&frame, "repo_rate"), vec![Some(6.5), Some(6.25)]);
    }

    #[test]
    fn test_date_column_found_anywhere() {
        let text = "\
Value,Date
1.25,2021-03-15
1.5,2021-04-15
";
        let frame = load_macro_series(&sheet(text), "fx").unwrap();
        assert_eq!(values(&frame, "fx"), vec![Some(1.25), Some(1.5)]);
    }

    #[test]
    fn test_no_numeric_column_is_fatal() {
        let text = "DATE,Comment\n2020-01-01,n/a\n2020-02-01,revised\n";
        let result = load_macro_series(&sheet(text), "cpi");
        assert!(matches!(result, Err(DataError::NoUsableSeries { series }) if series == "cpi"));
    }

    #[test]
    fn test_compact_numeric_dates() {
        let text = "date,cpi\n20200131,1.0\n20200229,2.0\n";
        let frame = load_macro_series(&sheet(text), "cpi").unwrap();

        assert_eq!(values(&frame, "cpi"), vec![Some(1.0), Some(2.0)]);
        assert_eq!(
            frame_months(&frame).unwrap(),
            vec![
                YearMonth::new(2020, 1).unwrap(),
                YearMonth::new(2020, 2).unwrap()
            ]
        );
    }

    #[test]
    fn test_same_month_keeps_latest_observation() {
        let text = "\
date,rate
2020-01-31,3.0
2020-01-02,1.0
2020-01-15,2.0
";
        let frame = load_macro_series(&sheet(text), "rate").unwrap();
        assert_eq!(values(&frame, "rate"), vec![Some(3.0)]);
    }

    #[test]
    fn test_native_date_cells() {
        let rows = vec![
            vec![Cell::Text("DATE".into()), Cell::Text("X".into())],
            vec![
                Cell::Date(NaiveDate::from_ymd_opt(2022, 8, 31).unwrap()),
                Cell::Number(4.0),
            ],
        ];
        let sheet = Sheet::from_rows("native", rows).unwrap();
        let frame = load_macro_series(&sheet, "x").unwrap();
        assert_eq!(
            frame_months(&frame).unwrap(),
            vec![YearMonth::new(2022, 8).unwrap()]
        );
    }

    #[test]
    fn test_macro_source_from_str() {
        let source: MacroSource = "cpi=data/raw/cpi.xlsx".parse().unwrap();
        assert_eq!(source, MacroSource::new("cpi", "data/raw/cpi.xlsx"));
        assert!("cpi".parse::<MacroSource>().is_err());
        assert!("=x.csv".parse::<MacroSource>().is_err());
    }
}
