//! Panel assembly.
//!
//! A [`Panel`] is the date-aligned table every downstream stage reads: a
//! `date` column holding the first day of each month, contiguous from the
//! earliest to the latest observed month, plus one nullable `Float64` column
//! per series. Months that no source covers are kept as all-null rows.

use crate::error::{DataError, Result};
use crate::month_code::YearMonth;
use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::HashSet;
use std::io::Write;

/// Name of the date key column shared by every fragment and the panel.
pub const DATE_COLUMN: &str = "date";

/// Build a polars `Date` column keyed on the first day of each month.
pub(crate) fn date_column(months: &[YearMonth]) -> PolarsResult<Column> {
    let days: Vec<i32> = months.iter().map(|m| m.epoch_days()).collect();
    Ok(Series::new(DATE_COLUMN.into(), days)
        .cast(&DataType::Date)?
        .into())
}

/// Read the `date` column of a frame as month periods.
///
/// Accepts any dtype polars can cast to `Date` (dates, datetimes); each value
/// is floored to its month.
pub fn frame_months(frame: &DataFrame) -> Result<Vec<YearMonth>> {
    if frame.get_column_index(DATE_COLUMN).is_none() {
        return Err(DataError::MissingColumn {
            column: DATE_COLUMN.to_string(),
            source_name: "panel fragment".to_string(),
        });
    }
    let days = frame
        .column(DATE_COLUMN)?
        .cast(&DataType::Date)?
        .cast(&DataType::Int32)?;
    let months = days
        .as_materialized_series()
        .i32()?
        .into_iter()
        .flatten()
        .map(YearMonth::from_epoch_days)
        .collect();
    Ok(months)
}

/// Names of all non-date columns of a frame, in order.
pub(crate) fn value_columns(frame: &DataFrame) -> Vec<String> {
    frame
        .get_columns()
        .iter()
        .map(|c| c.name().to_string())
        .filter(|name| name != DATE_COLUMN)
        .collect()
}

/// Date-aligned table of all loaded series.
#[derive(Debug, Clone)]
pub struct Panel {
    frame: DataFrame,
}

impl Panel {
    /// Merge fragments onto one contiguous monthly index.
    ///
    /// Every fragment's dates are normalized to the first day of their month
    /// before joining, so month-code keys and generically parsed calendar
    /// dates line up.
    ///
    /// # Errors
    ///
    /// Fails when a fragment lacks a `date` column, repeats a month, or shares
    /// a column name with another fragment.
    pub fn assemble(fragments: Vec<DataFrame>) -> Result<Self> {
        let mut seen_columns = HashSet::new();
        let mut normalized = Vec::with_capacity(fragments.len());
        let mut bounds: Option<(YearMonth, YearMonth)> = None;

        for fragment in fragments {
            if fragment.get_column_index(DATE_COLUMN).is_none() {
                return Err(DataError::MissingColumn {
                    column: DATE_COLUMN.to_string(),
                    source_name: "panel fragment".to_string(),
                });
            }
            let mut fragment = fragment
                .lazy()
                .filter(col(DATE_COLUMN).is_not_null())
                .collect()?;

            let months = frame_months(&fragment)?;
            let mut seen_months = HashSet::with_capacity(months.len());
            for month in &months {
                if !seen_months.insert(*month) {
                    return Err(DataError::DuplicateDates {
                        month: month.to_string(),
                    });
                }
            }

            for name in value_columns(&fragment) {
                if !seen_columns.insert(name.clone()) {
                    return Err(DataError::DuplicateColumn(name));
                }
            }

            if let (Some(lo), Some(hi)) = (months.iter().min(), months.iter().max()) {
                bounds = Some(match bounds {
                    Some((first, last)) => (first.min(*lo), last.max(*hi)),
                    None => (*lo, *hi),
                });
            }

            fragment.with_column(date_column(&months)?)?;
            normalized.push(fragment);
        }

        let spine: Vec<YearMonth> = match bounds {
            Some((first, last)) => (0..=first.months_until(last))
                .map(|offset| first.add_months(offset))
                .collect(),
            None => Vec::new(),
        };

        let mut panel = DataFrame::new(vec![date_column(&spine)?])?.lazy();
        let mut columns = Vec::new();
        for fragment in normalized {
            columns.extend(value_columns(&fragment));
            panel = panel.join(
                fragment.lazy(),
                [col(DATE_COLUMN)],
                [col(DATE_COLUMN)],
                JoinArgs::new(JoinType::Left),
            );
        }
        if !columns.is_empty() {
            panel = panel.with_columns(
                columns
                    .iter()
                    .map(|name| col(name.as_str()).cast(DataType::Float64))
                    .collect::<Vec<_>>(),
            );
        }

        let frame = panel
            .sort([DATE_COLUMN], SortMultipleOptions::default())
            .collect()?;

        tracing::info!(
            months = frame.height(),
            series = columns.len(),
            "assembled panel"
        );

        Ok(Self { frame })
    }

    /// Underlying data frame.
    pub const fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// Number of months in the panel.
    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// Whether the panel holds no months.
    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    /// Month keys, ascending.
    pub fn months(&self) -> Result<Vec<YearMonth>> {
        frame_months(&self.frame)
    }

    /// Date keys (first day of each month), ascending.
    pub fn dates(&self) -> Result<Vec<NaiveDate>> {
        Ok(self.months()?.into_iter().map(YearMonth::first_day).collect())
    }

    /// Series column names, excluding `date`.
    pub fn column_names(&self) -> Vec<String> {
        value_columns(&self.frame)
    }

    /// Whether a series column exists.
    pub fn has_column(&self, name: &str) -> bool {
        name != DATE_COLUMN && self.frame.get_column_index(name).is_some()
    }

    /// Values of one series, aligned with [`Panel::dates`].
    pub fn series(&self, name: &str) -> Result<Vec<Option<f64>>> {
        if !self.has_column(name) {
            return Err(DataError::MissingColumn {
                column: name.to_string(),
                source_name: "panel".to_string(),
            });
        }
        let values = self.frame.column(name)?.cast(&DataType::Float64)?;
        Ok(values.as_materialized_series().f64()?.into_iter().collect())
    }

    /// Write the panel as CSV; missing values are empty fields.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let names = self.column_names();
        let dates = self.dates()?;
        let columns = names
            .iter()
            .map(|name| self.series(name))
            .collect::<Result<Vec<_>>>()?;

        let mut wtr = csv::Writer::from_writer(writer);
        let mut header = vec![DATE_COLUMN.to_string()];
        header.extend(names.iter().cloned());
        wtr.write_record(&header)?;

        for (row, date) in dates.iter().enumerate() {
            let mut record = vec![date.to_string()];
            record.extend(
                columns
                    .iter()
                    .map(|values| values[row].map(|v| v.to_string()).unwrap_or_default()),
            );
            wtr.write_record(&record)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ym(year: i32, month: u32) -> YearMonth {
        YearMonth::new(year, month).unwrap()
    }

    fn fragment(months: &[YearMonth], name: &str, values: Vec<Option<f64>>) -> DataFrame {
        DataFrame::new(vec![
            date_column(months).unwrap(),
            Series::new(name.into(), values).into(),
        ])
        .unwrap()
    }

    #[test]
    fn test_assemble_fills_gaps_with_null_rows() {
        let prod = fragment(
            &[ym(2020, 1), ym(2020, 4)],
            "prod_gold",
            vec![Some(1.0), Some(4.0)],
        );
        let price = fragment(&[ym(2020, 2)], "price_gold", vec![Some(20.0)]);

        let panel = Panel::assemble(vec![prod, price]).unwrap();

        assert_eq!(
            panel.months().unwrap(),
            vec![ym(2020, 1), ym(2020, 2), ym(2020, 3), ym(2020, 4)]
        );
        assert_eq!(
            panel.series("prod_gold").unwrap(),
            vec![Some(1.0), None, None, Some(4.0)]
        );
        assert_eq!(
            panel.series("price_gold").unwrap(),
            vec![None, Some(20.0), None, None]
        );
        assert_eq!(panel.column_names(), vec!["prod_gold", "price_gold"]);
    }

    #[test]
    fn test_assemble_normalizes_mid_month_dates() {
        let prod = fragment(&[ym(2021, 5), ym(2021, 6)], "prod_coal", vec![Some(1.0), Some(2.0)]);

        // Macro series keyed on end-of-month calendar dates
        let days: Vec<i32> = [
            NaiveDate::from_ymd_opt(2021, 5, 31).unwrap(),
            NaiveDate::from_ymd_opt(2021, 6, 30).unwrap(),
        ]
        .iter()
        .map(|d| (*d - NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()).num_days() as i32)
        .collect();
        let macro_frame = DataFrame::new(vec![
            Series::new(DATE_COLUMN.into(), days)
                .cast(&DataType::Date)
                .unwrap()
                .into(),
            Series::new("cpi".into(), vec![Some(101.0), Some(102.0)]).into(),
        ])
        .unwrap();

        let panel = Panel::assemble(vec![prod, macro_frame]).unwrap();

        assert_eq!(panel.height(), 2);
        assert_eq!(panel.series("cpi").unwrap(), vec![Some(101.0), Some(102.0)]);
        assert_eq!(
            panel.dates().unwrap(),
            vec![
                NaiveDate::from_ymd_opt(2021, 5, 1).unwrap(),
                NaiveDate::from_ymd_opt(2021, 6, 1).unwrap()
            ]
        );
    }

    #[test]
    fn test_assemble_rejects_duplicate_months() {
        let dup = fragment(&[ym(2020, 1), ym(2020, 1)], "prod_gold", vec![Some(1.0), Some(2.0)]);
        let result = Panel::assemble(vec![dup]);
        assert!(matches!(result, Err(DataError::DuplicateDates { .. })));
    }

    #[test]
    fn test_assemble_rejects_duplicate_columns() {
        let a = fragment(&[ym(2020, 1)], "cpi", vec![Some(1.0)]);
        let b = fragment(&[ym(2020, 2)], "cpi", vec![Some(2.0)]);
        let result = Panel::assemble(vec![a, b]);
        assert!(matches!(result, Err(DataError::DuplicateColumn(name)) if name == "cpi"));
    }

    #[test]
    fn test_assemble_requires_date_column() {
        let frame = DataFrame::new(vec![Series::new("x".into(), vec![1.0]).into()]).unwrap();
        let result = Panel::assemble(vec![frame]);
        assert!(matches!(result, Err(DataError::MissingColumn { .. })));
    }

    #[test]
    fn test_empty_assembly() {
        let panel = Panel::assemble(Vec::new()).unwrap();
        assert!(panel.is_empty());
        assert!(panel.column_names().is_empty());
    }

    #[test]
    fn test_write_csv() {
        let prod = fragment(&[ym(2020, 1), ym(2020, 3)], "prod_gold", vec![Some(1.5), Some(3.0)]);
        let panel = Panel::assemble(vec![prod]).unwrap();

        let mut buffer = Vec::new();
        panel.write_csv(&mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert_eq!(
            text,
            "date,prod_gold\n2020-01-01,1.5\n2020-02-01,\n2020-03-01,3\n"
        );
    }
}
