//! Commodity price loading.
//!
//! Price workbooks carry ticker codes in the header row, then a fixed block of
//! descriptive rows (names, units, sources) before the monthly data. The first
//! column holds month codes.

use crate::error::Result;
use crate::minerals::Mineral;
use crate::month_code::{YearMonth, parse_month_code};
use crate::panel::date_column;
use crate::sheet::Sheet;
use polars::prelude::*;
use std::collections::BTreeMap;

/// Descriptive rows between the ticker header and the first data row.
pub const PRICE_PREAMBLE_ROWS: usize = 3;

/// Load mineral prices into a panel fragment.
///
/// Tickers outside the static ticker table are ignored, as are rows whose
/// date token does not parse. Non-numeric cells become nulls. When a month
/// appears more than once, the row that comes last in the sheet wins.
pub fn load_prices(sheet: &Sheet) -> Result<DataFrame> {
    let mut tickers: Vec<(usize, Mineral)> = Vec::new();
    for (idx, header) in sheet.header().iter().enumerate().skip(1) {
        match Mineral::from_ticker(header) {
            Some(mineral) if !tickers.iter().any(|(_, m)| *m == mineral) => {
                tickers.push((idx, mineral));
            }
            Some(_) => tracing::debug!(ticker = %header, "ignoring repeated ticker column"),
            None => tracing::trace!(ticker = %header, "ignoring unmapped ticker"),
        }
    }

    // Sorted by month; later rows overwrite earlier ones
    let mut rows_by_month: BTreeMap<YearMonth, usize> = BTreeMap::new();
    for row in PRICE_PREAMBLE_ROWS..sheet.rows().len() {
        match parse_month_code(&sheet.cell(row, 0).to_text()) {
            Some(month) => {
                rows_by_month.insert(month, row);
            }
            None => tracing::trace!(row, "skipping price row without month code"),
        }
    }

    let months: Vec<YearMonth> = rows_by_month.keys().copied().collect();
    let mut columns = vec![date_column(&months)?];
    for &(idx, mineral) in &tickers {
        let values: Vec<Option<f64>> = rows_by_month
            .values()
            .map(|&row| sheet.cell(row, idx).as_f64())
            .collect();
        columns.push(Series::new(mineral.price_column().into(), values).into());
    }
    let frame = DataFrame::new(columns)?;

    tracing::info!(
        source = sheet.name(),
        minerals = tickers.len(),
        months = frame.height(),
        "loaded prices"
    );

    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::frame_months;

    fn sheet(text: &str) -> Sheet {
        Sheet::from_csv_reader("prices", text.as_bytes()).unwrap()
    }

    fn column(frame: &DataFrame, name: &str) -> Vec<Option<f64>> {
        frame
            .column(name)
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_iter()
            .collect()
    }

    fn names(frame: &DataFrame) -> Vec<String> {
        frame
            .get_columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect()
    }

    const SAMPLE: &str = "\
,GOLD,COAL_AUS,IRON_ORE
Description,Gold,Coal Australia,Iron ore
Unit,$/troy oz,$/mt,$/dmtu
Source,LBMA,GCNewc,Vale
MO022020,1597.1,67.6,87.0
MO012020,1560.7,71.4,n/a
Footnote,,,
MO032020,1591.9,66.3,88.9
";

    #[test]
    fn test_maps_tickers_and_sorts_months() {
        let frame = load_prices(&sheet(SAMPLE)).unwrap();

        assert_eq!(names(&frame), vec!["date", "price_gold", "price_iron_ore"]);
        assert_eq!(
            frame_months(&frame).unwrap(),
            vec![
                YearMonth::new(2020, 1).unwrap(),
                YearMonth::new(2020, 2).unwrap(),
                YearMonth::new(2020, 3).unwrap()
            ]
        );
        assert_eq!(
            column(&frame, "price_gold"),
            vec![Some(1560.7), Some(1597.1), Some(1591.9)]
        );
        assert_eq!(
            column(&frame, "price_iron_ore"),
            vec![None, Some(87.0), Some(88.9)]
        );
    }

    #[test]
    fn test_unknown_ticker_produces_no_column() {
        let text = "\
,PLATINUM
a
b
c
MO012020,900
";
        let frame = load_prices(&sheet(text)).unwrap();
        assert_eq!(names(&frame), vec!["date"]);
        assert_eq!(frame.height(), 1);
    }

    #[test]
    fn test_duplicate_month_last_row_wins() {
        let text = "\
,COPPER
a,
b,
c,
MO052021,100
MO052021,105
";
        let frame = load_prices(&sheet(text)).unwrap();
        assert_eq!(column(&frame, "price_copper"), vec![Some(105.0)]);
    }

    #[test]
    fn test_preamble_rows_are_never_data() {
        // A valid token inside the preamble is still skipped positionally
        let text = "\
,GOLD
MO011999,1
b,
c,
MO012020,2
";
        let frame = load_prices(&sheet(text)).unwrap();
        assert_eq!(column(&frame, "price_gold"), vec![Some(2.0)]);
    }
}
