//! Production-volume loading.
//!
//! Production releases are wide tables: a handful of identifier columns
//! (publication, category, commodity, ...) followed by one column per month,
//! each headed by a month code. This loader reshapes the table to long form,
//! keeps the physical-volume rows for known minerals, and pivots back to one
//! `prod_<mineral>` column per mineral.

use crate::error::{DataError, Result};
use crate::minerals::Mineral;
use crate::month_code::{YearMonth, find_month_code};
use crate::panel::{DATE_COLUMN, date_column};
use crate::sheet::{Cell, Sheet};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Category label of the rows holding physical production volumes.
pub const PHYSICAL_VOLUME_LABEL: &str = "Physical volume of mining production";

/// Where the identifier fields live in a production sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionLayout {
    /// Header of the measurement-category column (default: `H04`)
    pub category_column: String,
    /// Header of the commodity-name column (default: `H05`)
    pub entity_column: String,
    /// Category value to keep (default: physical volume of mining production)
    pub category_label: String,
}

impl Default for ProductionLayout {
    fn default() -> Self {
        Self {
            category_column: "H04".to_string(),
            entity_column: "H05".to_string(),
            category_label: PHYSICAL_VOLUME_LABEL.to_string(),
        }
    }
}

/// Load production volumes into a panel fragment.
///
/// Rows colliding on (month, mineral) are averaged. Minerals that never appear
/// in the sheet get no column at all.
///
/// # Errors
///
/// Returns [`DataError::NoMonthColumns`] when no header carries a month code,
/// and [`DataError::MissingColumn`] when a layout identifier column is absent.
pub fn load_production(sheet: &Sheet, layout: &ProductionLayout) -> Result<DataFrame> {
    let month_columns: Vec<(usize, YearMonth)> = sheet
        .header()
        .iter()
        .enumerate()
        .filter_map(|(idx, header)| find_month_code(header).map(|month| (idx, month)))
        .collect();
    if month_columns.is_empty() {
        return Err(DataError::NoMonthColumns {
            source_name: sheet.name().to_string(),
        });
    }

    let locate = |column: &str| {
        sheet
            .column_index(column)
            .ok_or_else(|| DataError::MissingColumn {
                column: column.to_string(),
                source_name: sheet.name().to_string(),
            })
    };
    let category_idx = locate(&layout.category_column)?;
    let entity_idx = locate(&layout.entity_column)?;
    let wanted_category = layout.category_label.trim();

    // Long form: one entry per (month, mineral, value)
    let mut days = Vec::new();
    let mut minerals = Vec::new();
    let mut values = Vec::new();
    let mut seen = HashSet::new();
    let mut collisions = 0usize;

    for (row, cells) in sheet.rows().iter().enumerate() {
        let cell = |idx: usize| cells.get(idx).unwrap_or(&Cell::Empty);
        if cell(category_idx).to_text() != wanted_category {
            continue;
        }
        let Some(mineral) = Mineral::from_label(&cell(entity_idx).to_text()) else {
            tracing::trace!(row, "skipping row for unknown entity");
            continue;
        };

        for &(column, month) in &month_columns {
            let Some(value) = cell(column).as_f64() else {
                continue;
            };
            if !seen.insert((month, mineral)) {
                collisions += 1;
            }
            days.push(month.epoch_days());
            minerals.push(mineral.label());
            values.push(value);
        }
    }

    if collisions > 0 {
        tracing::debug!(
            source = sheet.name(),
            collisions,
            "averaging duplicate production rows"
        );
    }

    let found: BTreeSet<Mineral> = minerals
        .iter()
        .filter_map(|label| Mineral::from_label(label))
        .collect();
    let months: Vec<YearMonth> = days
        .iter()
        .copied()
        .collect::<BTreeSet<i32>>()
        .into_iter()
        .map(YearMonth::from_epoch_days)
        .collect();

    let long = DataFrame::new(vec![
        Series::new(DATE_COLUMN.into(), days)
            .cast(&DataType::Date)?
            .into(),
        Series::new("mineral".into(), minerals).into(),
        Series::new("value".into(), values).into(),
    ])?;

    let averaged = long
        .lazy()
        .group_by([col(DATE_COLUMN), col("mineral")])
        .agg([col("value").mean()])
        .collect()?;

    let mut wide = DataFrame::new(vec![date_column(&months)?])?.lazy();
    for mineral in &found {
        let series = averaged
            .clone()
            .lazy()
            .filter(col("mineral").eq(lit(mineral.label())))
            .select([
                col(DATE_COLUMN),
                col("value").alias(mineral.production_column()),
            ]);
        wide = wide.join(
            series,
            [col(DATE_COLUMN)],
            [col(DATE_COLUMN)],
            JoinArgs::new(JoinType::Left),
        );
    }
    let frame = wide
        .sort([DATE_COLUMN], SortMultipleOptions::default())
        .collect()?;

    tracing::info!(
        source = sheet.name(),
        minerals = found.len(),
        months = frame.height(),
        "loaded production volumes"
    );

    Ok(frame)
}
