//! Feature construction.
//!
//! For a mineral and horizon `H`, each row at month `d` carries:
//! - `y_level`: production at `d`
//! - `y_lag_k`: production at `d - k` for each configured production lag
//! - `price_lag_k`: price at `d - k`, only when the panel has a price column
//!   for the mineral
//! - `<series>_lag_1`: each configured exogenous series at `d - 1`
//! - `target`: production at `d + H`
//!
//! Features only look backward; the target is the only forward-looking value.
//! The panel index is contiguous by month, so shifting by `k` rows is shifting
//! by `k` months.

use crate::error::{FeatureError, Result};
use crate::feature_set::{FeatureSet, TARGET_COLUMN};
use lode_data::{DATE_COLUMN, Mineral, Panel};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Name of the current-level feature.
pub const LEVEL_FEATURE: &str = "y_level";

/// Configuration for feature construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// Production lags in months (default: 1, 3, 6, 12)
    pub production_lags: Vec<usize>,
    /// Price lags in months, used when a price series exists (default: 1, 2, 3)
    pub price_lags: Vec<usize>,
    /// Extra panel series added with a one-month lag (default: none)
    pub exogenous: Vec<String>,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            production_lags: vec![1, 3, 6, 12],
            price_lags: vec![1, 2, 3],
            exogenous: Vec::new(),
        }
    }
}

impl FeatureConfig {
    /// Add exogenous series.
    pub fn with_exogenous(mut self, series: impl IntoIterator<Item = String>) -> Self {
        self.exogenous.extend(series);
        self
    }
}

fn shifted(expr: &Expr, months: i64) -> Expr {
    expr.clone().shift(lit(months))
}

fn lag_offset(lag: usize) -> Result<i64> {
    i64::try_from(lag).map_err(|_| FeatureError::InvalidLag(lag))
}

/// Build the feature set for `mineral` forecast `horizon` months ahead.
///
/// A row is kept only when every feature and the target are present.
///
/// # Errors
///
/// Returns [`FeatureError::InvalidHorizon`] for a zero horizon or one too
/// large to shift by, [`FeatureError::InvalidLag`] for an oversized lag,
/// [`FeatureError::DuplicateFeature`] when an exogenous series would reuse a
/// generated feature name, and [`FeatureError::MissingSeries`] when the
/// mineral's production column (or a configured exogenous series) is absent
/// from the panel.
pub fn build_features(
    panel: &Panel,
    mineral: Mineral,
    horizon: usize,
    config: &FeatureConfig,
) -> Result<FeatureSet> {
    let lead = i64::try_from(horizon)
        .ok()
        .filter(|h| *h > 0)
        .ok_or(FeatureError::InvalidHorizon(horizon))?;

    let production = mineral.production_column();
    let required = std::iter::once(&production).chain(config.exogenous.iter());
    for column in required {
        if !panel.has_column(column) {
            return Err(FeatureError::MissingSeries {
                column: column.clone(),
            });
        }
    }

    let level = col(production.as_str()).cast(DataType::Float64);
    let mut features: Vec<(String, Expr)> = vec![(LEVEL_FEATURE.to_string(), level.clone())];

    let production_lags: BTreeSet<usize> = config.production_lags.iter().copied().collect();
    for lag in production_lags {
        features.push((format!("y_lag_{lag}"), shifted(&level, lag_offset(lag)?)));
    }

    let price = mineral.price_column();
    if panel.has_column(&price) {
        let price_expr = col(price.as_str()).cast(DataType::Float64);
        let price_lags: BTreeSet<usize> = config.price_lags.iter().copied().collect();
        for lag in price_lags {
            features.push((
                format!("price_lag_{lag}"),
                shifted(&price_expr, lag_offset(lag)?),
            ));
        }
    } else {
        tracing::debug!(%mineral, "no price series, building production-only features");
    }

    for series in &config.exogenous {
        let expr = col(series.as_str()).cast(DataType::Float64);
        features.push((format!("{series}_lag_1"), shifted(&expr, 1)));
    }

    let mut seen = BTreeSet::new();
    for (name, _) in &features {
        if !seen.insert(name.as_str()) {
            return Err(FeatureError::DuplicateFeature(name.clone()));
        }
    }

    let target = shifted(&level, -lead).alias(TARGET_COLUMN);

    let complete = features
        .iter()
        .map(|(name, _)| col(name.as_str()).is_not_null())
        .fold(col(TARGET_COLUMN).is_not_null(), |acc, e| acc.and(e));

    let mut selection = vec![col(DATE_COLUMN)];
    selection.extend(
        features
            .iter()
            .map(|(name, expr)| expr.clone().alias(name.as_str())),
    );
    selection.push(target);

    let frame = panel
        .frame()
        .clone()
        .lazy()
        .sort([DATE_COLUMN], SortMultipleOptions::default())
        .select(selection)
        .filter(complete)
        .collect()?;

    tracing::debug!(
        %mineral,
        horizon,
        features = features.len(),
        rows = frame.height(),
        "built feature set"
    );

    let feature_names = features.into_iter().map(|(name, _)| name).collect();
    Ok(FeatureSet::new(mineral, horizon, feature_names, frame))
}
