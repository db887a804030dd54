//! Aligned feature table and target.

use crate::error::{FeatureError, Result};
use crate::matrix::FeatureMatrix;
use chrono::NaiveDate;
use lode_data::Mineral;
use lode_data::month_code::YearMonth;
use lode_data::panel::frame_months;
use polars::prelude::*;

/// Name of the target column in [`FeatureSet::frame`].
pub const TARGET_COLUMN: &str = "target";

/// Features and target for one (mineral, horizon), one row per month.
///
/// The frame holds `date`, the feature columns in order, then `target`.
/// Every value is non-null.
#[derive(Debug, Clone)]
pub struct FeatureSet {
    mineral: Mineral,
    horizon: usize,
    feature_names: Vec<String>,
    frame: DataFrame,
}

impl FeatureSet {
    pub(crate) const fn new(
        mineral: Mineral,
        horizon: usize,
        feature_names: Vec<String>,
        frame: DataFrame,
    ) -> Self {
        Self {
            mineral,
            horizon,
            feature_names,
            frame,
        }
    }

    /// Mineral being forecast.
    pub const fn mineral(&self) -> Mineral {
        self.mineral
    }

    /// Months ahead of the target.
    pub const fn horizon(&self) -> usize {
        self.horizon
    }

    /// Feature column names, in order.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Underlying frame (`date`, features, `target`).
    pub const fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.frame.height()
    }

    /// Whether no row survived the complete-case filter.
    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    /// Row months.
    pub fn months(&self) -> Result<Vec<YearMonth>> {
        Ok(frame_months(&self.frame)?)
    }

    /// Row dates (first day of month).
    pub fn dates(&self) -> Result<Vec<NaiveDate>> {
        Ok(self.months()?.into_iter().map(YearMonth::first_day).collect())
    }

    /// Values of one feature or of the target.
    pub fn column(&self, name: &str) -> Result<Vec<f64>> {
        let values = self
            .frame
            .column(name)?
            .as_materialized_series()
            .f64()?
            .into_iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect();
        Ok(values)
    }

    /// Target values, aligned with [`FeatureSet::dates`].
    pub fn target(&self) -> Result<Vec<f64>> {
        self.column(TARGET_COLUMN)
    }

    /// Features as a dense matrix for estimators.
    pub fn matrix(&self) -> Result<FeatureMatrix> {
        let columns = self
            .feature_names
            .iter()
            .map(|name| self.column(name))
            .collect::<Result<Vec<_>>>()?;
        FeatureMatrix::from_columns(self.feature_names.clone(), &columns)
    }

    /// Split into (train, test) in time order: the first
    /// `floor(len * train_fraction)` rows train, the rest test.
    pub fn split_chronological(&self, train_fraction: f64) -> Result<(Self, Self)> {
        if !(train_fraction > 0.0 && train_fraction < 1.0) {
            return Err(FeatureError::InvalidSplit(train_fraction));
        }
        let n = self.len();
        let n_train = (n as f64 * train_fraction).floor() as usize;

        let train = self.frame.slice(0, n_train);
        let test = self.frame.slice(n_train as i64, n - n_train);

        Ok((
            Self::new(self.mineral, self.horizon, self.feature_names.clone(), train),
            Self::new(self.mineral, self.horizon, self.feature_names.clone(), test),
        ))
    }
}
