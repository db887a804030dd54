//! Dense feature matrix handed to estimators.

use crate::error::{FeatureError, Result};
use ndarray::{Array2, ArrayView1, Axis};
use std::ops::Range;

/// Row-major feature values with named columns.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    names: Vec<String>,
    values: Array2<f64>,
}

impl FeatureMatrix {
    /// Create a matrix, checking that every column has a name.
    pub fn new(names: Vec<String>, values: Array2<f64>) -> Result<Self> {
        if names.len() != values.ncols() {
            return Err(FeatureError::ShapeMismatch(format!(
                "{} names for {} columns",
                names.len(),
                values.ncols()
            )));
        }
        Ok(Self { names, values })
    }

    /// Create a matrix from equally long columns.
    pub fn from_columns(names: Vec<String>, columns: &[Vec<f64>]) -> Result<Self> {
        let n_rows = columns.first().map_or(0, Vec::len);
        if columns.iter().any(|c| c.len() != n_rows) {
            return Err(FeatureError::ShapeMismatch(
                "columns have different lengths".to_string(),
            ));
        }
        let values = Array2::from_shape_fn((n_rows, columns.len()), |(i, j)| columns[j][i]);
        Self::new(names, values)
    }

    /// Feature names, in column order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Raw values (rows x features).
    pub const fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    /// Number of features.
    pub fn n_features(&self) -> usize {
        self.values.ncols()
    }

    /// Position of a named feature.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Column view of a named feature.
    pub fn column(&self, name: &str) -> Option<ArrayView1<'_, f64>> {
        self.index_of(name).map(|idx| self.values.column(idx))
    }

    /// One row of features.
    pub fn row(&self, index: usize) -> ArrayView1<'_, f64> {
        self.values.row(index)
    }

    /// Copy of a contiguous block of rows.
    pub fn slice_rows(&self, rows: Range<usize>) -> Self {
        let indices: Vec<usize> = rows.collect();
        Self {
            names: self.names.clone(),
            values: self.values.select(Axis(0), &indices),
        }
    }
}
