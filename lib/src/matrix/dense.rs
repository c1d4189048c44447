//! Row-major dense matrix.

use crate::error::{LexiglotError, Result};
use serde::{Deserialize, Serialize};

/// Row-major dense matrix of `f64` values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DenseMatrix {
    data: Vec<f64>,
    rows: usize,
    cols: usize,
}

impl DenseMatrix {
    /// Create a matrix from row-major data.
    ///
    /// # Errors
    /// Returns [`LexiglotError::InvalidParameter`] if `data.len() != rows * cols`.
    pub fn new(data: Vec<f64>, rows: usize, cols: usize) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(LexiglotError::InvalidParameter(format!(
                "dense matrix of shape ({rows}, {cols}) needs {} values, got {}",
                rows * cols,
                data.len()
            )));
        }
        Ok(Self { data, rows, cols })
    }

    /// Create a matrix with `rows` rows and `cols` columns filled with zeros.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![0.0; rows * cols],
            rows,
            cols,
        }
    }

    /// Build a matrix from equally sized rows.
    ///
    /// `cols` is needed so that an empty row list still has a width.
    pub fn from_rows(rows: Vec<Vec<f64>>, cols: usize) -> Result<Self> {
        let n = rows.len();
        let mut data = Vec::with_capacity(n * cols);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != cols {
                return Err(LexiglotError::InvalidParameter(format!(
                    "row {i} has {} values, expected {cols}",
                    row.len()
                )));
            }
            data.extend(row);
        }
        Ok(Self {
            data,
            rows: n,
            cols,
        })
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Borrow row `i`.
    ///
    /// # Panics
    /// Panics if `i >= rows`.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.cols + j]
    }

    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        self.data[i * self.cols + j] = value;
    }

    /// Flat row-major view of the values.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}

#[cfg(feature = "ndarray")]
impl From<ndarray::Array2<f64>> for DenseMatrix {
    fn from(array: ndarray::Array2<f64>) -> Self {
        let (rows, cols) = array.dim();
        let data = array.iter().copied().collect();
        Self { data, rows, cols }
    }
}

#[cfg(feature = "ndarray")]
impl DenseMatrix {
    /// Copy into an `ndarray::Array2`.
    pub fn to_array2(&self) -> ndarray::Array2<f64> {
        ndarray::Array2::from_shape_fn((self.rows, self.cols), |(i, j)| self.get(i, j))
    }
}
