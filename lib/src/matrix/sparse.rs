//! Compressed sparse row (CSR) matrix.

use crate::error::{LexiglotError, Result};
use serde::{Deserialize, Serialize};

/// CSR matrix: row `i` owns `indices[indptr[i]..indptr[i + 1]]`.
///
/// Column indices within a row are strictly increasing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CsrMatrix {
    indptr: Vec<usize>,
    indices: Vec<usize>,
    values: Vec<f64>,
    cols: usize,
}

impl CsrMatrix {
    /// Empty matrix with `cols` columns and no rows.
    pub fn empty(cols: usize) -> Self {
        Self {
            indptr: vec![0],
            indices: Vec::new(),
            values: Vec::new(),
            cols,
        }
    }

    /// Append a row given as `(column, value)` pairs.
    ///
    /// Entries are sorted by column and zero values are dropped.
    ///
    /// # Errors
    /// Returns [`LexiglotError::InvalidParameter`] on an out-of-range or
    /// duplicated column.
    pub fn push_row(&mut self, mut entries: Vec<(usize, f64)>) -> Result<()> {
        entries.sort_by_key(|&(j, _)| j);
        let mut last: Option<usize> = None;
        for (j, v) in entries {
            if j >= self.cols {
                return Err(LexiglotError::InvalidParameter(format!(
                    "column {j} out of range for {} columns",
                    self.cols
                )));
            }
            if last == Some(j) {
                return Err(LexiglotError::InvalidParameter(format!(
                    "duplicate column {j} in sparse row"
                )));
            }
            last = Some(j);
            if v != 0.0 {
                self.indices.push(j);
                self.values.push(v);
            }
        }
        self.indptr.push(self.indices.len());
        Ok(())
    }

    /// Append a row whose columns are already sorted, unique and in range.
    pub(crate) fn push_sorted_row(&mut self, indices: &[usize], values: &[f64]) {
        self.indices.extend_from_slice(indices);
        self.values.extend_from_slice(values);
        self.indptr.push(self.indices.len());
    }

    /// Build from rows of `(column, value)` pairs.
    pub fn from_rows(rows: Vec<Vec<(usize, f64)>>, cols: usize) -> Result<Self> {
        let mut m = Self::empty(cols);
        for row in rows {
            m.push_row(row)?;
        }
        Ok(m)
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.indptr.len() - 1, self.cols)
    }

    /// Number of stored non-zero values.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Column indices and values of row `i`.
    pub fn row(&self, i: usize) -> (&[usize], &[f64]) {
        let (start, end) = (self.indptr[i], self.indptr[i + 1]);
        (&self.indices[start..end], &self.values[start..end])
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        let (indices, values) = self.row(i);
        match indices.binary_search(&j) {
            Ok(pos) => values[pos],
            Err(_) => 0.0,
        }
    }
}
