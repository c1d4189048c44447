//! # Feature matrices
//!
//! Extractors produce either a dense block (hand-engineered features) or a
//! sparse block (n-gram counts). [`FeatureMatrix`] wraps both behind one
//! row-oriented API so that classifiers never care which backing they got,
//! and [`FeatureMatrix::hstack`] concatenates blocks column-wise without
//! losing values from either side.
//!
//! ```rust
//! use lexiglot::matrix::{CsrMatrix, DenseMatrix, FeatureMatrix};
//!
//! let counts = CsrMatrix::from_rows(vec![vec![(1, 2.0)], vec![]], 3).unwrap();
//! let dense = DenseMatrix::new(vec![0.5, 1.0], 2, 1).unwrap();
//!
//! let fused = FeatureMatrix::hstack(&[counts.into(), dense.into()]).unwrap();
//! assert_eq!(fused.shape(), (2, 4));
//! assert_eq!(fused.row(0).to_dense_with_width(4), vec![0.0, 2.0, 0.0, 0.5]);
//! ```

use crate::error::{LexiglotError, Result};
use serde::{Deserialize, Serialize};

pub mod dense;
pub mod sparse;

pub use dense::DenseMatrix;
pub use sparse::CsrMatrix;

/// A feature matrix with dense or sparse backing; one row per word.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum FeatureMatrix {
    Dense(DenseMatrix),
    Sparse(CsrMatrix),
}

impl From<DenseMatrix> for FeatureMatrix {
    fn from(m: DenseMatrix) -> Self {
        FeatureMatrix::Dense(m)
    }
}

impl From<CsrMatrix> for FeatureMatrix {
    fn from(m: CsrMatrix) -> Self {
        FeatureMatrix::Sparse(m)
    }
}

impl FeatureMatrix {
    pub fn shape(&self) -> (usize, usize) {
        match self {
            FeatureMatrix::Dense(m) => m.shape(),
            FeatureMatrix::Sparse(m) => m.shape(),
        }
    }

    pub fn n_rows(&self) -> usize {
        self.shape().0
    }

    pub fn n_cols(&self) -> usize {
        self.shape().1
    }

    pub fn is_sparse(&self) -> bool {
        matches!(self, FeatureMatrix::Sparse(_))
    }

    /// Borrow row `i` as a [`Row`] view.
    pub fn row(&self, i: usize) -> Row<'_> {
        match self {
            FeatureMatrix::Dense(m) => Row::Dense(m.row(i)),
            FeatureMatrix::Sparse(m) => {
                let (indices, values) = m.row(i);
                Row::Sparse { indices, values }
            }
        }
    }

    /// Iterate over all rows in order.
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        (0..self.n_rows()).map(move |i| self.row(i))
    }

    /// Concatenate blocks column-wise.
    ///
    /// Row `i` of the result is row `i` of every block, in block order. The
    /// result is dense only when every block is dense.
    ///
    /// # Errors
    /// Returns [`LexiglotError::InvalidParameter`] when no blocks are given
    /// or the blocks disagree on the number of rows.
    pub fn hstack(blocks: &[FeatureMatrix]) -> Result<FeatureMatrix> {
        let first = blocks.first().ok_or_else(|| {
            LexiglotError::InvalidParameter("hstack needs at least one block".to_string())
        })?;
        let n_rows = first.n_rows();
        if let Some(bad) = blocks.iter().find(|b| b.n_rows() != n_rows) {
            return Err(LexiglotError::InvalidParameter(format!(
                "hstack row mismatch: {} vs {}",
                n_rows,
                bad.n_rows()
            )));
        }
        let n_cols: usize = blocks.iter().map(|b| b.n_cols()).sum();

        if blocks.iter().all(|b| !b.is_sparse()) {
            let mut data = Vec::with_capacity(n_rows * n_cols);
            for i in 0..n_rows {
                for block in blocks {
                    data.extend(block.row(i).to_dense());
                }
            }
            return Ok(DenseMatrix::new(data, n_rows, n_cols)?.into());
        }

        let mut out = CsrMatrix::empty(n_cols);
        for i in 0..n_rows {
            let mut entries = Vec::new();
            let mut offset = 0;
            for block in blocks {
                entries.extend(block.row(i).iter().map(|(j, v)| (j + offset, v)));
                offset += block.n_cols();
            }
            out.push_row(entries)?;
        }
        Ok(out.into())
    }

    /// Keep only the given rows, in the given order.
    pub fn select_rows(&self, rows: &[usize]) -> FeatureMatrix {
        match self {
            FeatureMatrix::Dense(m) => {
                let cols = m.shape().1;
                let mut dense = DenseMatrix::zeros(rows.len(), cols);
                for (out, &i) in rows.iter().enumerate() {
                    for (j, &v) in m.row(i).iter().enumerate() {
                        dense.set(out, j, v);
                    }
                }
                dense.into()
            }
            FeatureMatrix::Sparse(m) => {
                let mut sparse = CsrMatrix::empty(m.shape().1);
                for &i in rows {
                    let (indices, values) = m.row(i);
                    sparse.push_sorted_row(indices, values);
                }
                sparse.into()
            }
        }
    }

    /// Population variance over every entry, zeros included.
    pub fn variance(&self) -> f64 {
        let (rows, cols) = self.shape();
        let n = (rows * cols) as f64;
        if n == 0.0 {
            return 0.0;
        }
        let (sum, sum_sq) = self
            .rows()
            .flat_map(|r| r.iter())
            .fold((0.0, 0.0), |(s, sq), (_, v)| (s + v, sq + v * v));
        let mean = sum / n;
        (sum_sq / n - mean * mean).max(0.0)
    }

    /// Non-zero entries grouped by column, each list ordered by row.
    pub fn column_nonzeros(&self) -> Vec<Vec<(usize, f64)>> {
        let mut columns = vec![Vec::new(); self.n_cols()];
        for (i, row) in self.rows().enumerate() {
            for (j, v) in row.iter() {
                columns[j].push((i, v));
            }
        }
        columns
    }

    /// Copy into a dense matrix.
    pub fn to_dense(&self) -> DenseMatrix {
        match self {
            FeatureMatrix::Dense(m) => m.clone(),
            FeatureMatrix::Sparse(_) => {
                let (rows, cols) = self.shape();
                let mut dense = DenseMatrix::zeros(rows, cols);
                for (i, row) in self.rows().enumerate() {
                    for (j, v) in row.iter() {
                        dense.set(i, j, v);
                    }
                }
                dense
            }
        }
    }
}

/// Borrowed view of one matrix row.
#[derive(Clone, Copy, Debug)]
pub enum Row<'a> {
    Dense(&'a [f64]),
    Sparse {
        indices: &'a [usize],
        values: &'a [f64],
    },
}

impl<'a> Row<'a> {
    /// Iterate over `(column, value)` pairs with non-zero value.
    pub fn iter(&self) -> RowIter<'a> {
        match *self {
            Row::Dense(values) => RowIter::Dense { values, pos: 0 },
            Row::Sparse { indices, values } => RowIter::Sparse {
                indices,
                values,
                pos: 0,
            },
        }
    }

    /// Value at column `j`; missing sparse entries read as zero.
    pub fn get(&self, j: usize) -> f64 {
        match *self {
            Row::Dense(values) => values.get(j).copied().unwrap_or(0.0),
            Row::Sparse { indices, values } => indices
                .binary_search(&j)
                .map_or(0.0, |pos| values[pos]),
        }
    }

    /// Dot product with a dense weight vector of the same width.
    pub fn dot_dense(&self, weights: &[f64]) -> f64 {
        match *self {
            Row::Dense(values) => values.iter().zip(weights).map(|(a, b)| a * b).sum(),
            Row::Sparse { indices, values } => indices
                .iter()
                .zip(values)
                .map(|(&j, v)| v * weights[j])
                .sum(),
        }
    }

    /// Dot product of two rows of the same width.
    pub fn dot(&self, other: &Row<'_>) -> f64 {
        match (*self, *other) {
            (Row::Dense(a), Row::Dense(b)) => a.iter().zip(b).map(|(x, y)| x * y).sum(),
            (Row::Dense(a), sparse @ Row::Sparse { .. })
            | (sparse @ Row::Sparse { .. }, Row::Dense(a)) => sparse.dot_dense(a),
            (
                Row::Sparse {
                    indices: ia,
                    values: va,
                },
                Row::Sparse {
                    indices: ib,
                    values: vb,
                },
            ) => {
                let (mut p, mut q, mut acc) = (0, 0, 0.0);
                while p < ia.len() && q < ib.len() {
                    match ia[p].cmp(&ib[q]) {
                        std::cmp::Ordering::Less => p += 1,
                        std::cmp::Ordering::Greater => q += 1,
                        std::cmp::Ordering::Equal => {
                            acc += va[p] * vb[q];
                            p += 1;
                            q += 1;
                        }
                    }
                }
                acc
            }
        }
    }

    pub fn squared_norm(&self) -> f64 {
        self.iter().map(|(_, v)| v * v).sum()
    }

    /// Squared euclidean distance between two rows.
    ///
    /// Both iterators yield columns in increasing order, so one merge pass
    /// covers every backing combination.
    pub fn squared_distance(&self, other: &Row<'_>) -> f64 {
        let mut a = self.iter().peekable();
        let mut b = other.iter().peekable();
        let mut acc = 0.0;
        loop {
            match (a.peek().copied(), b.peek().copied()) {
                (Some((ja, va)), Some((jb, vb))) => match ja.cmp(&jb) {
                    std::cmp::Ordering::Less => {
                        acc += va * va;
                        a.next();
                    }
                    std::cmp::Ordering::Greater => {
                        acc += vb * vb;
                        b.next();
                    }
                    std::cmp::Ordering::Equal => {
                        acc += (va - vb) * (va - vb);
                        a.next();
                        b.next();
                    }
                },
                (Some((_, va)), None) => {
                    acc += va * va;
                    a.next();
                }
                (None, Some((_, vb))) => {
                    acc += vb * vb;
                    b.next();
                }
                (None, None) => return acc,
            }
        }
    }

    /// Expand into a dense vector of `width` values.
    pub fn to_dense_with_width(&self, width: usize) -> Vec<f64> {
        let mut out = vec![0.0; width];
        for (j, v) in self.iter() {
            out[j] = v;
        }
        out
    }

    /// Expand into a dense vector. Sparse rows are expanded up to their
    /// last stored column only when no width is known, so prefer
    /// [`Row::to_dense_with_width`] for sparse rows.
    pub fn to_dense(&self) -> Vec<f64> {
        match *self {
            Row::Dense(values) => values.to_vec(),
            Row::Sparse { indices, .. } => {
                let width = indices.last().map_or(0, |&j| j + 1);
                self.to_dense_with_width(width)
            }
        }
    }
}

/// Iterator over the non-zero entries of a [`Row`].
pub enum RowIter<'a> {
    Dense {
        values: &'a [f64],
        pos: usize,
    },
    Sparse {
        indices: &'a [usize],
        values: &'a [f64],
        pos: usize,
    },
}

impl Iterator for RowIter<'_> {
    type Item = (usize, f64);

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            RowIter::Dense { values, pos } => {
                while *pos < values.len() {
                    let j = *pos;
                    *pos += 1;
                    if values[j] != 0.0 {
                        return Some((j, values[j]));
                    }
                }
                None
            }
            RowIter::Sparse {
                indices,
                values,
                pos,
            } => {
                let j = *pos;
                if j < indices.len() {
                    *pos += 1;
                    Some((indices[j], values[j]))
                } else {
                    None
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sparse_block() -> FeatureMatrix {
        CsrMatrix::from_rows(vec![vec![(0, 1.0), (2, 3.0)], vec![(1, 2.0)]], 3)
            .unwrap()
            .into()
    }

    fn dense_block() -> FeatureMatrix {
        DenseMatrix::new(vec![0.5, 0.0, -1.0, 1.0], 2, 2)
            .unwrap()
            .into()
    }

    #[test]
    fn test_hstack_sparse_then_dense() {
        let fused = FeatureMatrix::hstack(&[sparse_block(), dense_block()]).unwrap();
        assert!(fused.is_sparse());
        assert_eq!(fused.shape(), (2, 5));
        assert_eq!(
            fused.row(0).to_dense_with_width(5),
            vec![1.0, 0.0, 3.0, 0.5, 0.0]
        );
        assert_eq!(
            fused.row(1).to_dense_with_width(5),
            vec![0.0, 2.0, 0.0, -1.0, 1.0]
        );
    }

    #[test]
    fn test_hstack_all_dense_stays_dense() {
        let fused = FeatureMatrix::hstack(&[dense_block(), dense_block()]).unwrap();
        assert!(!fused.is_sparse());
        assert_eq!(fused.row(1).to_dense(), vec![-1.0, 1.0, -1.0, 1.0]);
    }

    #[test]
    fn test_hstack_row_mismatch() {
        let one_row: FeatureMatrix = DenseMatrix::zeros(1, 2).into();
        let result = FeatureMatrix::hstack(&[sparse_block(), one_row]);
        assert!(matches!(result, Err(LexiglotError::InvalidParameter(_))));
    }

    #[test]
    fn test_hstack_empty() {
        assert!(FeatureMatrix::hstack(&[]).is_err());
    }

    #[test]
    fn test_dot_mixed_backings() {
        let s = sparse_block();
        let d: FeatureMatrix = DenseMatrix::new(vec![1.0, 1.0, 1.0], 1, 3).unwrap().into();
        assert_eq!(s.row(0).dot(&d.row(0)), 4.0);
        assert_eq!(d.row(0).dot(&s.row(1)), 2.0);
        assert_eq!(s.row(0).dot(&s.row(1)), 0.0);
        assert_eq!(s.row(0).dot(&s.row(0)), 10.0);
    }

    #[test]
    fn test_row_get() {
        let s = sparse_block();
        assert_eq!(s.row(0).get(2), 3.0);
        assert_eq!(s.row(0).get(1), 0.0);
        assert_eq!(dense_block().row(1).get(0), -1.0);
    }

    #[test]
    fn test_squared_distance() {
        let s = sparse_block();
        // (1,0,3) vs (0,2,0)
        assert!((s.row(0).squared_distance(&s.row(1)) - 14.0).abs() < 1e-12);
        assert_eq!(s.row(0).squared_distance(&s.row(0)), 0.0);
    }

    #[test]
    fn test_dense_row_iter_skips_zeros() {
        let d = dense_block();
        let entries: Vec<_> = d.row(0).iter().collect();
        assert_eq!(entries, vec![(0, 0.5)]);
    }

    #[test]
    fn test_column_nonzeros() {
        let cols = sparse_block().column_nonzeros();
        assert_eq!(cols.len(), 3);
        assert_eq!(cols[0], vec![(0, 1.0)]);
        assert_eq!(cols[1], vec![(1, 2.0)]);
        assert_eq!(cols[2], vec![(0, 3.0)]);
    }

    #[test]
    fn test_select_rows() {
        let picked = sparse_block().select_rows(&[1, 1, 0]);
        assert_eq!(picked.shape(), (3, 3));
        assert_eq!(picked.row(0).to_dense_with_width(3), vec![0.0, 2.0, 0.0]);
        assert_eq!(picked.row(2).to_dense_with_width(3), vec![1.0, 0.0, 3.0]);

        let dense = dense_block().select_rows(&[1]);
        assert_eq!(dense.row(0).to_dense(), vec![-1.0, 1.0]);
    }

    #[test]
    fn test_variance_counts_implicit_zeros() {
        // entries: 1, 0, 3, 0, 2, 0 -> mean 1, E[x^2] = 14/6
        let var = sparse_block().variance();
        assert!((var - (14.0 / 6.0 - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_to_dense_from_sparse() {
        let dense = sparse_block().to_dense();
        assert_eq!(dense.shape(), (2, 3));
        assert_eq!(dense.row(0), &[1.0, 0.0, 3.0]);
    }
}
