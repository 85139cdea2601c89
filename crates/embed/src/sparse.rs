//! Compressed sparse row (CSR) matrices.
//!
//! Word-word matrices have `V²` conceptual entries but only a few distinct
//! co-occurring pairs, so every matrix in the pipeline is stored sparsely:
//!
//! ```text
//! row i  →  indices[indptr[i]..indptr[i+1]]   (column ids, ascending)
//!           data   [indptr[i]..indptr[i+1]]   (values, all nonzero)
//! ```
//!
//! Construction goes through triplets `(row, col, value)` whose duplicates
//! are summed, the same contract as a COO → CSR conversion.

// Row/column index arithmetic reads more clearly as plain loops here
#![allow(clippy::needless_range_loop)]

use std::collections::HashMap;

use distributional_core::{CoreError, Shape, TypeId};
use serde::{Deserialize, Serialize};

/// A sparse `rows × cols` matrix of `f64` in CSR layout.
///
/// Only nonzero values are stored. Deserialization checks the CSR layout
/// and rejects documents that break it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CsrParts")]
pub struct SparseMatrix {
    rows: usize,
    cols: usize,
    indptr: Vec<usize>,
    indices: Vec<usize>,
    data: Vec<f64>,
}

/// Serialized CSR arrays before validation.
#[derive(Deserialize)]
struct CsrParts {
    rows: usize,
    cols: usize,
    indptr: Vec<usize>,
    indices: Vec<usize>,
    data: Vec<f64>,
}

impl TryFrom<CsrParts> for SparseMatrix {
    type Error = CoreError;

    fn try_from(parts: CsrParts) -> Result<Self, CoreError> {
        let CsrParts {
            rows,
            cols,
            indptr,
            indices,
            data,
        } = parts;
        let invalid = |reason: &str| CoreError::ValidationError {
            reason: format!("malformed CSR matrix: {}", reason),
        };

        if indptr.len() != rows + 1 || indptr.first() != Some(&0) {
            return Err(invalid("indptr must have rows + 1 entries starting at 0"));
        }
        if indptr.windows(2).any(|w| w[0] > w[1]) {
            return Err(invalid("indptr must be non-decreasing"));
        }
        if indptr[rows] != indices.len() || indices.len() != data.len() {
            return Err(invalid("indptr, indices and data disagree on nnz"));
        }
        for w in indptr.windows(2) {
            let row = &indices[w[0]..w[1]];
            if row.iter().any(|&j| j >= cols) || row.windows(2).any(|p| p[0] >= p[1]) {
                return Err(invalid("column indices must be ascending and below cols"));
            }
        }
        if data.iter().any(|&v| v == 0.0) {
            return Err(invalid("explicit zeros are not stored"));
        }

        Ok(Self {
            rows,
            cols,
            indptr,
            indices,
            data,
        })
    }
}

impl SparseMatrix {
    /// The all-zero matrix.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            indptr: vec![0; rows + 1],
            indices: Vec::new(),
            data: Vec::new(),
        }
    }

    /// Build from `(row, col, value)` triplets, summing duplicates.
    ///
    /// Entries whose sum is exactly zero are not stored.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ValidationError`] if a triplet lies outside the
    /// matrix.
    pub fn from_triplets<I>(rows: usize, cols: usize, triplets: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = (usize, usize, f64)>,
    {
        let mut acc: HashMap<(usize, usize), f64> = HashMap::new();
        for (i, j, v) in triplets {
            if i >= rows || j >= cols {
                return Err(CoreError::ValidationError {
                    reason: format!("entry ({}, {}) outside {}x{} matrix", i, j, rows, cols),
                });
            }
            *acc.entry((i, j)).or_insert(0.0) += v;
        }

        let mut entries: Vec<((usize, usize), f64)> =
            acc.into_iter().filter(|&(_, v)| v != 0.0).collect();
        entries.sort_unstable_by_key(|&(key, _)| key);

        Ok(Self::from_sorted(rows, cols, entries))
    }

    /// Build from a dense row-major matrix (zeros are dropped).
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ValidationError`] if rows have different lengths.
    pub fn from_dense(dense: &[Vec<f64>]) -> Result<Self, CoreError> {
        let rows = dense.len();
        let cols = dense.first().map_or(0, Vec::len);
        if dense.iter().any(|r| r.len() != cols) {
            return Err(CoreError::ValidationError {
                reason: "dense matrix has ragged rows".to_string(),
            });
        }
        let entries = dense.iter().enumerate().flat_map(|(i, row)| {
            row.iter()
                .enumerate()
                .filter(|&(_, &v)| v != 0.0)
                .map(move |(j, &v)| ((i, j), v))
        });
        Ok(Self::from_sorted(rows, cols, entries.collect()))
    }

    /// Entries must be sorted by `(row, col)` with no duplicates.
    fn from_sorted(rows: usize, cols: usize, entries: Vec<((usize, usize), f64)>) -> Self {
        let mut indptr = vec![0; rows + 1];
        let mut indices = Vec::with_capacity(entries.len());
        let mut data = Vec::with_capacity(entries.len());
        for ((i, j), v) in entries {
            indptr[i + 1] += 1;
            indices.push(j);
            data.push(v);
        }
        for i in 0..rows {
            indptr[i + 1] += indptr[i];
        }
        Self {
            rows,
            cols,
            indptr,
            indices,
            data,
        }
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Shape descriptor tagged with `ty`.
    pub fn shape(&self, ty: TypeId) -> Shape {
        Shape::matrix(ty, self.rows, self.cols)
    }

    /// Number of stored (nonzero) entries.
    pub fn nnz(&self) -> usize {
        self.data.len()
    }

    /// Value at `(i, j)`; zero if not stored or out of range.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        if i >= self.rows {
            return 0.0;
        }
        let (start, end) = (self.indptr[i], self.indptr[i + 1]);
        match self.indices[start..end].binary_search(&j) {
            Ok(pos) => self.data[start + pos],
            Err(_) => 0.0,
        }
    }

    /// Stored entries of row `i` as `(col, value)`, ascending by column.
    pub fn row(&self, i: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let (start, end) = if i < self.rows {
            (self.indptr[i], self.indptr[i + 1])
        } else {
            (0, 0)
        };
        self.indices[start..end]
            .iter()
            .copied()
            .zip(self.data[start..end].iter().copied())
    }

    /// All stored entries as `(row, col, value)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        (0..self.rows).flat_map(move |i| self.row(i).map(move |(j, v)| (i, j, v)))
    }

    /// Sum of all entries.
    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }

    /// Sum of each row.
    pub fn row_sums(&self) -> Vec<f64> {
        (0..self.rows).map(|i| self.row(i).map(|(_, v)| v).sum()).collect()
    }

    /// Sum of each column.
    pub fn col_sums(&self) -> Vec<f64> {
        let mut sums = vec![0.0; self.cols];
        for (&j, &v) in self.indices.iter().zip(&self.data) {
            sums[j] += v;
        }
        sums
    }

    /// Element-wise sum of two matrices of the same dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ShapeMismatch`] if dimensions differ.
    pub fn add(&self, other: &SparseMatrix) -> Result<SparseMatrix, CoreError> {
        other
            .shape(TypeId("f64"))
            .expect(&self.shape(TypeId("f64")))?;

        let mut indptr = Vec::with_capacity(self.rows + 1);
        let mut indices = Vec::with_capacity(self.nnz() + other.nnz());
        let mut data = Vec::with_capacity(self.nnz() + other.nnz());
        indptr.push(0);

        for i in 0..self.rows {
            let mut a = self.row(i).peekable();
            let mut b = other.row(i).peekable();
            loop {
                let (j, v) = match (a.peek().copied(), b.peek().copied()) {
                    (None, None) => break,
                    (Some(x), None) => {
                        a.next();
                        x
                    }
                    (None, Some(y)) => {
                        b.next();
                        y
                    }
                    (Some((ja, va)), Some((jb, vb))) => {
                        if ja < jb {
                            a.next();
                            (ja, va)
                        } else if jb < ja {
                            b.next();
                            (jb, vb)
                        } else {
                            a.next();
                            b.next();
                            (ja, va + vb)
                        }
                    }
                };
                if v != 0.0 {
                    indices.push(j);
                    data.push(v);
                }
            }
            indptr.push(indices.len());
        }

        Ok(SparseMatrix {
            rows: self.rows,
            cols: self.cols,
            indptr,
            indices,
            data,
        })
    }

    /// The transposed matrix.
    pub fn transpose(&self) -> SparseMatrix {
        let mut entries: Vec<((usize, usize), f64)> =
            self.iter().map(|(i, j, v)| ((j, i), v)).collect();
        entries.sort_unstable_by_key(|&(key, _)| key);
        Self::from_sorted(self.cols, self.rows, entries)
    }

    /// True if square and `|A[i,j] - A[j,i]| <= tol` for every stored entry.
    pub fn is_symmetric(&self, tol: f64) -> bool {
        self.rows == self.cols && self.iter().all(|(i, j, v)| (v - self.get(j, i)).abs() <= tol)
    }

    /// Keep only the entries for which `f` returns a nonzero value.
    ///
    /// `f` sees `(row, col, value)` for stored entries only, so the cost is
    /// proportional to `nnz`, never to `rows × cols`.
    pub fn filter_map<F>(&self, mut f: F) -> SparseMatrix
    where
        F: FnMut(usize, usize, f64) -> Option<f64>,
    {
        let mut indptr = Vec::with_capacity(self.rows + 1);
        let mut indices = Vec::new();
        let mut data = Vec::new();
        indptr.push(0);
        for i in 0..self.rows {
            for (j, v) in self.row(i) {
                if let Some(out) = f(i, j, v).filter(|&x| x != 0.0) {
                    indices.push(j);
                    data.push(out);
                }
            }
            indptr.push(indices.len());
        }
        SparseMatrix {
            rows: self.rows,
            cols: self.cols,
            indptr,
            indices,
            data,
        }
    }

    /// `A · x` for a dense vector of length `cols`.
    pub fn matvec(&self, x: &[f64]) -> Vec<f64> {
        (0..self.rows)
            .map(|i| self.row(i).map(|(j, v)| v * x[j]).sum())
            .collect()
    }

    /// `Aᵀ · y` for a dense vector of length `rows`.
    pub fn transpose_matvec(&self, y: &[f64]) -> Vec<f64> {
        let mut out = vec![0.0; self.cols];
        for i in 0..self.rows {
            for (j, v) in self.row(i) {
                out[j] += v * y[i];
            }
        }
        out
    }

    /// Dense row-major copy. Only sensible for small matrices.
    pub fn to_dense(&self) -> Vec<Vec<f64>> {
        let mut dense = vec![vec![0.0; self.cols]; self.rows];
        for (i, j, v) in self.iter() {
            dense[i][j] = v;
        }
        dense
    }
}
