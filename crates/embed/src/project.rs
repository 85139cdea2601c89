//! Low-rank projection via seeded randomized truncated SVD.
//!
//! Given a sparse `V × V` matrix `M` and a target rank `d`, this computes
//! the `d` leading singular triplets and returns the rows of `U · Σ`, each
//! scaled to unit length.
//!
//! # Algorithm
//!
//! ```text
//! k  = min(d + oversamples, V)
//! Ω  = random V × k                       (ChaCha8, seeded)
//! Q  = orth(M Ω)                          (column-pivoted QR)
//! repeat n_iter:  Q = orth(M · orth(Mᵀ Q))     (subspace iteration)
//! B  = Qᵀ M                                (k × V)
//! B Bᵀ = W Λ Wᵀ                            (symmetric eigen, k × k)
//! U  = Q W,  σ = √λ                        (descending)
//! ```
//!
//! The dense `k × k` and `V × k` work is done with `nalgebra`. Directions
//! of `Q` that collapse to numerical zero are dropped rather than refilled
//! at random, so rank-deficient inputs yield trailing components with
//! `σ = 0` and identical input rows map to the same output row up to
//! rounding.
//!
//! Each column of `U` is sign-normalized so its largest-magnitude entry is
//! positive. Rows whose projection vanishes (words with no signal, up to
//! rounding) are set to zero vectors and listed in [`Projection::zero_rows`].

use distributional_core::{Shape, Stage, TypeId};
use nalgebra::{DMatrix, DVector, SymmetricEigen};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{EmbedError, Result};
use crate::sparse::SparseMatrix;

/// Relative size of `R[i,i]` below which a sampled direction counts as dependent.
const RANK_TOLERANCE: f64 = 1e-10;

/// Rows whose norm is this small relative to the largest row count as empty.
const ZERO_ROW_TOLERANCE: f64 = 1e-12;

/// Seeded randomized truncated SVD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LowRankProjector {
    /// Seed for the random test matrix.
    pub seed: u64,
    /// Extra columns sampled beyond `d`.
    pub n_oversamples: usize,
    /// Subspace (power) iterations.
    pub n_iter: usize,
}

impl Default for LowRankProjector {
    fn default() -> Self {
        Self {
            seed: 42,
            n_oversamples: 10,
            n_iter: 5,
        }
    }
}

/// Normalized word vectors plus per-component diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    /// `V × d` unit-length rows (zero rows stay zero).
    pub vectors: Vec<Vec<f64>>,
    /// Leading singular values, descending.
    pub singular_values: Vec<f64>,
    /// Variance of each column of `U · Σ` before row normalization.
    pub explained_variance: Vec<f64>,
    /// `explained_variance` over the total column variance of the input.
    pub explained_variance_ratio: Vec<f64>,
    /// Rows that had no projection and were left as zero vectors.
    pub zero_rows: Vec<usize>,
}

impl Projection {
    /// Number of rows (vocabulary entries).
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// True if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Number of components kept.
    pub fn dim(&self) -> usize {
        self.singular_values.len()
    }

    /// Vector for row `id`.
    pub fn row(&self, id: usize) -> Option<&[f64]> {
        self.vectors.get(id).map(Vec::as_slice)
    }

    /// Running total of [`Projection::explained_variance`].
    pub fn cumulative_explained_variance(&self) -> Vec<f64> {
        self.explained_variance
            .iter()
            .scan(0.0, |acc, &v| {
                *acc += v;
                Some(*acc)
            })
            .collect()
    }

    /// `vectors[V, d]`.
    pub fn shape(&self) -> Shape {
        Shape::vectors(self.len(), self.dim())
    }
}

impl LowRankProjector {
    /// Projector with the given seed and default sampling parameters.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Set the number of oversampled columns.
    #[must_use]
    pub fn with_oversamples(mut self, n_oversamples: usize) -> Self {
        self.n_oversamples = n_oversamples;
        self
    }

    /// Set the number of subspace iterations.
    #[must_use]
    pub fn with_iterations(mut self, n_iter: usize) -> Self {
        self.n_iter = n_iter;
        self
    }

    /// Wrap as a pipeline stage producing `dim` components.
    pub fn into_stage(self, dim: usize) -> Project {
        Project {
            projector: self,
            dim,
        }
    }

    /// Project the square matrix `m` onto its `dim` leading components.
    ///
    /// # Errors
    ///
    /// - [`EmbedError::Shape`] if `m` is not square
    /// - [`EmbedError::InvalidParameter`] if `dim == 0` or `dim > V`
    pub fn project(&self, m: &SparseMatrix, dim: usize) -> Result<Projection> {
        let n = m.rows();
        m.shape(TypeId("scores")).expect(&Shape::scores(n))?;
        if dim == 0 || dim > n {
            return Err(EmbedError::InvalidParameter {
                name: "dim",
                value: dim,
                reason: format!("must be between 1 and the vocabulary size {}", n),
            });
        }

        let k = (dim + self.n_oversamples).min(n);
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);

        let omega = DMatrix::from_fn(n, k, |_, _| rng.gen_range(-1.0..1.0));
        let mut q = orthonormalize(multiply(m, &omega));
        for _ in 0..self.n_iter {
            let z = orthonormalize(multiply_transpose(m, &q));
            q = orthonormalize(multiply(m, &z));
        }
        let rank = q.ncols();

        // Bᵀ = Mᵀ Q, so B Bᵀ is the Gram matrix of its columns
        let bt = multiply_transpose(m, &q);
        let (eigenvalues, eigenvectors) = if rank == 0 {
            (DVector::zeros(0), DMatrix::zeros(0, 0))
        } else {
            let eigen = SymmetricEigen::new(bt.transpose() * &bt);
            (eigen.eigenvalues, eigen.eigenvectors)
        };

        let mut order: Vec<usize> = (0..rank).collect();
        order.sort_by(|&x, &y| eigenvalues[y].total_cmp(&eigenvalues[x]));

        // Columns of U · Σ, padded with zero components past the rank.
        let mut singular_values = Vec::with_capacity(dim);
        let mut scaled_columns = Vec::with_capacity(dim);
        for c in 0..dim {
            let Some(&idx) = order.get(c) else {
                singular_values.push(0.0);
                scaled_columns.push(vec![0.0; n]);
                continue;
            };
            let sigma = eigenvalues[idx].max(0.0).sqrt();
            let mut u: Vec<f64> = (&q * eigenvectors.column(idx)).iter().copied().collect();
            flip_sign(&mut u);
            singular_values.push(sigma);
            scaled_columns.push(u.into_iter().map(|x| x * sigma).collect());
        }

        let explained_variance: Vec<f64> = scaled_columns.iter().map(|c| variance(c)).collect();
        let total_variance = column_variance_total(m);
        let explained_variance_ratio = explained_variance
            .iter()
            .map(|&v| if total_variance > 0.0 { v / total_variance } else { 0.0 })
            .collect();

        let mut vectors = vec![vec![0.0; dim]; n];
        for (c, col) in scaled_columns.iter().enumerate() {
            for (i, &x) in col.iter().enumerate() {
                vectors[i][c] = x;
            }
        }
        let norms: Vec<f64> = vectors.iter().map(|r| dot(r, r).sqrt()).collect();
        let max_norm = norms.iter().copied().fold(0.0, f64::max);
        let mut zero_rows = Vec::new();
        for (i, (row, &norm)) in vectors.iter_mut().zip(&norms).enumerate() {
            if norm > ZERO_ROW_TOLERANCE * max_norm {
                row.iter_mut().for_each(|x| *x /= norm);
            } else {
                row.iter_mut().for_each(|x| *x = 0.0);
                zero_rows.push(i);
            }
        }
        if !zero_rows.is_empty() {
            warn!(count = zero_rows.len(), "rows with no signal left as zero vectors");
        }
        debug!(
            input = %Shape::scores(n),
            output = %Shape::vectors(n, dim),
            sampled = k,
            rank,
            seed = self.seed,
            "projected to low rank"
        );

        Ok(Projection {
            vectors,
            singular_values,
            explained_variance,
            explained_variance_ratio,
            zero_rows,
        })
    }
}

/// Pipeline stage: [`LowRankProjector`] with a fixed output dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Project {
    projector: LowRankProjector,
    dim: usize,
}

impl Project {
    /// Target dimensionality.
    pub fn dim(&self) -> usize {
        self.dim
    }
}

impl Stage for Project {
    type Input = SparseMatrix;
    type Output = Projection;
    type Error = EmbedError;

    fn run(&self, input: &SparseMatrix) -> Result<Projection> {
        self.projector.project(input, self.dim)
    }

    fn name(&self) -> &'static str {
        "project"
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// `M · X`, one column at a time.
fn multiply(m: &SparseMatrix, x: &DMatrix<f64>) -> DMatrix<f64> {
    let data: Vec<f64> = x
        .column_iter()
        .flat_map(|col| m.matvec(&col.iter().copied().collect::<Vec<_>>()))
        .collect();
    DMatrix::from_vec(m.rows(), x.ncols(), data)
}

/// `Mᵀ · X`, one column at a time.
fn multiply_transpose(m: &SparseMatrix, x: &DMatrix<f64>) -> DMatrix<f64> {
    let data: Vec<f64> = x
        .column_iter()
        .flat_map(|col| m.transpose_matvec(&col.iter().copied().collect::<Vec<_>>()))
        .collect();
    DMatrix::from_vec(m.cols(), x.ncols(), data)
}

/// Orthonormal basis for the column space of `y`, via column-pivoted QR.
///
/// Pivoting orders `|R[i,i]|` from largest to smallest; columns whose
/// diagonal falls below [`RANK_TOLERANCE`] relative to the first are
/// dropped.
fn orthonormalize(y: DMatrix<f64>) -> DMatrix<f64> {
    let rows = y.nrows();
    if y.ncols() == 0 || rows == 0 {
        return DMatrix::zeros(rows, 0);
    }
    let qr = y.col_piv_qr();
    let r = qr.r();
    let largest = r[(0, 0)].abs();
    let rank = (0..r.nrows().min(r.ncols()))
        .take_while(|&i| largest > 0.0 && r[(i, i)].abs() > RANK_TOLERANCE * largest)
        .count();
    qr.q().columns(0, rank).into_owned()
}

/// Make the largest-magnitude entry positive (first one wins ties).
fn flip_sign(u: &mut [f64]) {
    let mut pivot = 0.0f64;
    for &x in u.iter() {
        if x.abs() > pivot.abs() {
            pivot = x;
        }
    }
    if pivot < 0.0 {
        u.iter_mut().for_each(|x| *x = -*x);
    }
}

/// Population variance.
fn variance(x: &[f64]) -> f64 {
    if x.is_empty() {
        return 0.0;
    }
    let n = x.len() as f64;
    let mean = x.iter().sum::<f64>() / n;
    x.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n
}

/// Sum over columns of the population variance of each column of `m`.
fn column_variance_total(m: &SparseMatrix) -> f64 {
    let n = m.rows() as f64;
    if n == 0.0 {
        return 0.0;
    }
    let mut sums = vec![0.0; m.cols()];
    let mut squares = vec![0.0; m.cols()];
    for (_, j, v) in m.iter() {
        sums[j] += v;
        squares[j] += v * v;
    }
    sums.iter()
        .zip(&squares)
        .map(|(&s, &sq)| (sq / n - (s / n) * (s / n)).max(0.0))
        .sum()
}
