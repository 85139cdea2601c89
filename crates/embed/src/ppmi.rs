//! Positive pointwise mutual information.
//!
//! ```text
//! PMI(i, j)  = log( C[i,j] · Z / (Z_row[i] · Z_col[j]) )
//! PPMI(i, j) = max(0, PMI(i, j))
//! ```
//!
//! where `Z` is the total count mass and `Z_row`, `Z_col` are the marginals.
//! Only stored entries of `C` are visited, so the transform is `O(nnz)`.
//! Entries that come out as zero are not stored.

use distributional_core::Stage;
use tracing::debug;

use crate::error::{EmbedError, Result};
use crate::sparse::SparseMatrix;

/// PMI of one cell given its count, the total mass and both marginals.
///
/// A zero total or marginal makes the probability undefined; that case is
/// `-∞` and therefore never positive.
pub fn pmi_score(count: f64, total: f64, row_marginal: f64, col_marginal: f64) -> f64 {
    if total <= 0.0 || row_marginal <= 0.0 || col_marginal <= 0.0 || count <= 0.0 {
        return f64::NEG_INFINITY;
    }
    (count * total / (row_marginal * col_marginal)).ln()
}

/// Clamp a PMI score to the positive part.
pub fn positive(pmi: f64) -> f64 {
    if pmi > 0.0 {
        pmi
    } else {
        0.0
    }
}

/// PPMI-weight a (possibly rectangular) count matrix.
///
/// The result has the same dimensions, only entries `> 0`, and is symmetric
/// whenever `counts` is.
pub fn ppmi(counts: &SparseMatrix) -> SparseMatrix {
    let total = counts.sum();
    if total == 0.0 {
        return SparseMatrix::zeros(counts.rows(), counts.cols());
    }

    let row_marginals = counts.row_sums();
    let col_marginals = counts.col_sums();

    let weighted = counts.filter_map(|i, j, c| {
        let score = positive(pmi_score(c, total, row_marginals[i], col_marginals[j]));
        Some(score)
    });

    debug!(
        input_nnz = counts.nnz(),
        output_nnz = weighted.nnz(),
        total,
        "applied PPMI weighting"
    );
    weighted
}

/// Pipeline stage wrapping [`ppmi`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PpmiTransform;

impl Stage for PpmiTransform {
    type Input = SparseMatrix;
    type Output = SparseMatrix;
    type Error = EmbedError;

    fn run(&self, input: &SparseMatrix) -> Result<SparseMatrix> {
        Ok(ppmi(input))
    }

    fn name(&self) -> &'static str {
        "ppmi"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    #[test]
    fn test_all_zero_input() {
        let p = ppmi(&SparseMatrix::zeros(4, 4));
        assert_eq!(p.nnz(), 0);
        assert_eq!(p.rows(), 4);
        assert_eq!(p.cols(), 4);
    }

    #[test]
    fn test_independent_counts_give_zero() {
        // Outer product of marginals: every cell has c·Z == Z_row·Z_col
        let c = SparseMatrix::from_dense(&[vec![1.0, 2.0], vec![2.0, 4.0]]).unwrap();
        let p = ppmi(&c);
        assert_eq!(p.nnz(), 0);
    }

    #[test]
    fn test_hand_computed_value() {
        // Z = 4, rows = [2, 2], cols = [2, 2]
        let c = SparseMatrix::from_dense(&[vec![2.0, 0.0], vec![0.0, 2.0]]).unwrap();
        let p = ppmi(&c);
        // log(2 · 4 / (2 · 2)) = log 2
        assert!((p.get(0, 0) - 2f64.ln()).abs() < TOL);
        assert!((p.get(1, 1) - 2f64.ln()).abs() < TOL);
        assert_eq!(p.get(0, 1), 0.0);
    }

    #[test]
    fn test_negative_pmi_dropped() {
        // (0,1) co-occurs less than chance
        let c = SparseMatrix::from_dense(&[vec![10.0, 1.0], vec![1.0, 10.0]]).unwrap();
        let p = ppmi(&c);
        assert_eq!(p.get(0, 1), 0.0);
        assert!(p.get(0, 0) > 0.0);
        assert_eq!(p.nnz(), 2);
    }

    #[test]
    fn test_symmetric_and_nonnegative() {
        let c = SparseMatrix::from_dense(&[
            vec![0.0, 3.0, 1.0],
            vec![3.0, 2.0, 0.0],
            vec![1.0, 0.0, 5.0],
        ])
        .unwrap();
        let p = ppmi(&c);
        assert!(p.is_symmetric(TOL));
        assert!(p.iter().all(|(_, _, v)| v > 0.0 && v.is_finite()));
    }

    #[test]
    fn test_rectangular_uses_separate_marginals() {
        // 1 × 2 word-context matrix
        let c = SparseMatrix::from_dense(&[vec![1.0, 3.0]]).unwrap();
        let p = ppmi(&c);
        // row marginal 4, col marginals 1 and 3, Z = 4 → PMI = 0 everywhere
        assert_eq!(p.nnz(), 0);
        assert_eq!((p.rows(), p.cols()), (1, 2));
    }

    #[test]
    fn test_zero_marginal_is_negative_infinity() {
        assert_eq!(pmi_score(1.0, 10.0, 0.0, 5.0), f64::NEG_INFINITY);
        assert_eq!(pmi_score(1.0, 10.0, 5.0, 0.0), f64::NEG_INFINITY);
        assert_eq!(pmi_score(1.0, 0.0, 5.0, 5.0), f64::NEG_INFINITY);
        assert_eq!(positive(pmi_score(1.0, 10.0, 0.0, 5.0)), 0.0);
    }

    #[test]
    fn test_stage_name() {
        assert_eq!(PpmiTransform.name(), "ppmi");
        let c = SparseMatrix::from_dense(&[vec![2.0, 0.0], vec![0.0, 2.0]]).unwrap();
        assert_eq!(PpmiTransform.run(&c).unwrap(), ppmi(&c));
    }
}
