//! Property tests over random token streams.

use distributional_embed::ppmi::{pmi_score, positive};
use distributional_embed::{cooccurrence_matrix, ppmi, LowRankProjector};
use proptest::prelude::*;

/// A vocabulary size, a stream over it and a window radius.
fn stream() -> impl Strategy<Value = (usize, Vec<usize>, usize)> {
    (1usize..12).prop_flat_map(|v| (Just(v), prop::collection::vec(0..v, 0..60), 1usize..5))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn counts_are_symmetric((v, tokens, window) in stream()) {
        let c = cooccurrence_matrix(&tokens, v, window).unwrap();
        prop_assert!(c.is_symmetric(0.0));
        prop_assert_eq!(c.rows(), v);
        prop_assert!(c.iter().all(|(_, _, x)| x > 0.0 && x.fract() == 0.0));
    }

    #[test]
    fn stored_counts_never_have_zero_marginals((v, tokens, window) in stream()) {
        let c = cooccurrence_matrix(&tokens, v, window).unwrap();
        let rows = c.row_sums();
        let cols = c.col_sums();
        let total = c.sum();
        for (i, j, x) in c.iter() {
            prop_assert!(rows[i] > 0.0 && cols[j] > 0.0);
            prop_assert!(pmi_score(x, total, rows[i], cols[j]).is_finite());
        }
    }

    #[test]
    fn ppmi_is_nonnegative_and_symmetric((v, tokens, window) in stream()) {
        let p = ppmi(&cooccurrence_matrix(&tokens, v, window).unwrap());
        prop_assert!(p.iter().all(|(_, _, x)| x > 0.0 && x.is_finite()));
        prop_assert!(p.is_symmetric(1e-12));
    }

    #[test]
    fn projected_rows_are_unit_or_reported_zero(
        (v, tokens, window) in stream(),
        dim_seed in 0usize..100,
        seed in any::<u64>(),
    ) {
        let p = ppmi(&cooccurrence_matrix(&tokens, v, window).unwrap());
        let dim = 1 + dim_seed % v;
        let projection = LowRankProjector::new(seed).project(&p, dim).unwrap();

        prop_assert_eq!(projection.len(), v);
        prop_assert_eq!(projection.dim(), dim);
        for (id, row) in projection.vectors.iter().enumerate() {
            let norm = row.iter().map(|x| x * x).sum::<f64>().sqrt();
            if projection.zero_rows.contains(&id) {
                prop_assert_eq!(norm, 0.0);
            } else {
                prop_assert!((norm - 1.0).abs() < 1e-9, "row {} has norm {}", id, norm);
            }
        }
        prop_assert!(projection.singular_values.windows(2).all(|w| w[0] >= w[1]));
    }
}

#[test]
fn positive_clamps_undefined_scores() {
    assert_eq!(positive(pmi_score(3.0, 10.0, 0.0, 2.0)), 0.0);
    assert_eq!(positive(f64::NEG_INFINITY), 0.0);
    assert_eq!(positive(0.5), 0.5);
}
