//! # Shape Tests
//!
//! Tests for the shape system:
//! - Constructors (scalar, vector, matrix and the pipeline shorthands)
//! - Shape mismatch detection
//! - Display formatting

use distributional_core::shape::{Shape, TypeId};
use distributional_core::CoreError;

// ============================================================================
// Constructor Tests
// ============================================================================

#[test]
fn test_scalar_constructor() {
    let s = Shape::scalar(TypeId("total"));
    assert_eq!(s.dims, Vec::<usize>::new());
    assert_eq!(s.rank(), 0);
    assert_eq!(s.numel(), 1); // scalar has 1 element
    assert_eq!(s.rows(), None);
}

#[test]
fn test_token_stream() {
    let s = Shape::token_stream(12);
    assert_eq!(s.ty, TypeId("token_ids"));
    assert_eq!(s.rank(), 1);
    assert_eq!(s.rows(), Some(12));
    assert_eq!(s.cols(), None);
}

#[test]
fn test_pipeline_matrices() {
    let counts = Shape::counts(8);
    let scores = Shape::scores(8);
    let vectors = Shape::vectors(8, 3);

    assert_eq!(counts.dims, vec![8, 8]);
    assert_eq!(counts.numel(), 64);
    assert!(counts.is_square());
    assert!(scores.is_square());
    assert!(!vectors.is_square());
    assert_eq!(vectors.cols(), Some(3));
}

#[test]
fn test_type_distinguishes_shapes() {
    // Same dimensions, different meaning
    assert!(!Shape::counts(5).is_compatible(&Shape::scores(5)));
    assert!(Shape::counts(5).is_compatible(&Shape::counts(5)));
}

// ============================================================================
// Validation Tests
// ============================================================================

#[test]
fn test_expect_reports_both_shapes() {
    let err = Shape::vectors(4, 2).expect(&Shape::vectors(8, 2)).unwrap_err();
    match err {
        CoreError::ShapeMismatch { expected, got } => {
            assert_eq!(expected.rows(), Some(8));
            assert_eq!(got.rows(), Some(4));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_display() {
    assert_eq!(Shape::counts(7).to_string(), "counts[7, 7]");
    assert_eq!(Shape::scalar(TypeId("total")).to_string(), "total[]");
}
