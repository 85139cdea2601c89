//! # Error Types
//!
//! A pipeline is a chain of stages, and chaining is only defined when the
//! output of one stage is a valid input to the next. A shape mismatch is
//! therefore not a numerical accident: it is an undefined composition, and
//! it is reported as one.

use thiserror::Error;

use crate::shape::Shape;

/// Core errors for distributional pipelines.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    /// Shapes don't match at a stage boundary.
    #[error("Shape mismatch: expected {expected}, got {got}")]
    ShapeMismatch { expected: Shape, got: Shape },

    /// A stage rejected its input before doing any work.
    #[error("Validation failed: {reason}")]
    ValidationError { reason: String },
}
