//! # Shapes - Types as Objects
//!
//! Every artifact that flows through a distributional pipeline has a shape:
//! a token stream is a vector of ids, a co-occurrence matrix is `V × V`,
//! an embedding table is `V × d`. Stages check shapes at their boundaries
//! so that a mismatch surfaces as a [`CoreError::ShapeMismatch`] instead of
//! an out-of-bounds panic deep inside a numerical loop.
//!
//! We use runtime shape checking (`Vec<usize>`) because vocabulary size and
//! target dimensionality are only known once a corpus has been read.

use std::fmt;

use crate::CoreError;

/// A type identifier for distinguishing different kinds of data.
///
/// Examples: "token_ids", "counts", "ppmi", "vectors"
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeId(pub &'static str);

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A shape describes the dimensions of a matrix or sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shape {
    /// The kind of data
    pub ty: TypeId,
    /// Dimension sizes (empty = scalar, [n] = vector, [m,n] = matrix)
    pub dims: Vec<usize>,
}

impl Shape {
    /// Create a new shape with given type and dimensions.
    pub fn new(ty: TypeId, dims: Vec<usize>) -> Self {
        Self { ty, dims }
    }

    /// Create a scalar shape (0-dimensional).
    pub fn scalar(ty: TypeId) -> Self {
        Self { ty, dims: vec![] }
    }

    /// Create a vector shape (1-dimensional).
    pub fn vector(ty: TypeId, len: usize) -> Self {
        Self {
            ty,
            dims: vec![len],
        }
    }

    /// Create a matrix shape (2-dimensional).
    pub fn matrix(ty: TypeId, rows: usize, cols: usize) -> Self {
        Self {
            ty,
            dims: vec![rows, cols],
        }
    }

    /// A stream of `len` vocabulary ids.
    pub fn token_stream(len: usize) -> Self {
        Self::vector(TypeId("token_ids"), len)
    }

    /// A `V × V` word-word count matrix.
    pub fn counts(vocab_size: usize) -> Self {
        Self::matrix(TypeId("counts"), vocab_size, vocab_size)
    }

    /// A `V × V` association-score matrix (e.g. PPMI).
    pub fn scores(vocab_size: usize) -> Self {
        Self::matrix(TypeId("scores"), vocab_size, vocab_size)
    }

    /// A `V × d` table of dense word vectors.
    pub fn vectors(vocab_size: usize, dim: usize) -> Self {
        Self::matrix(TypeId("vectors"), vocab_size, dim)
    }

    /// Number of dimensions (rank).
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Total number of elements.
    pub fn numel(&self) -> usize {
        self.dims.iter().product()
    }

    /// Number of rows, for shapes of rank ≥ 1.
    pub fn rows(&self) -> Option<usize> {
        self.dims.first().copied()
    }

    /// Number of columns, for matrices.
    pub fn cols(&self) -> Option<usize> {
        if self.rank() == 2 {
            Some(self.dims[1])
        } else {
            None
        }
    }

    /// True for matrices with as many rows as columns.
    pub fn is_square(&self) -> bool {
        self.rank() == 2 && self.dims[0] == self.dims[1]
    }

    /// Check if this shape is compatible with another for composition.
    pub fn is_compatible(&self, other: &Shape) -> bool {
        self == other
    }

    /// Fail with [`CoreError::ShapeMismatch`] unless `self` equals `expected`.
    pub fn expect(&self, expected: &Shape) -> Result<(), CoreError> {
        if self.is_compatible(expected) {
            Ok(())
        } else {
            Err(CoreError::ShapeMismatch {
                expected: expected.clone(),
                got: self.clone(),
            })
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.dims.is_empty() {
            write!(f, "{}[]", self.ty)
        } else {
            write!(
                f,
                "{}[{}]",
                self.ty,
                self.dims
                    .iter()
                    .map(|d| d.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        }
    }
}
