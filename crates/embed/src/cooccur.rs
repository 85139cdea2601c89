//! Word-word co-occurrence counts within a fixed window.
//!
//! For every offset `k` in `1..=K`, each pair of positions `(ℓ, ℓ+k)`
//! contributes two directed counts:
//!
//! ```text
//! forward:   C[token[ℓ],   token[ℓ+k]] += 1
//! backward:  C[token[ℓ+k], token[ℓ]  ] += 1
//! ```
//!
//! The two passes are built as separate sparse matrices and summed, so the
//! result is symmetric because both directions were counted, not because
//! the matrix was mirrored afterwards.
//!
//! # Example
//!
//! ```rust
//! use distributional_embed::cooccur::cooccurrence_matrix;
//!
//! // "a b a" with window 1
//! let c = cooccurrence_matrix(&[0, 1, 0], 2, 1).unwrap();
//! assert_eq!(c.get(0, 1), 2.0);
//! assert_eq!(c.get(1, 0), 2.0);
//! assert_eq!(c.get(0, 0), 0.0);
//! ```

use distributional_core::{Shape, Stage};
use tracing::debug;

use crate::error::{EmbedError, Result};
use crate::sparse::SparseMatrix;

/// Which way a directed pass reads a position pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// `(token[ℓ], token[ℓ+k])`
    Forward,
    /// `(token[ℓ+k], token[ℓ])`
    Backward,
}

/// Fail fast on the first token outside `[0, vocab_size)`.
pub fn validate_tokens(tokens: &[usize], vocab_size: usize) -> Result<()> {
    match tokens.iter().position(|&t| t >= vocab_size) {
        Some(position) => Err(EmbedError::TokenOutOfRange {
            position,
            token: tokens[position],
            vocab_size,
        }),
        None => Ok(()),
    }
}

/// Unit counts for every position pair at distance `offset`, read in one
/// direction. Tokens must already be validated.
pub fn directed_pass(
    tokens: &[usize],
    vocab_size: usize,
    offset: usize,
    direction: Direction,
) -> Result<SparseMatrix> {
    let pairs = tokens.iter().zip(tokens.iter().skip(offset));
    let triplets = pairs.map(|(&left, &right)| match direction {
        Direction::Forward => (left, right, 1.0),
        Direction::Backward => (right, left, 1.0),
    });
    Ok(SparseMatrix::from_triplets(vocab_size, vocab_size, triplets)?)
}

/// Build the symmetric `V × V` co-occurrence matrix of `tokens`.
///
/// # Errors
///
/// - [`EmbedError::InvalidParameter`] if `window == 0` or `vocab_size == 0`
/// - [`EmbedError::TokenOutOfRange`] if any token is `>= vocab_size`
pub fn cooccurrence_matrix(tokens: &[usize], vocab_size: usize, window: usize) -> Result<SparseMatrix> {
    if window == 0 {
        return Err(EmbedError::InvalidParameter {
            name: "window",
            value: window,
            reason: "must be at least 1".to_string(),
        });
    }
    if vocab_size == 0 {
        return Err(EmbedError::InvalidParameter {
            name: "vocab_size",
            value: vocab_size,
            reason: "vocabulary must not be empty".to_string(),
        });
    }
    validate_tokens(tokens, vocab_size)?;

    let mut counts = SparseMatrix::zeros(vocab_size, vocab_size);
    for k in 1..=window {
        let forward = directed_pass(tokens, vocab_size, k, Direction::Forward)?;
        let backward = directed_pass(tokens, vocab_size, k, Direction::Backward)?;
        counts = counts.add(&forward)?.add(&backward)?;
    }

    debug!(
        input = %Shape::token_stream(tokens.len()),
        output = %Shape::counts(vocab_size),
        window,
        nnz = counts.nnz(),
        "built co-occurrence matrix"
    );
    Ok(counts)
}

/// Pipeline stage wrapping [`cooccurrence_matrix`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooccurrenceBuilder {
    vocab_size: usize,
    window: usize,
}

impl CooccurrenceBuilder {
    /// Create a builder for a vocabulary of `vocab_size` and window `K`.
    pub fn new(vocab_size: usize, window: usize) -> Self {
        Self { vocab_size, window }
    }

    /// Vocabulary size this builder indexes into.
    pub fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    /// Window radius `K`.
    pub fn window(&self) -> usize {
        self.window
    }

    /// Build counts for `tokens`.
    pub fn build(&self, tokens: &[usize]) -> Result<SparseMatrix> {
        cooccurrence_matrix(tokens, self.vocab_size, self.window)
    }

    /// Shape of the matrix this builder produces.
    pub fn output_shape(&self) -> Shape {
        Shape::counts(self.vocab_size)
    }
}

impl Stage for CooccurrenceBuilder {
    type Input = [usize];
    type Output = SparseMatrix;
    type Error = EmbedError;

    fn run(&self, input: &[usize]) -> Result<SparseMatrix> {
        self.build(input)
    }

    fn name(&self) -> &'static str {
        "cooccurrence"
    }
}
