//! Error types for embedding construction.

use distributional_core::CoreError;
use thiserror::Error;

/// Errors that can occur while building word vectors.
#[derive(Debug, Error)]
pub enum EmbedError {
    /// A token id does not index into the vocabulary.
    #[error("Token {token} at position {position} is out of range for vocabulary of size {vocab_size}")]
    TokenOutOfRange {
        position: usize,
        token: usize,
        vocab_size: usize,
    },

    /// A numeric parameter is outside its valid range.
    #[error("Invalid {name} = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: usize,
        reason: String,
    },

    /// Matrix or vector shapes don't line up.
    #[error(transparent)]
    Shape(#[from] CoreError),

    /// Word not found in the vocabulary.
    #[error("Unknown word: '{word}'")]
    UnknownWord { word: String },

    /// Configuration rejected by validation.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Reading or writing export files failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EmbedError>;
