//! Pipeline configuration.
//!
//! Every field has a default, so a JSON document only needs to name what it
//! changes:
//!
//! ```rust
//! use distributional_embed::config::EmbeddingConfig;
//!
//! let config = EmbeddingConfig::from_json_str(r#"{ "window": 2, "dim": 50 }"#).unwrap();
//! assert_eq!(config.window, 2);
//! assert_eq!(config.seed, 42);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{EmbedError, Result};
use crate::project::LowRankProjector;

fn default_window() -> usize {
    1
}

fn default_dim() -> usize {
    25
}

fn default_seed() -> u64 {
    42
}

fn default_oversamples() -> usize {
    10
}

fn default_iterations() -> usize {
    5
}

/// Parameters for counting, weighting and projecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Co-occurrence window radius `K`.
    #[serde(default = "default_window")]
    pub window: usize,
    /// Output dimensionality `d`.
    #[serde(default = "default_dim")]
    pub dim: usize,
    /// Seed for the randomized SVD.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Extra columns sampled by the SVD range finder.
    #[serde(default = "default_oversamples")]
    pub n_oversamples: usize,
    /// Subspace iterations in the SVD.
    #[serde(default = "default_iterations")]
    pub n_iter: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            window: default_window(),
            dim: default_dim(),
            seed: default_seed(),
            n_oversamples: default_oversamples(),
            n_iter: default_iterations(),
        }
    }
}

impl EmbeddingConfig {
    /// Parse from JSON and validate.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the window radius.
    #[must_use]
    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    /// Set the output dimensionality.
    #[must_use]
    pub fn with_dim(mut self, dim: usize) -> Self {
        self.dim = dim;
        self
    }

    /// Set the SVD seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Check parameters that don't depend on the corpus.
    ///
    /// `dim ≤ V` can only be checked once the vocabulary is known; the
    /// projector does that.
    pub fn validate(&self) -> Result<()> {
        if self.window == 0 {
            return Err(EmbedError::Config("window must be greater than 0".to_string()));
        }
        if self.dim == 0 {
            return Err(EmbedError::Config("dim must be greater than 0".to_string()));
        }
        Ok(())
    }

    /// The projector these settings describe.
    pub fn projector(&self) -> LowRankProjector {
        LowRankProjector::new(self.seed)
            .with_oversamples(self.n_oversamples)
            .with_iterations(self.n_iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = EmbeddingConfig::default();
        assert_eq!(c.window, 1);
        assert_eq!(c.dim, 25);
        assert!(c.validate().is_ok());
        assert_eq!(c.projector(), LowRankProjector::default());
    }

    #[test]
    fn test_empty_json_is_default() {
        assert_eq!(
            EmbeddingConfig::from_json_str("{}").unwrap(),
            EmbeddingConfig::default()
        );
    }

    #[test]
    fn test_zero_window_rejected() {
        let err = EmbeddingConfig::from_json_str(r#"{ "window": 0 }"#).unwrap_err();
        assert!(matches!(err, EmbedError::Config(_)));
    }

    #[test]
    fn test_zero_dim_rejected() {
        assert!(EmbeddingConfig::default().with_dim(0).validate().is_err());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            EmbeddingConfig::from_json_str("{ window: }"),
            Err(EmbedError::Json(_))
        ));
    }

    #[test]
    fn test_builders_reach_projector() {
        let c = EmbeddingConfig::default().with_seed(7).with_window(2);
        assert_eq!(c.projector().seed, 7);
        assert_eq!(c.window, 2);
    }
}
