//! The full tokens → counts → PPMI → vectors pipeline.
//!
//! ```rust
//! use distributional_embed::config::EmbeddingConfig;
//! use distributional_embed::pipeline::EmbeddingPipeline;
//! use distributional_embed::vocab::Vocabulary;
//!
//! let sentences = vec![vec!["nlp", "class", "is", "awesome"], vec!["nlp", "class", "is", "fun"]];
//! let vocab = Vocabulary::from_sentences(&sentences, None);
//! let tokens = vocab.encode_corpus(&sentences);
//!
//! let pipeline = EmbeddingPipeline::new(EmbeddingConfig::default().with_dim(3));
//! let output = pipeline.run(&tokens, vocab.size()).unwrap();
//! assert_eq!(output.projection.shape().dims, vec![vocab.size(), 3]);
//! assert_eq!(output.trace.children.len(), 3);
//! ```

use std::time::Instant;

use distributional_core::{Stage, StageExt, Then, TraceNode};
use tracing::info;

use crate::config::EmbeddingConfig;
use crate::cooccur::CooccurrenceBuilder;
use crate::error::Result;
use crate::neighbors::WordEmbeddings;
use crate::ppmi::PpmiTransform;
use crate::project::{Project, Projection};
use crate::sparse::SparseMatrix;
use crate::vocab::Vocabulary;

/// The three stages chained into one.
pub type EmbeddingChain = Then<Then<CooccurrenceBuilder, PpmiTransform>, Project>;

/// Every intermediate artifact of one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Symmetric co-occurrence counts.
    pub counts: SparseMatrix,
    /// PPMI-weighted counts.
    pub ppmi: SparseMatrix,
    /// Unit-normalized vectors and variance diagnostics.
    pub projection: Projection,
    /// Timing of each stage.
    pub trace: TraceNode,
}

impl PipelineOutput {
    /// Attach words to the vectors.
    pub fn into_embeddings(self, vocab: Vocabulary) -> Result<WordEmbeddings> {
        WordEmbeddings::new(vocab, self.projection.vectors)
    }
}

/// Runs the stages with a fixed configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmbeddingPipeline {
    config: EmbeddingConfig,
}

impl EmbeddingPipeline {
    /// Create a pipeline.
    pub fn new(config: EmbeddingConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    pub fn config(&self) -> &EmbeddingConfig {
        &self.config
    }

    /// The stages as a single chain for a vocabulary of `vocab_size`.
    ///
    /// Useful when only the final vectors are needed.
    pub fn chain(&self, vocab_size: usize) -> EmbeddingChain {
        CooccurrenceBuilder::new(vocab_size, self.config.window)
            .then(PpmiTransform)
            .then(self.config.projector().into_stage(self.config.dim))
    }

    /// Run every stage on `tokens`, keeping intermediates.
    pub fn run(&self, tokens: &[usize], vocab_size: usize) -> Result<PipelineOutput> {
        self.config.validate()?;
        info!(
            tokens = tokens.len(),
            vocab_size,
            window = self.config.window,
            dim = self.config.dim,
            "running embedding pipeline"
        );
        let start = Instant::now();

        let (counts, count_trace) = CooccurrenceBuilder::new(vocab_size, self.config.window)
            .traced()
            .run(tokens)?;
        let (ppmi, ppmi_trace) = PpmiTransform.traced().run(&counts)?;
        let (projection, project_trace) = self
            .config
            .projector()
            .into_stage(self.config.dim)
            .traced()
            .run(&ppmi)?;

        let trace = TraceNode::new("embedding_pipeline", start.elapsed()).with_children(vec![
            count_trace,
            ppmi_trace,
            project_trace,
        ]);
        info!(
            elapsed_ms = trace.duration.as_millis() as u64,
            counts_nnz = counts.nnz(),
            ppmi_nnz = ppmi.nnz(),
            zero_rows = projection.zero_rows.len(),
            "embedding pipeline finished"
        );

        Ok(PipelineOutput {
            counts,
            ppmi,
            projection,
            trace,
        })
    }

    /// Build a vocabulary from `sentences`, encode them and run.
    pub fn run_sentences<S: AsRef<str>>(
        &self,
        sentences: &[Vec<S>],
        max_vocab: Option<usize>,
    ) -> Result<(Vocabulary, PipelineOutput)> {
        let vocab = Vocabulary::from_sentences(sentences, max_vocab);
        let tokens = vocab.encode_corpus(sentences);
        let output = self.run(&tokens, vocab.size())?;
        Ok((vocab, output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EmbedError;

    fn corpus() -> Vec<Vec<&'static str>> {
        vec![
            vec!["the", "cat", "sat", "on", "the", "mat"],
            vec!["the", "dog", "sat", "on", "the", "rug"],
            vec!["a", "cat", "chased", "a", "dog"],
        ]
    }

    #[test]
    fn test_trace_has_one_child_per_stage() {
        let pipeline = EmbeddingPipeline::new(EmbeddingConfig::default().with_dim(4));
        let (_, out) = pipeline.run_sentences(&corpus(), None).unwrap();
        let names: Vec<_> = out.trace.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["cooccurrence", "ppmi", "project"]);
    }

    #[test]
    fn test_chain_matches_run() {
        let pipeline = EmbeddingPipeline::new(EmbeddingConfig::default().with_dim(3).with_window(2));
        let (vocab, out) = pipeline.run_sentences(&corpus(), None).unwrap();
        let tokens = vocab.encode_corpus(&corpus());
        let chained = pipeline.chain(vocab.size()).run(&tokens).unwrap();
        assert_eq!(chained, out.projection);
    }

    #[test]
    fn test_invalid_config_rejected_before_work() {
        let pipeline = EmbeddingPipeline::new(EmbeddingConfig::default().with_window(0));
        assert!(matches!(pipeline.run(&[0, 1], 2), Err(EmbedError::Config(_))));
    }

    #[test]
    fn test_dim_larger_than_vocab_rejected() {
        let pipeline = EmbeddingPipeline::new(EmbeddingConfig::default().with_dim(100));
        assert!(matches!(
            pipeline.run_sentences(&corpus(), None),
            Err(EmbedError::InvalidParameter { name: "dim", .. })
        ));
    }

    #[test]
    fn test_out_of_range_token_propagates() {
        let pipeline = EmbeddingPipeline::new(EmbeddingConfig::default().with_dim(1));
        assert!(matches!(
            pipeline.run(&[0, 5], 3),
            Err(EmbedError::TokenOutOfRange { token: 5, .. })
        ));
    }

    #[test]
    fn test_into_embeddings() {
        let pipeline = EmbeddingPipeline::new(EmbeddingConfig::default().with_dim(4));
        let (vocab, out) = pipeline.run_sentences(&corpus(), None).unwrap();
        let emb = out.into_embeddings(vocab).unwrap();
        assert!(emb.vector("cat").is_some());
        assert_eq!(emb.dim(), 4);
    }
}
