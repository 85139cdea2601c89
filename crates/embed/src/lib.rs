//! # Embed - Word Vectors from Co-occurrence Counts
//!
//! This crate turns a stream of token ids into dense word vectors in three
//! stages:
//!
//! - **Co-occurrence**: symmetric counts of words appearing within `K`
//!   positions of each other
//! - **PPMI**: counts reweighted by positive pointwise mutual information
//! - **Projection**: a seeded truncated SVD, rows normalized to unit length
//!
//! Each stage implements [`distributional_core::Stage`], so they chain and
//! trace like any other.
//!
//! ## Example: two short sentences
//!
//! ```rust
//! use distributional_embed::{EmbeddingConfig, EmbeddingPipeline};
//!
//! let sentences = vec![
//!     vec!["nlp", "class", "is", "awesome"],
//!     vec!["nlp", "class", "is", "fun"],
//! ];
//! let pipeline = EmbeddingPipeline::new(EmbeddingConfig::default().with_dim(2));
//! let (vocab, output) = pipeline.run_sentences(&sentences, None).unwrap();
//!
//! // "awesome" and "fun" appear in identical contexts
//! let awesome = output.projection.row(vocab.id("awesome")).unwrap();
//! let fun = output.projection.row(vocab.id("fun")).unwrap();
//! assert!(awesome.iter().zip(fun).all(|(a, b)| (a - b).abs() < 1e-9));
//!
//! println!("{}", output.trace);
//! ```

pub mod config;
pub mod cooccur;
pub mod error;
pub mod export;
pub mod neighbors;
pub mod pipeline;
pub mod ppmi;
pub mod project;
pub mod sparse;
pub mod vocab;

pub use config::EmbeddingConfig;
pub use cooccur::{cooccurrence_matrix, CooccurrenceBuilder};
pub use error::{EmbedError, Result};
pub use export::{read_json, write_json, write_projector_files};
pub use neighbors::{cosine_similarity, spearman_correlation, SimilarityEvaluation, WordEmbeddings};
pub use pipeline::{EmbeddingChain, EmbeddingPipeline, PipelineOutput};
pub use ppmi::{ppmi, PpmiTransform};
pub use project::{LowRankProjector, Project, Projection};
pub use sparse::SparseMatrix;
pub use vocab::Vocabulary;
