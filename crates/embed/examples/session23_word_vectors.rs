//! Session 23: Word Vectors by Truncated SVD
//!
//! Run with: cargo run -p distributional-embed --example session23_word_vectors
//!
//! This example runs the whole pipeline and explores the result:
//! - Configuration from JSON
//! - Traced stages: counts → PPMI → projection
//! - Explained variance per component
//! - Nearest neighbours, analogies and a small similarity benchmark
//! - Export for the embedding projector

use distributional_embed::export::{write_json, write_projector_files};
use distributional_embed::{EmbedError, EmbeddingConfig, EmbeddingPipeline};
use tracing_subscriber::EnvFilter;

fn corpus() -> Vec<Vec<&'static str>> {
    [
        "the king rules the kingdom",
        "the queen rules the kingdom",
        "a man walks in the city",
        "a woman walks in the city",
        "the king is a man",
        "the queen is a woman",
        "the prince is a young man",
        "the princess is a young woman",
        "a dog runs in the park",
        "a cat sleeps in the house",
        "the dog chases the cat",
        "the cat ignores the dog",
    ]
    .iter()
    .map(|s| s.split_whitespace().collect())
    .collect()
}

fn main() -> Result<(), EmbedError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== Session 23: Word Vectors ===\n");

    // -------------------------------------------------------------------------
    // 1. Running the pipeline
    // -------------------------------------------------------------------------
    println!("1. Pipeline");
    println!("-----------\n");

    let config = EmbeddingConfig::from_json_str(r#"{ "window": 2, "dim": 5, "seed": 7 }"#)?;
    println!("  Config: {:?}\n", config);

    let pipeline = EmbeddingPipeline::new(config);
    let (vocab, output) = pipeline.run_sentences(&corpus(), None)?;

    println!("  Vocabulary size: {}", vocab.size());
    println!("  Counts nnz: {}, PPMI nnz: {}\n", output.counts.nnz(), output.ppmi.nnz());
    println!("  Trace:\n{}", output.trace);

    // -------------------------------------------------------------------------
    // 2. Explained variance
    // -------------------------------------------------------------------------
    println!("2. Explained variance");
    println!("---------------------\n");

    let projection = &output.projection;
    let cumulative = projection.cumulative_explained_variance();
    for (c, sigma) in projection.singular_values.iter().enumerate() {
        println!(
            "  component {}: σ = {:.4}, ratio = {:.4}, cumulative = {:.4}",
            c, sigma, projection.explained_variance_ratio[c], cumulative[c]
        );
    }
    println!("  Zero rows: {:?}\n", projection.zero_rows);

    // -------------------------------------------------------------------------
    // 3. Exploring the space
    // -------------------------------------------------------------------------
    println!("3. Neighbours and analogies");
    println!("---------------------------\n");

    let embeddings = output.clone().into_embeddings(vocab.clone())?;
    for word in ["king", "dog", "walks"] {
        let nearest = embeddings.nearest(word, 3)?;
        let shown: Vec<String> = nearest.iter().map(|(w, s)| format!("{} ({:.3})", w, s)).collect();
        println!("  {:<6} → {}", word, shown.join(", "));
    }
    println!();

    let answer = embeddings.analogy("man", "woman", "king", 3)?;
    println!("  man : woman :: king : {:?}\n", answer);

    let eval = embeddings.evaluate_similarity(&[
        ("king", "queen", 9.0),
        ("man", "woman", 8.0),
        ("dog", "cat", 7.5),
        ("king", "dog", 1.0),
        ("queen", "park", 0.5),
        ("emperor", "king", 9.0),
    ]);
    println!("{}", eval);

    // -------------------------------------------------------------------------
    // 4. Export
    // -------------------------------------------------------------------------
    println!("4. Export");
    println!("---------\n");

    let dir = std::env::temp_dir().join("session23_word_vectors");
    let (vectors, metadata) = write_projector_files(&dir, &vocab, projection)?;
    write_json(dir.join("embeddings.json"), &embeddings)?;
    println!("  {}", vectors.display());
    println!("  {}", metadata.display());
    println!("  {}", dir.join("embeddings.json").display());

    Ok(())
}
