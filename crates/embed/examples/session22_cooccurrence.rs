//! Session 22: Co-occurrence Counts and PPMI
//!
//! Run with: cargo run -p distributional-embed --example session22_cooccurrence
//!
//! Set `RUST_LOG=debug` to see per-stage sizes.
//!
//! This example walks through the sparse half of the pipeline:
//! - Building a vocabulary with reserved `<s>`, `</s>`, `<unk>` tokens
//! - Counting neighbours within a window, in both directions
//! - Reweighting counts by positive pointwise mutual information

use distributional_embed::ppmi::pmi_score;
use distributional_embed::{cooccurrence_matrix, ppmi, EmbedError, SparseMatrix, Vocabulary};
use tracing_subscriber::EnvFilter;

fn print_matrix(vocab: &Vocabulary, m: &SparseMatrix) {
    print!("{:>10}", "");
    for w in vocab.words() {
        print!("{:>8}", w);
    }
    println!();
    for (i, row) in m.to_dense().iter().enumerate() {
        print!("{:>10}", vocab.word(i).unwrap_or("?"));
        for x in row {
            print!("{:>8.2}", x);
        }
        println!();
    }
    println!();
}

fn main() -> Result<(), EmbedError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== Session 22: Co-occurrence and PPMI ===\n");

    // -------------------------------------------------------------------------
    // 1. Vocabulary
    // -------------------------------------------------------------------------
    println!("1. Vocabulary");
    println!("-------------\n");

    let sentences = vec![
        vec!["nlp", "class", "is", "awesome"],
        vec!["nlp", "class", "is", "fun"],
    ];
    let vocab = Vocabulary::from_sentences(&sentences, None);
    let tokens = vocab.encode_corpus(&sentences);

    for (id, word) in vocab.words().iter().enumerate() {
        println!("  {:>2} → {:<8} (seen {} times)", id, word, vocab.count(id));
    }
    println!("\n  Token stream: {:?}\n", vocab.ids_to_words(&tokens));

    // -------------------------------------------------------------------------
    // 2. Counts
    // -------------------------------------------------------------------------
    println!("2. Co-occurrence counts (K = 1)");
    println!("-------------------------------\n");

    let counts = cooccurrence_matrix(&tokens, vocab.size(), 1)?;
    print_matrix(&vocab, &counts);
    println!("  Symmetric: {}", counts.is_symmetric(0.0));
    println!("  Stored entries: {} of {}\n", counts.nnz(), vocab.size() * vocab.size());

    let wide = cooccurrence_matrix(&tokens, vocab.size(), 2)?;
    println!("  With K = 2 the total mass grows from {} to {}\n", counts.sum(), wide.sum());

    // -------------------------------------------------------------------------
    // 3. PPMI
    // -------------------------------------------------------------------------
    println!("3. PPMI weighting");
    println!("-----------------\n");

    let weighted = ppmi(&counts);
    print_matrix(&vocab, &weighted);

    let (nlp, class) = (vocab.id("nlp"), vocab.id("class"));
    let rows = counts.row_sums();
    let cols = counts.col_sums();
    println!(
        "  PMI(nlp, class) = log({} · {} / ({} · {})) = {:.4}",
        counts.get(nlp, class),
        counts.sum(),
        rows[nlp],
        cols[class],
        pmi_score(counts.get(nlp, class), counts.sum(), rows[nlp], cols[class])
    );

    let awesome: Vec<_> = weighted.row(vocab.id("awesome")).collect();
    let fun: Vec<_> = weighted.row(vocab.id("fun")).collect();
    println!("  PPMI rows of 'awesome' and 'fun' identical: {}", awesome == fun);

    Ok(())
}
