//! Exploring word vectors: similarity, nearest neighbours, analogies.
//!
//! # Example
//!
//! ```rust
//! use distributional_embed::neighbors::WordEmbeddings;
//! use distributional_embed::vocab::Vocabulary;
//!
//! let vocab = Vocabulary::from_words(["king", "queen", "apple"], None);
//! let mut vectors = vec![vec![0.0, 0.0]; vocab.size()];
//! vectors[vocab.id("king")] = vec![1.0, 0.1];
//! vectors[vocab.id("queen")] = vec![0.9, 0.2];
//! vectors[vocab.id("apple")] = vec![0.0, 1.0];
//!
//! let emb = WordEmbeddings::new(vocab, vectors).unwrap();
//! let nearest = emb.nearest("king", 1).unwrap();
//! assert_eq!(nearest[0].0, "queen");
//! ```

use std::collections::HashSet;

use distributional_core::{CoreError, Shape};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::vocab::{Vocabulary, END_ID, START_ID, UNK_ID};

/// Inner product of two vectors.
pub fn inner_product(v1: &[f64], v2: &[f64]) -> f64 {
    v1.iter().zip(v2.iter()).map(|(a, b)| a * b).sum()
}

/// Vector norm (L2).
pub fn norm(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

/// Normalize a vector to unit length; near-zero vectors are returned as is.
pub fn normalize(v: &[f64]) -> Vec<f64> {
    let n = norm(v);
    if n < 1e-10 {
        v.to_vec()
    } else {
        v.iter().map(|x| x / n).collect()
    }
}

/// Cosine similarity between two vectors (0 if either is near zero).
pub fn cosine_similarity(v1: &[f64], v2: &[f64]) -> f64 {
    let dot = inner_product(v1, v2);
    let n1 = norm(v1);
    let n2 = norm(v2);
    if n1 < 1e-10 || n2 < 1e-10 {
        0.0
    } else {
        dot / (n1 * n2)
    }
}

/// Word vectors addressed by word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordEmbeddings {
    vocab: Vocabulary,
    vectors: Vec<Vec<f64>>,
}

impl WordEmbeddings {
    /// Pair a vocabulary with one vector per id.
    ///
    /// # Errors
    ///
    /// Returns [`EmbedError::Shape`](crate::error::EmbedError::Shape) if the
    /// row count differs from the vocabulary size or rows have different
    /// lengths.
    pub fn new(vocab: Vocabulary, vectors: Vec<Vec<f64>>) -> Result<Self> {
        let dim = vectors.first().map_or(0, Vec::len);
        let got = Shape::vectors(vectors.len(), dim);
        got.expect(&Shape::vectors(vocab.size(), dim))?;
        if vectors.iter().any(|v| v.len() != dim) {
            return Err(CoreError::ValidationError {
                reason: "word vectors have different lengths".to_string(),
            }
            .into());
        }
        Ok(Self { vocab, vectors })
    }

    /// The vocabulary.
    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    /// All vectors in id order.
    pub fn vectors(&self) -> &[Vec<f64>] {
        &self.vectors
    }

    /// Vector length.
    pub fn dim(&self) -> usize {
        self.vectors.first().map_or(0, Vec::len)
    }

    /// Vector for `word`, if it has its own id.
    pub fn vector(&self, word: &str) -> Option<&[f64]> {
        if !self.vocab.contains(word) {
            return None;
        }
        self.vectors.get(self.vocab.id(word)).map(Vec::as_slice)
    }

    fn require(&self, word: &str) -> Result<&[f64]> {
        let id = self.vocab.require(word)?;
        Ok(&self.vectors[id])
    }

    /// Cosine similarity between two words.
    pub fn similarity(&self, a: &str, b: &str) -> Result<f64> {
        Ok(cosine_similarity(self.require(a)?, self.require(b)?))
    }

    /// The `k` words most similar to `query`'s vector, excluding `exclude`
    /// and the reserved tokens. Ties keep id order.
    fn rank(&self, query: &[f64], exclude: &HashSet<usize>, k: usize) -> Vec<(String, f64)> {
        let mut scored: Vec<(usize, f64)> = self
            .vectors
            .iter()
            .enumerate()
            .filter(|(id, _)| ![START_ID, END_ID, UNK_ID].contains(id) && !exclude.contains(id))
            .map(|(id, v)| (id, cosine_similarity(query, v)))
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        scored
            .into_iter()
            .take(k)
            .filter_map(|(id, s)| self.vocab.word(id).map(|w| (w.to_string(), s)))
            .collect()
    }

    /// The `k` nearest neighbours of `word` by cosine similarity.
    pub fn nearest(&self, word: &str, k: usize) -> Result<Vec<(String, f64)>> {
        let id = self.vocab.require(word)?;
        let exclude = HashSet::from([id]);
        Ok(self.rank(&self.vectors[id], &exclude, k))
    }

    /// Solve `a : b :: c : ?` by ranking words near `b - a + c`.
    ///
    /// The three input words are never returned.
    pub fn analogy(&self, a: &str, b: &str, c: &str, k: usize) -> Result<Vec<(String, f64)>> {
        let (va, vb, vc) = (
            normalize(self.require(a)?),
            normalize(self.require(b)?),
            normalize(self.require(c)?),
        );
        let target: Vec<f64> = va
            .iter()
            .zip(&vb)
            .zip(&vc)
            .map(|((x, y), z)| y - x + z)
            .collect();
        let exclude: HashSet<usize> = [a, b, c].iter().map(|w| self.vocab.id(w)).collect();
        Ok(self.rank(&target, &exclude, k))
    }

    /// Spearman correlation between cosine similarities and gold ratings.
    ///
    /// Pairs with a word outside the vocabulary are skipped and counted.
    pub fn evaluate_similarity(&self, pairs: &[(&str, &str, f64)]) -> SimilarityEvaluation {
        let mut predicted = Vec::new();
        let mut gold = Vec::new();
        let mut skipped = 0;

        for &(a, b, rating) in pairs {
            if let Ok(sim) = self.similarity(a, b) {
                predicted.push(sim);
                gold.push(rating);
            } else {
                skipped += 1;
            }
        }

        SimilarityEvaluation {
            correlation: spearman_correlation(&predicted, &gold),
            num_pairs: gold.len(),
            skipped,
        }
    }
}

/// Results from a word-similarity evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityEvaluation {
    /// Spearman ρ between predicted and gold similarity
    pub correlation: f64,
    /// Number of evaluated pairs
    pub num_pairs: usize,
    /// Pairs dropped because a word was out of vocabulary
    pub skipped: usize,
}

impl std::fmt::Display for SimilarityEvaluation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Word similarity ({} pairs, {} skipped):", self.num_pairs, self.skipped)?;
        writeln!(f, "  Spearman ρ = {:.4}", self.correlation)
    }
}

/// Compute Spearman rank correlation.
pub fn spearman_correlation(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.is_empty() {
        return 0.0;
    }

    let n = x.len() as f64;
    let rank_x = compute_ranks(x);
    let rank_y = compute_ranks(y);

    // Pearson correlation of ranks
    let mean_x = rank_x.iter().sum::<f64>() / n;
    let mean_y = rank_y.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (rx, ry) in rank_x.iter().zip(&rank_y) {
        let dx = rx - mean_x;
        let dy = ry - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x < 1e-10 || var_y < 1e-10 {
        0.0
    } else {
        cov / (var_x.sqrt() * var_y.sqrt())
    }
}

/// Ranks starting at 1; tied values share their average rank.
fn compute_ranks(values: &[f64]) -> Vec<f64> {
    let mut indexed: Vec<(usize, f64)> = values.iter().copied().enumerate().collect();
    indexed.sort_by(|a, b| a.1.total_cmp(&b.1));

    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < indexed.len() {
        let mut end = start;
        while end + 1 < indexed.len() && indexed[end + 1].1 == indexed[start].1 {
            end += 1;
        }
        let avg = (start + end) as f64 / 2.0 + 1.0;
        for item in &indexed[start..=end] {
            ranks[item.0] = avg;
        }
        start = end + 1;
    }
    ranks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EmbedError;

    fn toy() -> WordEmbeddings {
        let vocab = Vocabulary::from_words(["man", "woman", "king", "queen", "apple"], None);
        let mut vectors = vec![vec![0.0, 0.0, 0.0]; vocab.size()];
        vectors[vocab.id("man")] = vec![1.0, 0.0, 0.0];
        vectors[vocab.id("woman")] = vec![1.0, 1.0, 0.0];
        vectors[vocab.id("king")] = vec![1.0, 0.0, 1.0];
        vectors[vocab.id("queen")] = vec![1.0, 1.0, 1.0];
        vectors[vocab.id("apple")] = vec![0.0, 0.0, -1.0];
        WordEmbeddings::new(vocab, vectors).unwrap()
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-10);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-10);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_normalize_zero_vector_unchanged() {
        assert_eq!(normalize(&[0.0, 0.0]), vec![0.0, 0.0]);
        assert!((norm(&normalize(&[3.0, 4.0])) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_shape_checked() {
        let vocab = Vocabulary::from_words(["a"], None);
        assert!(matches!(
            WordEmbeddings::new(vocab.clone(), vec![vec![1.0]; 2]),
            Err(EmbedError::Shape(_))
        ));
        let mut ragged = vec![vec![1.0, 0.0]; vocab.size()];
        ragged[3] = vec![1.0];
        assert!(WordEmbeddings::new(vocab, ragged).is_err());
    }

    #[test]
    fn test_nearest_excludes_query_and_reserved() {
        let emb = toy();
        let nearest = emb.nearest("king", 10).unwrap();
        assert_eq!(nearest.len(), 4);
        assert!(nearest.iter().all(|(w, _)| w != "king" && !w.starts_with('<')));
        assert_eq!(nearest[0].0, "queen");
        assert_eq!(nearest.last().map(|(w, _)| w.as_str()), Some("apple"));
    }

    #[test]
    fn test_analogy() {
        // man : woman :: king : ?
        let emb = toy();
        let answer = emb.analogy("man", "woman", "king", 1).unwrap();
        assert_eq!(answer[0].0, "queen");
    }

    #[test]
    fn test_unknown_word() {
        let emb = toy();
        assert!(emb.vector("pear").is_none());
        assert!(matches!(emb.similarity("pear", "apple"), Err(EmbedError::UnknownWord { .. })));
    }

    #[test]
    fn test_spearman_correlation() {
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        assert!((spearman_correlation(&x, &[2.0, 4.0, 6.0, 8.0, 10.0]) - 1.0).abs() < 1e-10);
        assert!((spearman_correlation(&x, &[5.0, 4.0, 3.0, 2.0, 1.0]) + 1.0).abs() < 1e-10);
        assert_eq!(spearman_correlation(&x, &[1.0]), 0.0);
    }

    #[test]
    fn test_ties_share_rank() {
        assert_eq!(compute_ranks(&[3.0, 1.0, 3.0]), vec![2.5, 1.0, 2.5]);
    }

    #[test]
    fn test_evaluate_similarity_skips_oov() {
        let emb = toy();
        let eval = emb.evaluate_similarity(&[
            ("king", "queen", 9.0),
            ("man", "woman", 7.0),
            ("king", "apple", 1.0),
            ("king", "pear", 5.0),
        ]);
        assert_eq!(eval.num_pairs, 3);
        assert_eq!(eval.skipped, 1);
        assert!(eval.correlation > 0.0);
        assert!(eval.to_string().contains("3 pairs"));
    }
}
