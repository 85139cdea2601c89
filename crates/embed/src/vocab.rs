//! Vocabulary: a bijection between words and dense integer ids.
//!
//! Ids `0..3` are reserved for the sentence markers and the unknown-word
//! token; real words follow in order of descending corpus frequency.
//!
//! ```rust
//! use distributional_embed::vocab::Vocabulary;
//!
//! let vocab = Vocabulary::from_sentences(&[vec!["nlp", "is", "fun"]], None);
//! assert_eq!(vocab.size(), 6);
//! assert_eq!(vocab.sentence_to_ids(&["nlp", "rocks"]), vec![0, vocab.id("nlp"), 2, 1]);
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{EmbedError, Result};

/// Sentence start marker.
pub const START_TOKEN: &str = "<s>";
/// Sentence end marker.
pub const END_TOKEN: &str = "</s>";
/// Out-of-vocabulary token.
pub const UNK_TOKEN: &str = "<unk>";

/// Id of [`START_TOKEN`].
pub const START_ID: usize = 0;
/// Id of [`END_TOKEN`].
pub const END_ID: usize = 1;
/// Id of [`UNK_TOKEN`].
pub const UNK_ID: usize = 2;

/// Word ↔ id mapping with contiguous ids `0..size`.
///
/// Only the id-ordered words and counts are serialized; the lookup index is
/// rebuilt on deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredVocabulary")]
pub struct Vocabulary {
    id_to_word: Vec<String>,
    #[serde(skip)]
    word_to_id: HashMap<String, usize>,
    counts: Vec<usize>,
}

#[derive(Deserialize)]
struct StoredVocabulary {
    id_to_word: Vec<String>,
    counts: Vec<usize>,
}

impl From<StoredVocabulary> for Vocabulary {
    fn from(stored: StoredVocabulary) -> Self {
        Self::from_parts(stored.id_to_word, stored.counts)
    }
}

impl Vocabulary {
    /// Build from a flat stream of words.
    ///
    /// Words are ranked by frequency (ties alphabetical). `max_size`, if
    /// given, caps the total size including the three reserved tokens;
    /// words that don't fit map to `<unk>`. The reserved tokens are always
    /// present, so a cap below 3 still yields a vocabulary of size 3.
    pub fn from_words<'a, I>(words: I, max_size: Option<usize>) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut freq: HashMap<&str, usize> = HashMap::new();
        for w in words {
            if w == START_TOKEN || w == END_TOKEN || w == UNK_TOKEN {
                continue;
            }
            *freq.entry(w).or_insert(0) += 1;
        }

        let mut ranked: Vec<(&str, usize)> = freq.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        if let Some(cap) = max_size {
            ranked.truncate(cap.saturating_sub(3));
        }

        let mut id_to_word = vec![
            START_TOKEN.to_string(),
            END_TOKEN.to_string(),
            UNK_TOKEN.to_string(),
        ];
        let mut counts = vec![0, 0, 0];
        for (w, c) in ranked {
            id_to_word.push(w.to_string());
            counts.push(c);
        }

        Self::from_parts(id_to_word, counts)
    }

    /// Build from tokenized sentences.
    pub fn from_sentences<S: AsRef<str>>(sentences: &[Vec<S>], max_size: Option<usize>) -> Self {
        Self::from_words(
            sentences.iter().flat_map(|s| s.iter().map(AsRef::<str>::as_ref)),
            max_size,
        )
    }

    fn from_parts(id_to_word: Vec<String>, counts: Vec<usize>) -> Self {
        let word_to_id = id_to_word
            .iter()
            .enumerate()
            .map(|(i, w)| (w.clone(), i))
            .collect();
        Self {
            id_to_word,
            word_to_id,
            counts,
        }
    }

    /// Number of entries, including reserved tokens.
    pub fn size(&self) -> usize {
        self.id_to_word.len()
    }

    /// Id of `word`, or [`UNK_ID`] if unknown.
    pub fn id(&self, word: &str) -> usize {
        self.word_to_id.get(word).copied().unwrap_or(UNK_ID)
    }

    /// Id of `word`, failing if it is not in the vocabulary.
    pub fn require(&self, word: &str) -> Result<usize> {
        self.word_to_id
            .get(word)
            .copied()
            .ok_or_else(|| EmbedError::UnknownWord {
                word: word.to_string(),
            })
    }

    /// Word for `id`, if in range.
    pub fn word(&self, id: usize) -> Option<&str> {
        self.id_to_word.get(id).map(String::as_str)
    }

    /// All words in id order.
    pub fn words(&self) -> &[String] {
        &self.id_to_word
    }

    /// Corpus frequency of `id` (zero for reserved tokens).
    pub fn count(&self, id: usize) -> usize {
        self.counts.get(id).copied().unwrap_or(0)
    }

    /// True if `word` has its own id.
    pub fn contains(&self, word: &str) -> bool {
        self.word_to_id.contains_key(word)
    }

    /// Map words to ids; unknown words become [`UNK_ID`].
    pub fn words_to_ids<S: AsRef<str>>(&self, words: &[S]) -> Vec<usize> {
        words.iter().map(|w| self.id(w.as_ref())).collect()
    }

    /// Map ids back to words; out-of-range ids become `<unk>`.
    pub fn ids_to_words(&self, ids: &[usize]) -> Vec<&str> {
        ids.iter()
            .map(|&i| self.word(i).unwrap_or(UNK_TOKEN))
            .collect()
    }

    /// Ids for one sentence wrapped in `<s>` … `</s>`.
    pub fn sentence_to_ids<S: AsRef<str>>(&self, words: &[S]) -> Vec<usize> {
        let mut ids = Vec::with_capacity(words.len() + 2);
        ids.push(START_ID);
        ids.extend(self.words_to_ids(words));
        ids.push(END_ID);
        ids
    }

    /// Concatenate every sentence (with markers) into one token stream.
    pub fn encode_corpus<S: AsRef<str>>(&self, sentences: &[Vec<S>]) -> Vec<usize> {
        sentences
            .iter()
            .flat_map(|s| self.sentence_to_ids(s))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy() -> Vocabulary {
        Vocabulary::from_sentences(
            &[
                vec!["nlp", "class", "is", "awesome"],
                vec!["nlp", "class", "is", "fun"],
            ],
            None,
        )
    }

    #[test]
    fn test_reserved_ids() {
        let v = toy();
        assert_eq!(v.word(START_ID), Some(START_TOKEN));
        assert_eq!(v.word(END_ID), Some(END_TOKEN));
        assert_eq!(v.word(UNK_ID), Some(UNK_TOKEN));
    }

    #[test]
    fn test_frequency_then_alphabetical_order() {
        let v = toy();
        // class/is/nlp appear twice, awesome/fun once
        assert_eq!(
            &v.words()[3..],
            &["class", "is", "nlp", "awesome", "fun"].map(String::from)
        );
        assert_eq!(v.size(), 8);
        assert_eq!(v.count(v.id("nlp")), 2);
    }

    #[test]
    fn test_unknown_maps_to_unk() {
        let v = toy();
        assert_eq!(v.id("boring"), UNK_ID);
        assert!(!v.contains("boring"));
        assert!(matches!(v.require("boring"), Err(EmbedError::UnknownWord { .. })));
    }

    #[test]
    fn test_size_cap() {
        let v = Vocabulary::from_sentences(&[vec!["a", "a", "b", "c"]], Some(4));
        assert_eq!(v.size(), 4);
        assert!(v.contains("a"));
        assert_eq!(v.id("b"), UNK_ID);
    }

    #[test]
    fn test_encode_corpus_wraps_sentences() {
        let v = toy();
        let stream = v.encode_corpus(&[vec!["nlp", "class"], vec!["fun"]]);
        assert_eq!(
            v.ids_to_words(&stream),
            vec!["<s>", "nlp", "class", "</s>", "<s>", "fun", "</s>"]
        );
    }

    #[test]
    fn test_cap_below_reserved_keeps_reserved() {
        for cap in [0, 1, 3] {
            let v = Vocabulary::from_sentences(&[vec!["a", "b"]], Some(cap));
            assert_eq!(v.size(), 3);
            assert_eq!(v.words(), &[START_TOKEN, END_TOKEN, UNK_TOKEN].map(String::from));
            assert_eq!(v.id("a"), UNK_ID);
        }
    }

    #[test]
    fn test_deserialized_lookup_works() {
        let v = toy();
        let json = serde_json::to_string(&v).unwrap();
        assert!(!json.contains("word_to_id"));
        let back: Vocabulary = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v);
        assert_ne!(back.id("fun"), UNK_ID);
        assert_eq!(back.id("fun"), v.id("fun"));
        assert_eq!(back.require("class").unwrap(), v.id("class"));
    }
}
