//! In-memory Okapi BM25 scoring.
//!
//! The index is a one-shot build over tokenized chunk representations and
//! scores the *entire* corpus for a query, because downstream fusion
//! needs a score for every chunk, not a pruned top-k. The `(k1, b)`
//! parameters come from the active domain profile.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use rayon::prelude::*;
use regex::Regex;

use crate::domain::Bm25Params;

/// Tokens shorter than this are discarded.
const MIN_TOKEN_CHARS: usize = 3;

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w+\b").expect("valid token regex"));

static STOP_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "the", "a", "an", "and", "or", "but", "in", "on", "at", "to",
        "for", "of", "with", "by", "is", "are", "was", "were", "be",
        "been", "being", "have", "has", "had", "do", "does", "did",
        "will", "would", "could", "should", "may", "might", "can",
        "this", "that", "these", "those", "it", "its", "they", "them",
        "their", "we", "us", "our", "you", "your", "he", "she", "his",
        "her", "him", "i", "me", "my", "myself",
    ]
    .into_iter()
    .collect()
});

/// Lowercase word tokens with stop words and short tokens removed.
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    TOKEN
        .find_iter(&lower)
        .map(|m| m.as_str())
        .filter(|token| {
            token.chars().count() >= MIN_TOKEN_CHARS
                && !STOP_WORDS.contains(token)
        })
        .map(str::to_owned)
        .collect()
}

/// Term-frequency index over a fixed corpus of token lists.
#[derive(Debug)]
pub struct Bm25Index {
    params: Bm25Params,
    term_frequencies: Vec<HashMap<String, u32>>,
    document_frequencies: HashMap<String, u32>,
    doc_lengths: Vec<f32>,
    avg_doc_length: f32,
}

impl Bm25Index {
    /// Build the index from pre-tokenized documents.
    pub fn build(documents: &[Vec<String>], params: Bm25Params) -> Self {
        let term_frequencies: Vec<HashMap<String, u32>> = documents
            .iter()
            .map(|tokens| {
                let mut tf = HashMap::new();
                for token in tokens {
                    *tf.entry(token.clone()).or_insert(0) += 1;
                }
                tf
            })
            .collect();

        let mut document_frequencies: HashMap<String, u32> = HashMap::new();
        for tf in &term_frequencies {
            for term in tf.keys() {
                *document_frequencies.entry(term.clone()).or_insert(0) += 1;
            }
        }

        let doc_lengths: Vec<f32> =
            documents.iter().map(|tokens| tokens.len() as f32).collect();
        let avg_doc_length = if doc_lengths.is_empty() {
            0.0
        } else {
            doc_lengths.iter().sum::<f32>() / doc_lengths.len() as f32
        };

        Self {
            params,
            term_frequencies,
            document_frequencies,
            doc_lengths,
            avg_doc_length,
        }
    }

    pub fn len(&self) -> usize {
        self.term_frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.term_frequencies.is_empty()
    }

    /// Score every document in the corpus for the query tokens. Unknown
    /// terms contribute nothing; an empty query yields all zeros.
    pub fn scores(&self, query_tokens: &[String]) -> Vec<f32> {
        let n_docs = self.len() as f32;
        (0..self.len())
            .into_par_iter()
            .map(|doc| self.score_one(doc, query_tokens, n_docs))
            .collect()
    }

    fn score_one(
        &self,
        doc: usize,
        query_tokens: &[String],
        n_docs: f32,
    ) -> f32 {
        let tf = &self.term_frequencies[doc];
        let doc_length = self.doc_lengths[doc];
        let Bm25Params { k1, b } = self.params;

        let mut score = 0.0;
        for token in query_tokens {
            let Some(&freq) = tf.get(token) else {
                continue;
            };
            let df = self
                .document_frequencies
                .get(token)
                .copied()
                .unwrap_or(1) as f32;
            let idf =
                ((n_docs - df + 0.5) / (df + 0.5)).ln().max(0.0);
            let freq = freq as f32;
            let numerator = freq * (k1 + 1.0);
            let denominator = freq
                + k1 * (1.0 - b
                    + b * doc_length / self.avg_doc_length.max(1e-3));
            score += idf * numerator / denominator.max(1e-6);
        }
        score
    }
}
