//! Term statistics: term frequency, inverse document frequency and the TF-IDF matrix.
//!
//! All maps are ordered so that the vocabulary, and therefore every vector built on it,
//! comes out identical for an unchanged corpus.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::tokenize::tokenize;

/// Relative frequency of every token in a text.
///
/// Each count is divided by the total number of tokens. Empty text yields an empty map.
pub fn term_frequency(text: &str) -> BTreeMap<String, f64> {
    term_frequency_of(&tokenize(text))
}

/// Relative frequency of every token in an already tokenized text.
pub fn term_frequency_of(tokens: &[String]) -> BTreeMap<String, f64> {
    if tokens.is_empty() {
        return BTreeMap::new();
    }
    let counts = term_counts(tokens);
    #[allow(clippy::cast_precision_loss)]
    let total = tokens.len() as f64;
    counts
        .into_iter()
        .map(|(term, count)| (term, count / total))
        .collect()
}

/// Raw occurrence counts of every token.
pub fn term_counts(tokens: &[String]) -> BTreeMap<String, f64> {
    let mut counts = BTreeMap::new();
    for token in tokens {
        *counts.entry(token.clone()).or_insert(0.0) += 1.0;
    }
    counts
}

/// Inverse document frequency of every term occurring in at least one text.
///
/// `idf(term) = ln(N / df(term))`, so a term present in every document gets zero.
pub fn inverse_document_frequency<S: AsRef<str>>(texts: &[S]) -> BTreeMap<String, f64> {
    let tokenized: Vec<Vec<String>> = texts.iter().map(|t| tokenize(t.as_ref())).collect();
    idf_from_document_frequency(&document_frequency(&tokenized), texts.len())
}

/// Number of documents each term appears in.
fn document_frequency(tokenized: &[Vec<String>]) -> BTreeMap<String, usize> {
    let mut frequency = BTreeMap::new();
    for tokens in tokenized {
        let mut seen: Vec<&String> = tokens.iter().collect();
        seen.sort_unstable();
        seen.dedup();
        for term in seen {
            *frequency.entry(term.clone()).or_insert(0) += 1;
        }
    }
    frequency
}

/// Converts document frequencies to IDF weights for a corpus of `n` documents.
#[allow(clippy::cast_precision_loss)]
fn idf_from_document_frequency(df: &BTreeMap<String, usize>, n: usize) -> BTreeMap<String, f64> {
    df.iter()
        .map(|(term, &count)| (term.clone(), (n as f64 / count as f64).ln()))
        .collect()
}

/// Builds the vocabulary and TF-IDF matrix.
///
/// The vocabulary is the sorted key set of `idf`; each row holds `tf * idf` per
/// vocabulary term, zero where the document lacks the term.
pub fn tfidf_matrix(
    tf_per_doc: &[BTreeMap<String, f64>],
    idf: &BTreeMap<String, f64>,
) -> (Vocabulary, Vec<Vec<f64>>) {
    let vocabulary = Vocabulary::new(idf.keys().cloned().collect());
    let weights: Vec<f64> = vocabulary
        .terms()
        .iter()
        .map(|t| idf.get(t).copied().unwrap_or(0.0))
        .collect();
    let matrix = tf_per_doc
        .iter()
        .map(|tf| vocabulary.weigh(tf, &weights))
        .collect();
    (vocabulary, matrix)
}

/// Mapping from term to a dense column index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Vocabulary {
    /// Terms in column order.
    terms: Vec<String>,
    /// Column of each term.
    positions: HashMap<String, usize>,
}

impl Vocabulary {
    /// Creates a vocabulary; terms are sorted and deduplicated.
    pub fn new(mut terms: Vec<String>) -> Self {
        terms.sort();
        terms.dedup();
        let positions = terms
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i))
            .collect();
        Self { terms, positions }
    }

    /// Number of terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Returns true if there are no terms.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Terms in column order.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Column of a term.
    pub fn position(&self, term: &str) -> Option<usize> {
        self.positions.get(term).copied()
    }

    /// Dense vector of `values[term] * weights[column]`; terms outside the vocabulary are
    /// dropped.
    pub fn weigh(&self, values: &BTreeMap<String, f64>, weights: &[f64]) -> Vec<f64> {
        let mut vector = vec![0.0; self.len()];
        for (term, value) in values {
            if let Some(i) = self.position(term) {
                vector[i] = value * weights.get(i).copied().unwrap_or(1.0);
            }
        }
        vector
    }
}

impl From<Vec<String>> for Vocabulary {
    fn from(terms: Vec<String>) -> Self {
        Self::new(terms)
    }
}

impl From<Vocabulary> for Vec<String> {
    fn from(vocabulary: Vocabulary) -> Self {
        vocabulary.terms
    }
}

/// Everything the vector strategies need to know about a corpus.
#[derive(Debug, Clone)]
pub struct TermStatistics {
    /// Tokens of each document.
    pub tokens: Vec<Vec<String>>,
    /// Relative term frequencies of each document.
    pub term_frequencies: Vec<BTreeMap<String, f64>>,
    /// IDF of every vocabulary term.
    pub idf: BTreeMap<String, f64>,
    /// The vocabulary (sorted `idf` keys).
    pub vocabulary: Vocabulary,
    /// Number of distinct terms dropped by the vocabulary cap.
    pub pruned: usize,
}

impl TermStatistics {
    /// Computes statistics for a set of flattened documents.
    ///
    /// When there are more distinct terms than `max_vocabulary`, the terms found in the
    /// most documents are kept (ties broken by term order) and the rest are dropped.
    pub fn compute<S: AsRef<str>>(texts: &[S], max_vocabulary: usize) -> Self {
        let tokens: Vec<Vec<String>> = texts.iter().map(|t| tokenize(t.as_ref())).collect();
        let term_frequencies = tokens.iter().map(|t| term_frequency_of(t)).collect();

        let mut df = document_frequency(&tokens);
        let distinct = df.len();
        let pruned = distinct.saturating_sub(max_vocabulary);
        if pruned > 0 {
            let mut ranked: Vec<(&String, &usize)> = df.iter().collect();
            ranked.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
            let kept: BTreeMap<String, usize> = ranked
                .into_iter()
                .take(max_vocabulary)
                .map(|(t, c)| (t.clone(), *c))
                .collect();
            warn!(
                distinct,
                max_vocabulary, pruned, "vocabulary cap reached, dropping rarest terms"
            );
            df = kept;
        }

        let idf = idf_from_document_frequency(&df, texts.len());
        let vocabulary = Vocabulary::new(idf.keys().cloned().collect());

        Self {
            tokens,
            term_frequencies,
            idf,
            vocabulary,
            pruned,
        }
    }

    /// IDF weights in vocabulary column order.
    pub fn idf_weights(&self) -> Vec<f64> {
        self.vocabulary
            .terms()
            .iter()
            .map(|t| self.idf.get(t).copied().unwrap_or(0.0))
            .collect()
    }

    /// TF-IDF row of every document.
    pub fn tfidf_rows(&self) -> Vec<Vec<f64>> {
        let weights = self.idf_weights();
        self.term_frequencies
            .iter()
            .map(|tf| self.vocabulary.weigh(tf, &weights))
            .collect()
    }

    /// Raw count row of every document.
    pub fn count_rows(&self) -> Vec<Vec<f64>> {
        let ones = vec![1.0; self.vocabulary.len()];
        self.tokens
            .iter()
            .map(|t| self.vocabulary.weigh(&term_counts(t), &ones))
            .collect()
    }
}
