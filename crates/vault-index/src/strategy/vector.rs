//! Vector-space strategies.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use vault_config::Strategy;

use super::SearchIndex;
use crate::{
    IndexError,
    reduce::Projection,
    stats::{TermStatistics, Vocabulary, term_counts, term_frequency_of},
    vector::{NORM_EPSILON, cosine, is_zero, norm, normalize},
};

/// Documents as dense vectors over the corpus vocabulary.
///
/// - `bag-of-words`: unit-length raw term counts
/// - `tfidf`: TF-IDF weights
/// - `tfidf-reduced`: TF-IDF weights projected onto a truncated SVD basis, unit length
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorIndex {
    /// Which of the vector strategies this is.
    strategy: Strategy,
    /// Term to column mapping.
    vocabulary: Vocabulary,
    /// IDF weight per vocabulary column; empty for bag-of-words.
    idf: Vec<f64>,
    /// SVD projection, only for `tfidf-reduced`.
    projection: Option<Projection>,
    /// One vector per document, in corpus order.
    documents: Vec<Vec<f64>>,
}

impl VectorIndex {
    /// Builds a vector index from corpus statistics.
    ///
    /// `components` is the requested rank for `tfidf-reduced` and is ignored otherwise.
    /// `External` is not a vector strategy and is built as plain TF-IDF.
    pub fn build(strategy: Strategy, stats: &TermStatistics, components: usize) -> Self {
        match strategy {
            Strategy::BagOfWords => Self {
                strategy,
                vocabulary: stats.vocabulary.clone(),
                idf: Vec::new(),
                projection: None,
                documents: stats.count_rows().iter().map(|row| normalize(row)).collect(),
            },
            Strategy::TfidfReduced => {
                let rows = stats.tfidf_rows();
                let projection = Projection::fit(&rows, components);
                let documents = rows.iter().map(|row| projection.embed(row)).collect();
                Self {
                    strategy,
                    vocabulary: stats.vocabulary.clone(),
                    idf: stats.idf_weights(),
                    projection: Some(projection),
                    documents,
                }
            }
            Strategy::Tfidf | Strategy::External => Self {
                strategy: Strategy::Tfidf,
                vocabulary: stats.vocabulary.clone(),
                idf: stats.idf_weights(),
                projection: None,
                documents: stats.tfidf_rows(),
            },
        }
    }

    /// The vocabulary.
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Document vectors in corpus order.
    pub fn documents(&self) -> &[Vec<f64>] {
        &self.documents
    }

    /// The SVD projection, for `tfidf-reduced`.
    pub fn projection(&self) -> Option<&Projection> {
        self.projection.as_ref()
    }

    /// Embeds query tokens into document space.
    ///
    /// Returns `None` when the query has no weight in document space. For `tfidf-reduced`
    /// that includes known terms whose direction the truncated basis drops.
    pub fn embed_query(&self, terms: &[String]) -> Option<Vec<f64>> {
        let weighted = match self.strategy {
            Strategy::BagOfWords => {
                let ones = vec![1.0; self.vocabulary.len()];
                self.vocabulary.weigh(&term_counts(terms), &ones)
            }
            _ => self.tfidf_vector(&term_frequency_of(terms)),
        };
        if is_zero(&weighted) {
            return None;
        }
        let Some(ref projection) = self.projection else {
            return Some(weighted);
        };
        let projected = projection.project(&weighted);
        if norm(&projected) <= NORM_EPSILON {
            return None;
        }
        Some(normalize(&projected))
    }

    /// Multiplies term frequencies by IDF over the vocabulary.
    fn tfidf_vector(&self, tf: &BTreeMap<String, f64>) -> Vec<f64> {
        self.vocabulary.weigh(tf, &self.idf)
    }

    /// Checks that every vector has the expected length.
    pub fn is_consistent(&self) -> bool {
        let dimension = self.dimension();
        let idf_ok = self.idf.is_empty() || self.idf.len() == self.vocabulary.len();
        let projection_ok = self
            .projection
            .as_ref()
            .is_none_or(|p| p.input_dimension() == self.vocabulary.len());
        idf_ok && projection_ok && self.documents.iter().all(|d| d.len() == dimension)
    }
}

impl SearchIndex for VectorIndex {
    fn strategy(&self) -> Strategy {
        self.strategy
    }

    fn len(&self) -> usize {
        self.documents.len()
    }

    fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    fn dimension(&self) -> usize {
        self.projection
            .as_ref()
            .map_or(self.vocabulary.len(), Projection::components)
    }

    fn similarities(&self, terms: &[String]) -> Result<Option<Vec<f64>>, IndexError> {
        Ok(self
            .embed_query(terms)
            .map(|query| self.documents.iter().map(|doc| cosine(&query, doc)).collect()))
    }

    fn as_vector(&self) -> Option<&Self> {
        Some(self)
    }
}
