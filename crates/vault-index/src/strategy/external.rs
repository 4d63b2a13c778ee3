//! BM25 ranking through an embedded Tantivy index.
//!
//! Documents are indexed in RAM with an analyzer that splits on whitespace and lowercases,
//! so the engine sees the same terms as the vector strategies. Scores are divided by the
//! best score of the query, which puts them on the same `[0, 1]` scale as cosine.

use std::{collections::BTreeSet, fmt};

use tantivy::{
    Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term,
    collector::TopDocs,
    query::{BooleanQuery, Occur, Query, TermQuery},
    schema::{Field, IndexRecordOption, STORED, Schema, TextFieldIndexing, TextOptions, Value},
    tokenizer::{LowerCaser, RemoveLongFilter, TextAnalyzer, WhitespaceTokenizer},
};
use tracing::debug;
use vault_config::Strategy;

use super::SearchIndex;
use crate::{IndexError, tokenize::tokenize};

/// Name of the analyzer registered with Tantivy.
const VAULT_TOKENIZER: &str = "vault_text";

/// Tokens of this many bytes or more are dropped by the analyzer.
const MAX_TOKEN_LENGTH: usize = 40;

/// Writer memory budget; the smallest Tantivy accepts for one thread.
const WRITER_HEAP_SIZE: usize = 15_000_000;

/// Builds the analyzer shared by indexing and vocabulary accounting.
fn build_analyzer() -> TextAnalyzer {
    TextAnalyzer::builder(WhitespaceTokenizer::default())
        .filter(LowerCaser)
        .filter(RemoveLongFilter::limit(MAX_TOKEN_LENGTH))
        .build()
}

/// Returns true if the analyzer keeps a token.
fn is_indexable(token: &str) -> bool {
    token.len() < MAX_TOKEN_LENGTH
}

/// A full-text index answering similarity queries with BM25.
pub struct ExternalIndex {
    /// The in-memory Tantivy index.
    index: Index,
    /// Reader over the committed index.
    reader: IndexReader,
    /// Stored corpus position of each document.
    position: Field,
    /// Indexed document text.
    body: Field,
    /// Number of indexed documents.
    documents: usize,
    /// Number of distinct indexed terms.
    vocabulary: usize,
}

impl fmt::Debug for ExternalIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExternalIndex")
            .field("documents", &self.documents)
            .field("vocabulary", &self.vocabulary)
            .finish_non_exhaustive()
    }
}

impl ExternalIndex {
    /// Indexes flattened document texts in corpus order.
    pub fn build<S: AsRef<str>>(texts: &[S]) -> Result<Self, IndexError> {
        let mut builder = Schema::builder();
        let position = builder.add_u64_field("position", STORED);
        let body_options = TextOptions::default().set_indexing_options(
            TextFieldIndexing::default()
                .set_tokenizer(VAULT_TOKENIZER)
                .set_index_option(IndexRecordOption::WithFreqs),
        );
        let body = builder.add_text_field("body", body_options);

        let index = Index::create_in_ram(builder.build());
        index.tokenizers().register(VAULT_TOKENIZER, build_analyzer());

        let mut writer: IndexWriter = index
            .writer_with_num_threads(1, WRITER_HEAP_SIZE)
            .map_err(|e| IndexError::engine(&e))?;
        let mut terms = BTreeSet::new();
        for (i, text) in texts.iter().enumerate() {
            let text = text.as_ref();
            terms.extend(tokenize(text).into_iter().filter(|t| is_indexable(t)));

            let mut doc = TantivyDocument::default();
            doc.add_u64(position, i as u64);
            doc.add_text(body, text);
            writer
                .add_document(doc)
                .map_err(|e| IndexError::engine(&e))?;
        }
        writer.commit().map_err(|e| IndexError::engine(&e))?;

        let reader: IndexReader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(|e| IndexError::engine(&e))?;

        debug!(documents = texts.len(), terms = terms.len(), "built full-text index");
        Ok(Self {
            index,
            reader,
            position,
            body,
            documents: texts.len(),
            vocabulary: terms.len(),
        })
    }

    /// The underlying Tantivy index.
    pub fn index(&self) -> &Index {
        &self.index
    }
}

impl SearchIndex for ExternalIndex {
    fn strategy(&self) -> Strategy {
        Strategy::External
    }

    fn len(&self) -> usize {
        self.documents
    }

    fn vocabulary_len(&self) -> usize {
        self.vocabulary
    }

    fn dimension(&self) -> usize {
        self.vocabulary
    }

    fn similarities(&self, terms: &[String]) -> Result<Option<Vec<f64>>, IndexError> {
        if self.documents == 0 {
            return Ok(None);
        }
        let searcher = self.reader.searcher();

        let mut clauses: Vec<(Occur, Box<dyn Query>)> = Vec::new();
        for token in terms.iter().filter(|t| is_indexable(t)) {
            let term = Term::from_field_text(self.body, token);
            if searcher.doc_freq(&term).map_err(|e| IndexError::engine(&e))? == 0 {
                continue;
            }
            clauses.push((
                Occur::Should,
                Box::new(TermQuery::new(term, IndexRecordOption::WithFreqs)),
            ));
        }
        if clauses.is_empty() {
            return Ok(None);
        }

        let top_docs = searcher
            .search(&BooleanQuery::new(clauses), &TopDocs::with_limit(self.documents))
            .map_err(|e| IndexError::engine(&e))?;

        let best = top_docs.first().map_or(0.0, |(score, _)| f64::from(*score));
        let mut scores = vec![0.0; self.documents];
        if best <= 0.0 {
            return Ok(Some(scores));
        }
        for (score, address) in top_docs {
            let doc: TantivyDocument = searcher.doc(address).map_err(|e| IndexError::engine(&e))?;
            let slot = doc
                .get_first(self.position)
                .and_then(|v| v.as_u64())
                .and_then(|p| usize::try_from(p).ok())
                .and_then(|p| scores.get_mut(p));
            if let Some(slot) = slot {
                *slot = f64::from(score) / best;
            }
        }
        Ok(Some(scores))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> ExternalIndex {
        ExternalIndex::build(&[
            "Drivetrain Alpha",
            "Claw Mechanism",
            "Drivetrain Beta drivetrain",
        ])
        .unwrap()
    }

    fn query(index: &ExternalIndex, text: &str) -> Option<Vec<f64>> {
        index.similarities(&tokenize(text)).unwrap()
    }

    #[test]
    fn counts_documents_and_terms() {
        let index = index();
        assert_eq!(index.len(), 3);
        assert_eq!(index.vocabulary_len(), 5);
        assert_eq!(index.dimension(), 5);
    }

    #[test]
    fn best_match_scores_one() {
        let scores = query(&index(), "drivetrain").unwrap();
        assert!((scores[2] - 1.0).abs() < 1e-9, "{scores:?}");
        assert!(scores[0] > 0.0 && scores[0] < 1.0);
        assert_eq!(scores[1], 0.0);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let scores = query(&index(), "CLAW").unwrap();
        assert!((scores[1] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn unknown_terms_carry_no_weight() {
        let index = index();
        assert!(query(&index, "turret").is_none());
        assert!(query(&index, "").is_none());
    }

    #[test]
    fn long_tokens_are_not_indexed() {
        let long = "x".repeat(MAX_TOKEN_LENGTH);
        let index = ExternalIndex::build(&[format!("claw {long}")]).unwrap();
        assert_eq!(index.vocabulary_len(), 1);
        assert!(query(&index, &long).is_none());
    }

    #[test]
    fn empty_corpus() {
        let index = ExternalIndex::build::<&str>(&[]).unwrap();
        assert!(index.is_empty());
        assert!(query(&index, "claw").is_none());
    }
}
