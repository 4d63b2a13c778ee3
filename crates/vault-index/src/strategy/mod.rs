//! Interchangeable index representations.
//!
//! Every strategy answers the same question: given the tokens of a query, how similar is
//! each document? The query engine only talks to [`SearchIndex`], so ranking, thresholds
//! and constraint handling behave the same whichever strategy is configured.

mod external;
mod vector;

use std::fmt::Debug;

pub use external::ExternalIndex;
use tracing::debug;
use vault_config::Strategy;
pub use vector::VectorIndex;

use crate::{IndexError, fingerprint::IndexingConfig, stats::TermStatistics};

/// A built index over a fixed corpus.
pub trait SearchIndex: Debug + Send + Sync {
    /// Strategy this index implements.
    fn strategy(&self) -> Strategy;

    /// Number of indexed documents.
    fn len(&self) -> usize;

    /// Returns true if no documents are indexed.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of distinct terms the index knows.
    fn vocabulary_len(&self) -> usize;

    /// Length of every document vector.
    fn dimension(&self) -> usize;

    /// Similarity of every document to a query, in corpus order.
    ///
    /// Returns `None` when the query carries no weight in this index, for example when
    /// none of its terms occur in the corpus.
    fn similarities(&self, terms: &[String]) -> Result<Option<Vec<f64>>, IndexError>;

    /// The serializable form of the index, if it has one.
    fn as_vector(&self) -> Option<&VectorIndex> {
        None
    }
}

/// Builds the configured index over flattened document texts.
pub fn build_search_index(
    texts: &[String],
    config: &IndexingConfig,
) -> Result<Box<dyn SearchIndex>, IndexError> {
    debug!(
        strategy = %config.strategy,
        documents = texts.len(),
        "building search index"
    );
    let index: Box<dyn SearchIndex> = match config.strategy {
        Strategy::External => Box::new(ExternalIndex::build(texts)?),
        strategy => {
            let stats = TermStatistics::compute(texts, config.max_vocabulary);
            Box::new(VectorIndex::build(strategy, &stats, config.components))
        }
    };
    Ok(index)
}
