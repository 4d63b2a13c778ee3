//! In-memory ranking engine for vault catalog records.
//!
//! This crate turns a set of loosely structured records into a queryable index and ranks
//! them against free-text queries. It handles:
//! - Flattening records into text over the sorted union of their field names
//! - Term statistics: term frequency, inverse document frequency and TF-IDF vectors
//! - Four interchangeable strategies behind [`SearchIndex`]: bag-of-words, TF-IDF,
//!   TF-IDF reduced by a truncated SVD, and BM25 through an embedded Tantivy index
//! - Structured queries with phrases, negation, `OR` and field scopes, degrading to plain
//!   text when a query does not parse
//! - A fingerprint-checked cache that rebuilds exactly once per corpus change, with an
//!   optional JSON snapshot on disk
//!
//! # Example
//!
//! ```
//! use vault_config::SearchSettings;
//! use vault_index::{Record, build_index};
//!
//! let records = vec![
//!     Record::new("cad/drivetrains/alpha").with("title", "Drivetrain Alpha"),
//!     Record::new("cad/claws/claw").with("title", "Claw Mechanism"),
//!     Record::new("cad/drivetrains/beta").with("title", "Drivetrain Beta"),
//! ];
//! let index = build_index(records, &SearchSettings::default());
//!
//! let found = index.query("drivetrain", 0.01);
//! assert_eq!(found.len(), 2);
//! ```

#![warn(missing_docs)]

mod cache;
mod corpus;
mod error;
mod fingerprint;
mod plan;
mod record;
mod reduce;
mod search;
mod service;
mod snapshot;
mod stats;
mod status;
mod strategy;
mod tokenize;
mod vector;

pub use cache::IndexCache;
pub use corpus::{Corpus, stringify};
pub use error::IndexError;
pub use fingerprint::{Fingerprint, IndexingConfig, SCHEMA_VERSION, compute_fingerprint};
pub use plan::{DocumentTerms, QueryPlan};
pub use record::{FieldValue, Record};
pub use reduce::{Projection, effective_rank};
pub use search::{Hit, UNSCORED, search};
pub use service::{IndexHandle, SearchService, build_index};
pub use snapshot::Snapshot;
pub use stats::{
    TermStatistics, Vocabulary, inverse_document_frequency, term_frequency, tfidf_matrix,
};
pub use status::{SnapshotStatus, detect_snapshot_status};
pub use strategy::{ExternalIndex, SearchIndex, VectorIndex, build_search_index};
pub use tokenize::tokenize;
pub use vector::cosine;
