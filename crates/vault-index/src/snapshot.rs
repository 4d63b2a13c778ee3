//! Built index snapshots and their on-disk form.
//!
//! A [`Snapshot`] is everything needed to answer queries for one corpus: the fingerprint
//! it was built against, per-document tokens for constraint checks, and the strategy's
//! index. Vector strategies can be written to a JSON file and loaded back without
//! recomputing any statistics; the document tokens are cheap and are always rebuilt from
//! the corpus.

use std::{fs, io, path::Path};

use serde::{Deserialize, Serialize};
use tracing::debug;
use vault_config::Strategy;

use crate::{
    IndexError,
    corpus::Corpus,
    fingerprint::{Fingerprint, IndexingConfig, SCHEMA_VERSION, compute_fingerprint},
    plan::DocumentTerms,
    strategy::{SearchIndex, VectorIndex, build_search_index},
};

/// An immutable index over one corpus.
#[derive(Debug)]
pub struct Snapshot {
    /// Fingerprint of the corpus and settings this was built from.
    fingerprint: Fingerprint,
    /// Sorted field-name union of the corpus.
    field_names: Vec<String>,
    /// Tokens of every document, in corpus order.
    documents: Vec<DocumentTerms>,
    /// The strategy's index.
    index: Box<dyn SearchIndex>,
}

/// On-disk layout of a persisted snapshot.
#[derive(Serialize)]
struct PersistedRef<'a> {
    /// Snapshot schema version.
    schema_version: u32,
    /// Corpus fingerprint.
    fingerprint: Fingerprint,
    /// The vector index.
    index: &'a VectorIndex,
}

/// Owned form of [`PersistedRef`] for loading.
#[derive(Deserialize)]
struct Persisted {
    /// Snapshot schema version.
    schema_version: u32,
    /// Corpus fingerprint.
    fingerprint: Fingerprint,
    /// The vector index.
    index: VectorIndex,
}

/// Leading fields of a persisted snapshot, read without the index body.
#[derive(Deserialize)]
struct Header {
    /// Snapshot schema version.
    schema_version: u32,
    /// Corpus fingerprint.
    fingerprint: Fingerprint,
}

impl Snapshot {
    /// Builds a snapshot of a corpus.
    pub fn build(corpus: &Corpus, config: &IndexingConfig) -> Result<Self, IndexError> {
        let index = build_search_index(&corpus.texts(), config)?;
        Ok(Self {
            fingerprint: compute_fingerprint(corpus, config),
            field_names: corpus.field_names().to_vec(),
            documents: DocumentTerms::from_corpus(corpus),
            index,
        })
    }

    /// Fingerprint this snapshot was built against.
    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    /// Field names of the indexed corpus.
    pub fn field_names(&self) -> &[String] {
        &self.field_names
    }

    /// Tokens of every document.
    pub fn documents(&self) -> &[DocumentTerms] {
        &self.documents
    }

    /// The strategy's index.
    pub fn index(&self) -> &dyn SearchIndex {
        self.index.as_ref()
    }

    /// Strategy of the index.
    pub fn strategy(&self) -> Strategy {
        self.index.strategy()
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns true if no documents are indexed.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Number of distinct terms in the index.
    pub fn vocabulary_len(&self) -> usize {
        self.index.vocabulary_len()
    }

    /// Length of every document vector.
    pub fn dimension(&self) -> usize {
        self.index.dimension()
    }

    /// Writes the snapshot to a JSON file.
    ///
    /// Returns `Ok(false)` without touching the file when the strategy has no serializable
    /// form. Creates parent directories if they don't exist.
    pub fn save(&self, path: &Path) -> Result<bool, IndexError> {
        let Some(index) = self.index.as_vector() else {
            return Ok(false);
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let persisted = PersistedRef {
            schema_version: SCHEMA_VERSION,
            fingerprint: self.fingerprint,
            index,
        };
        let contents = serde_json::to_string(&persisted)
            .map_err(|e| IndexError::snapshot(path, format!("failed to serialize: {e}")))?;

        // Write then rename so readers never see a partial file.
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, contents)?;
        fs::rename(&staging, path)?;
        debug!(path = %path.display(), fingerprint = %self.fingerprint, "saved snapshot");
        Ok(true)
    }

    /// Loads a persisted snapshot for a corpus.
    ///
    /// Returns `Ok(None)` if the file does not exist or was built from a different corpus
    /// or different settings. Returns an error if the file exists but cannot be used.
    pub fn load(
        path: &Path,
        corpus: &Corpus,
        config: &IndexingConfig,
    ) -> Result<Option<Self>, IndexError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let persisted: Persisted = serde_json::from_str(&contents)
            .map_err(|e| IndexError::snapshot(path, format!("failed to parse: {e}")))?;

        let fingerprint = compute_fingerprint(corpus, config);
        if persisted.schema_version != SCHEMA_VERSION || persisted.fingerprint != fingerprint {
            return Ok(None);
        }

        let index = persisted.index;
        if index.len() != corpus.len() || !index.is_consistent() {
            return Err(IndexError::snapshot(path, "vector dimensions are inconsistent"));
        }

        debug!(path = %path.display(), %fingerprint, "loaded snapshot");
        Ok(Some(Self {
            fingerprint,
            field_names: corpus.field_names().to_vec(),
            documents: DocumentTerms::from_corpus(corpus),
            index: Box::new(index),
        }))
    }

    /// Reads the fingerprint stored in a snapshot file.
    ///
    /// Returns `Ok(None)` if the file does not exist. A file written by a different schema
    /// version is reported as an error.
    pub fn read_fingerprint(path: &Path) -> Result<Option<Fingerprint>, IndexError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let header: Header = serde_json::from_str(&contents)
            .map_err(|e| IndexError::snapshot(path, format!("failed to parse: {e}")))?;
        if header.schema_version != SCHEMA_VERSION {
            return Err(IndexError::snapshot(
                path,
                format!("unsupported schema version {}", header.schema_version),
            ));
        }
        Ok(Some(header.fingerprint))
    }
}
