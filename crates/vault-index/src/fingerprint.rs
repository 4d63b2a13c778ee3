//! Corpus fingerprints for snapshot versioning.
//!
//! A snapshot is only reused when its fingerprint equals the fingerprint of the corpus
//! being searched. The hash covers the settings that shape the index as well as the
//! records, so changing either forces a rebuild:
//! - Schema version (internal, bumped when the snapshot layout changes)
//! - Strategy, requested components and the vocabulary cap
//! - Every record id, field name and value, in corpus order

use std::{
    fmt,
    hash::{Hash, Hasher},
};

use serde::{Deserialize, Serialize};
use siphasher::sip::SipHasher24;
use vault_config::{SearchSettings, Strategy};

use crate::corpus::Corpus;

/// Current snapshot schema version. Bump this when the persisted layout changes.
pub const SCHEMA_VERSION: u32 = 1;

/// Settings that affect indexing and are included in the fingerprint.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct IndexingConfig {
    /// Schema version.
    pub schema_version: u32,
    /// Index strategy.
    pub strategy: Strategy,
    /// Requested SVD rank.
    pub components: usize,
    /// Vocabulary cap.
    pub max_vocabulary: usize,
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self::from_settings(&SearchSettings::default())
    }
}

impl IndexingConfig {
    /// Extracts indexing-relevant settings.
    pub fn from_settings(settings: &SearchSettings) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            strategy: settings.strategy,
            components: settings.components,
            max_vocabulary: settings.max_vocabulary,
        }
    }

    /// Same settings with a different strategy.
    pub fn with_strategy(self, strategy: Strategy) -> Self {
        Self { strategy, ..self }
    }
}

/// Content hash of a corpus under a given indexing configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(u64);

impl Fingerprint {
    /// The raw hash value.
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Computes the fingerprint of a corpus.
///
/// Record fields are hashed in sorted field order, so two records with the same fields
/// hash the same no matter how they were assembled. Record order is significant because
/// it defines result positions.
pub fn compute_fingerprint(corpus: &Corpus, config: &IndexingConfig) -> Fingerprint {
    let mut hasher = SipHasher24::new();
    config.hash(&mut hasher);
    corpus.len().hash(&mut hasher);
    for record in corpus.records() {
        record.id.hash(&mut hasher);
        record.fields.len().hash(&mut hasher);
        for (name, value) in &record.fields {
            name.hash(&mut hasher);
            value.hash(&mut hasher);
        }
    }
    Fingerprint(hasher.finish())
}
