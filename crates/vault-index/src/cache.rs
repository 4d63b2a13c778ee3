//! Fingerprint-checked snapshot cache.
//!
//! The cache is either empty or holds one built snapshot. Every lookup compares the
//! fingerprint of the caller's corpus with the cached one and rebuilds on mismatch while
//! holding the lock, so concurrent callers wait for the new snapshot instead of seeing a
//! half-built one. Searches run on the returned `Arc` after the lock is released.

use std::{
    path::{Path, PathBuf},
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
};

use tracing::{debug, info, warn};

use crate::{
    IndexError,
    corpus::Corpus,
    fingerprint::{IndexingConfig, compute_fingerprint},
    snapshot::Snapshot,
};

/// Lifecycle of the cached snapshot.
#[derive(Debug, Default)]
enum CacheState {
    /// Nothing built, or the last build was discarded.
    #[default]
    Empty,
    /// A complete snapshot.
    Built(Arc<Snapshot>),
}

/// Holds the snapshot for the current corpus.
#[derive(Debug)]
pub struct IndexCache {
    /// Index settings applied to every build.
    config: IndexingConfig,
    /// File the snapshot is persisted to, if any.
    snapshot_path: Option<PathBuf>,
    /// Current state.
    state: Mutex<CacheState>,
    /// Number of snapshots built from scratch.
    builds: AtomicUsize,
}

impl IndexCache {
    /// Creates an empty cache.
    pub fn new(config: IndexingConfig) -> Self {
        Self {
            config,
            snapshot_path: None,
            state: Mutex::new(CacheState::Empty),
            builds: AtomicUsize::new(0),
        }
    }

    /// Persists snapshots to `path` and loads a matching file instead of rebuilding.
    pub fn with_snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_path = Some(path.into());
        self
    }

    /// Index settings applied to every build.
    pub fn config(&self) -> &IndexingConfig {
        &self.config
    }

    /// The persisted snapshot file, if configured.
    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot_path.as_deref()
    }

    /// Number of snapshots built from scratch so far.
    ///
    /// Snapshots loaded from disk are not counted.
    pub fn build_count(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }

    /// Returns a snapshot matching `corpus`, building one if needed.
    ///
    /// On failure the cache is left empty so the next call starts over.
    pub fn snapshot_for(&self, corpus: &Corpus) -> Result<Arc<Snapshot>, IndexError> {
        let fingerprint = compute_fingerprint(corpus, &self.config);
        let mut state = self.lock();

        if let CacheState::Built(ref snapshot) = *state {
            if snapshot.fingerprint() == fingerprint {
                return Ok(Arc::clone(snapshot));
            }
            debug!(
                old = %snapshot.fingerprint(),
                new = %fingerprint,
                "corpus changed, discarding snapshot"
            );
        }
        *state = CacheState::Empty;

        let snapshot = Arc::new(self.load_or_build(corpus)?);
        *state = CacheState::Built(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    /// The cached snapshot, without checking it against any corpus.
    pub fn current(&self) -> Option<Arc<Snapshot>> {
        match *self.lock() {
            CacheState::Built(ref snapshot) => Some(Arc::clone(snapshot)),
            CacheState::Empty => None,
        }
    }

    /// Drops the cached snapshot.
    pub fn invalidate(&self) {
        *self.lock() = CacheState::Empty;
        debug!("snapshot cache invalidated");
    }

    /// Locks the state, recovering from a panicked holder.
    ///
    /// A holder can only panic before publishing, so the state is always whole.
    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Loads a matching persisted snapshot, or builds and persists a new one.
    fn load_or_build(&self, corpus: &Corpus) -> Result<Snapshot, IndexError> {
        if let Some(ref path) = self.snapshot_path {
            match Snapshot::load(path, corpus, &self.config) {
                Ok(Some(snapshot)) => return Ok(snapshot),
                Ok(None) => debug!(path = %path.display(), "no matching snapshot on disk"),
                Err(e) => warn!(error = %e, "ignoring unusable snapshot"),
            }
        }

        let snapshot = Snapshot::build(corpus, &self.config)?;
        let builds = self.builds.fetch_add(1, Ordering::SeqCst) + 1;
        info!(
            documents = snapshot.len(),
            vocabulary = snapshot.vocabulary_len(),
            dimension = snapshot.dimension(),
            strategy = %snapshot.strategy(),
            fingerprint = %snapshot.fingerprint(),
            builds,
            "built snapshot"
        );

        if let Some(ref path) = self.snapshot_path
            && let Err(e) = snapshot.save(path)
        {
            warn!(path = %path.display(), error = %e, "failed to persist snapshot");
        }
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;
    use vault_config::Strategy;

    use super::*;
    use crate::record::Record;

    fn corpus(titles: &[&str]) -> Corpus {
        Corpus::new(
            titles
                .iter()
                .enumerate()
                .map(|(i, t)| Record::new(format!("r{i}")).with("title", *t))
                .collect(),
        )
    }

    #[test]
    fn starts_empty() {
        let cache = IndexCache::new(IndexingConfig::default());
        assert!(cache.current().is_none());
        assert_eq!(cache.build_count(), 0);
    }

    #[test]
    fn reuses_snapshot_for_unchanged_corpus() {
        let cache = IndexCache::new(IndexingConfig::default());
        let records = corpus(&["claw", "intake"]);
        let first = cache.snapshot_for(&records).unwrap();
        let second = cache.snapshot_for(&records).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.build_count(), 1);
    }

    #[test]
    fn rebuilds_on_change() {
        let cache = IndexCache::new(IndexingConfig::default());
        cache.snapshot_for(&corpus(&["claw", "intake"])).unwrap();
        let after = cache.snapshot_for(&corpus(&["claw", "intake", "lift"])).unwrap();
        assert_eq!(after.len(), 3);
        assert_eq!(cache.build_count(), 2);
    }

    #[test]
    fn invalidate_forces_rebuild() {
        let cache = IndexCache::new(IndexingConfig::default());
        let records = corpus(&["claw"]);
        cache.snapshot_for(&records).unwrap();
        cache.invalidate();
        assert!(cache.current().is_none());
        cache.snapshot_for(&records).unwrap();
        assert_eq!(cache.build_count(), 2);
    }

    #[test]
    fn loads_persisted_snapshot_instead_of_building() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("index.json");
        let config = IndexingConfig::default().with_strategy(Strategy::BagOfWords);
        let records = corpus(&["claw", "intake"]);

        let writer = IndexCache::new(config).with_snapshot_path(&path);
        writer.snapshot_for(&records).unwrap();
        assert!(path.exists());

        let reader = IndexCache::new(config).with_snapshot_path(&path);
        let loaded = reader.snapshot_for(&records).unwrap();
        assert_eq!(reader.build_count(), 0);
        assert_eq!(loaded.len(), 2);
    }

    #[test]
    fn corrupt_snapshot_file_is_rebuilt() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("index.json");
        fs::write(&path, "garbage").unwrap();

        let cache = IndexCache::new(IndexingConfig::default()).with_snapshot_path(&path);
        cache.snapshot_for(&corpus(&["claw"])).unwrap();
        assert_eq!(cache.build_count(), 1);
        assert!(Snapshot::read_fingerprint(&path).unwrap().is_some());
    }
}
