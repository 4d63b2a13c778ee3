//! Scoped search entry points.
//!
//! [`SearchService`] decides which cache answers a query according to the configured
//! [`IndexScope`]. [`build_index`] wraps one fixed record set in an [`IndexHandle`].
//! Both offer a `query` method that never fails: build errors and engine errors are
//! logged and reported as no results.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};

use tracing::{debug, error, warn};
use vault_config::{IndexScope, SearchSettings};

use crate::{
    IndexError,
    cache::IndexCache,
    corpus::Corpus,
    fingerprint::IndexingConfig,
    plan::QueryPlan,
    record::Record,
    search::{Hit, search},
    snapshot::Snapshot,
};

/// Runs a query against the snapshot a cache holds for `corpus`.
fn search_cached(
    cache: &IndexCache,
    corpus: &Corpus,
    query: &str,
    threshold: f64,
) -> Result<Vec<Hit>, IndexError> {
    let snapshot = cache.snapshot_for(corpus)?;
    let plan = QueryPlan::build(query, snapshot.field_names());
    search(&snapshot, &plan, threshold)
}

/// Maps hits back to the records they point at.
fn resolve_hits(corpus: &Corpus, hits: &[Hit]) -> Vec<Record> {
    hits.iter()
        .filter_map(|hit| corpus.record(hit.position).cloned())
        .collect()
}

/// Search front end applying the configured index scope.
#[derive(Debug)]
pub struct SearchService {
    /// Search settings.
    settings: SearchSettings,
    /// Snapshot file used by the process cache.
    snapshot_path: Option<PathBuf>,
    /// Cache used with `process` scope.
    process: Arc<IndexCache>,
    /// Caches used with `session` scope, by session key.
    sessions: Mutex<HashMap<String, Arc<IndexCache>>>,
}

impl SearchService {
    /// Creates a service with empty caches.
    pub fn new(settings: SearchSettings) -> Self {
        let config = IndexingConfig::from_settings(&settings);
        Self {
            settings,
            snapshot_path: None,
            process: Arc::new(IndexCache::new(config)),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Persists process-scoped snapshots to `path`.
    ///
    /// Only the process cache uses the file. Session caches would overwrite each other
    /// and request scope never reuses anything.
    pub fn with_snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let config = IndexingConfig::from_settings(&self.settings);
        self.process = Arc::new(IndexCache::new(config).with_snapshot_path(&path));
        self.snapshot_path = Some(path);
        self
    }

    /// Search settings.
    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// The configured threshold.
    pub fn default_threshold(&self) -> f64 {
        self.settings.threshold
    }

    /// The cache that answers queries for `session`.
    ///
    /// With `session` scope and no session key, a throwaway cache is returned, exactly as
    /// with `request` scope.
    pub fn cache_for(&self, session: Option<&str>) -> Arc<IndexCache> {
        match (self.settings.scope, session) {
            (IndexScope::Process, _) => Arc::clone(&self.process),
            (IndexScope::Session, Some(key)) => {
                let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
                Arc::clone(sessions.entry(key.to_string()).or_insert_with(|| {
                    debug!(session = key, "creating session cache");
                    Arc::new(self.new_cache())
                }))
            }
            (IndexScope::Request | IndexScope::Session, _) => Arc::new(self.new_cache()),
        }
    }

    /// Creates an unpersisted cache with the service's settings.
    fn new_cache(&self) -> IndexCache {
        IndexCache::new(IndexingConfig::from_settings(&self.settings))
    }

    /// Ranks `corpus` against `query`.
    pub fn search(
        &self,
        session: Option<&str>,
        corpus: &Corpus,
        query: &str,
        threshold: f64,
    ) -> Result<Vec<Hit>, IndexError> {
        search_cached(&self.cache_for(session), corpus, query, threshold)
    }

    /// Ranks `corpus` against `query` and returns the matching records.
    ///
    /// Never fails; any error is logged and yields no records.
    pub fn query(
        &self,
        session: Option<&str>,
        corpus: &Corpus,
        query: &str,
        threshold: f64,
    ) -> Vec<Record> {
        match self.search(session, corpus, query, threshold) {
            Ok(hits) => resolve_hits(corpus, &hits),
            Err(e) => {
                error!(error = %e, query, "search failed");
                Vec::new()
            }
        }
    }

    /// The snapshot for `corpus`, built if needed.
    pub fn snapshot(
        &self,
        session: Option<&str>,
        corpus: &Corpus,
    ) -> Result<Arc<Snapshot>, IndexError> {
        self.cache_for(session).snapshot_for(corpus)
    }

    /// Forces the next query in `session` to rebuild.
    ///
    /// With `process` scope the shared cache is emptied whatever the session.
    pub fn invalidate(&self, session: Option<&str>) {
        match (self.settings.scope, session) {
            (IndexScope::Process, _) => self.process.invalidate(),
            (IndexScope::Session, Some(key)) => {
                let sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
                if let Some(cache) = sessions.get(key) {
                    cache.invalidate();
                }
            }
            (IndexScope::Request, _) | (IndexScope::Session, None) => {}
        }
    }

    /// Forgets a session and its cache.
    pub fn end_session(&self, session: &str) {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        if sessions.remove(session).is_some() {
            debug!(session, "session cache dropped");
        }
    }

    /// Snapshot file of the process cache, if any.
    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot_path.as_deref()
    }
}

/// A fixed record set with its own index cache.
#[derive(Debug)]
pub struct IndexHandle {
    /// Records in caller order.
    corpus: Corpus,
    /// Cache for this record set.
    cache: IndexCache,
}

/// Indexes a record set.
///
/// The snapshot is built eagerly. A failed build is logged and retried by the next query.
pub fn build_index(records: Vec<Record>, settings: &SearchSettings) -> IndexHandle {
    let handle = IndexHandle {
        corpus: Corpus::new(records),
        cache: IndexCache::new(IndexingConfig::from_settings(settings)),
    };
    if let Err(e) = handle.cache.snapshot_for(&handle.corpus) {
        warn!(error = %e, "initial index build failed");
    }
    handle
}

impl IndexHandle {
    /// Ranks the records against `query` and returns the matching ones.
    ///
    /// An empty query returns every record in caller order. Never fails; any error is
    /// logged and yields no records.
    pub fn query(&self, query: &str, threshold: f64) -> Vec<Record> {
        match self.search(query, threshold) {
            Ok(hits) => resolve_hits(&self.corpus, &hits),
            Err(e) => {
                error!(error = %e, query, "search failed");
                Vec::new()
            }
        }
    }

    /// Ranks the records against `query`.
    pub fn search(&self, query: &str, threshold: f64) -> Result<Vec<Hit>, IndexError> {
        search_cached(&self.cache, &self.corpus, query, threshold)
    }

    /// Plans `query` against this record set without running it.
    pub fn explain(&self, query: &str) -> QueryPlan {
        QueryPlan::build(query, self.corpus.field_names())
    }

    /// The indexed records.
    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    /// The current snapshot, built if needed.
    pub fn snapshot(&self) -> Result<Arc<Snapshot>, IndexError> {
        self.cache.snapshot_for(&self.corpus)
    }

    /// Number of snapshots built for this record set.
    pub fn build_count(&self) -> usize {
        self.cache.build_count()
    }
}
