//! Persisted snapshot status detection.
//!
//! Compares the fingerprint stored in a snapshot file with the fingerprint of the corpus
//! that would be indexed now.

use std::path::Path;

use tracing::debug;

use crate::{fingerprint::Fingerprint, snapshot::Snapshot};

/// Status of a persisted snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotStatus {
    /// The file matches the current corpus and settings.
    Current,
    /// The file was built from a different corpus or different settings.
    Stale,
    /// No file exists.
    Missing,
    /// The file exists but cannot be read.
    Unreadable,
}

impl SnapshotStatus {
    /// Returns a human-readable description for display.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::Stale => "stale",
            Self::Missing => "missing",
            Self::Unreadable => "unreadable",
        }
    }

    /// Returns true if the next query would rebuild instead of loading the file.
    pub fn needs_rebuild(&self) -> bool {
        !matches!(self, Self::Current)
    }
}

/// Determines the status of the snapshot at `path` for a corpus fingerprint.
pub fn detect_snapshot_status(path: &Path, fingerprint: Fingerprint) -> SnapshotStatus {
    match Snapshot::read_fingerprint(path) {
        Ok(Some(stored)) if stored == fingerprint => SnapshotStatus::Current,
        Ok(Some(_)) => SnapshotStatus::Stale,
        Ok(None) => SnapshotStatus::Missing,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "snapshot is unreadable");
            SnapshotStatus::Unreadable
        }
    }
}
