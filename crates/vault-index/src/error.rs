//! Error types for the vault-index crate.

use std::{
    io,
    path::{Path, PathBuf},
};

use thiserror::Error;
use vault_config::Strategy;

/// Errors that can occur while building, persisting or querying an index.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Building a snapshot failed.
    #[error("failed to build {strategy} index: {message}")]
    Build {
        /// Strategy that was being built.
        strategy: Strategy,
        /// Error message.
        message: String,
    },

    /// The embedded full-text engine reported an error.
    #[error("full-text engine error: {0}")]
    Engine(String),

    /// A persisted snapshot could not be used.
    #[error("invalid snapshot at {path}: {message}")]
    Snapshot {
        /// Path to the snapshot file.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl IndexError {
    /// Creates an `Engine` error from a Tantivy error.
    pub(crate) fn engine(source: &tantivy::TantivyError) -> Self {
        Self::Engine(source.to_string())
    }

    /// Creates a `Snapshot` error for a path.
    pub(crate) fn snapshot(path: &Path, message: impl Into<String>) -> Self {
        Self::Snapshot {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }
}
