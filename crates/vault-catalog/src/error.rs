//! Error types for the vault-catalog crate.

use std::path::PathBuf;

use thiserror::Error;
use vault_config::ConfigError;

/// Errors that can occur while locating or reading catalog records.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// No catalog root is configured.
    #[error("no catalog root configured")]
    NoRoot,

    /// The catalog root does not exist or is not a directory.
    #[error("catalog root {path} does not exist")]
    RootNotFound {
        /// Configured root.
        path: PathBuf,
    },

    /// A category directory does not exist.
    #[error("category '{category}' not found at {path}")]
    CategoryNotFound {
        /// Category as given.
        category: String,
        /// Directory that was expected.
        path: PathBuf,
    },

    /// A category string is not a valid `section/sub_section` path.
    #[error("invalid category '{input}': {reason}")]
    InvalidCategory {
        /// Category as given.
        input: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// The catalog settings could not be applied.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
