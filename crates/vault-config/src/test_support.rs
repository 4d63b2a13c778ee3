//! Test helpers shared across vault-config unit tests.

use std::{
    fs,
    path::{Path, PathBuf},
};

use tempfile::TempDir;

use crate::discovery::CONFIG_FILENAME;

/// A scratch directory holding config files and catalog directories.
pub struct TestDir(TempDir);

impl TestDir {
    /// Creates an empty scratch directory.
    pub fn new() -> Self {
        Self(tempfile::tempdir().unwrap())
    }

    /// Root of the scratch directory.
    pub fn path(&self) -> &Path {
        self.0.path()
    }

    /// Creates `rel` and any missing parents.
    pub fn create_dir(&self, rel: &str) -> PathBuf {
        let dir = self.path().join(rel);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Writes an empty entry metadata file at `rel`.
    pub fn create_info(&self, rel: &str) -> PathBuf {
        let file = self.path().join(rel);
        fs::create_dir_all(file.parent().unwrap()).unwrap();
        fs::write(&file, "{}").unwrap();
        file
    }

    /// Writes a `.vault.toml` in `rel` with the given contents.
    pub fn write_config(&self, rel: &str, contents: &str) -> PathBuf {
        let file = self.create_dir(rel).join(CONFIG_FILENAME);
        fs::write(&file, contents).unwrap();
        file
    }

    /// Writes a `.vault.toml` in `rel` that only holds a comment.
    pub fn create_config(&self, rel: &str) -> PathBuf {
        self.write_config(rel, "# test config\n")
    }

    /// Writes a `.vault.toml` in `rel` that stops discovery.
    pub fn create_root_config(&self, rel: &str) -> PathBuf {
        self.write_config(rel, "root = true\n")
    }
}
