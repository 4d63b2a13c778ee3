//! Configuration file parsing.
//!
//! Parses individual `.vault.toml` files into intermediate `RawConfig` structures that keep
//! every field optional until merging.

use std::{fs, path::Path};

use serde::Deserialize;
use serde_with::{OneOrMany, serde_as};

use crate::{ConfigError, IndexScope, Strategy};

/// Raw configuration as parsed directly from a TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// When true, stop discovery here - ignore parent and global configs.
    pub root: Option<bool>,
    /// Search settings section.
    pub search: Option<RawSearchSettings>,
    /// Catalog settings section.
    pub catalog: Option<RawCatalogSettings>,
    /// Snapshot settings section.
    pub snapshot: Option<RawSnapshotSettings>,
}

/// Raw search settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawSearchSettings {
    /// Indexing strategy.
    pub strategy: Option<Strategy>,
    /// Similarity threshold.
    pub threshold: Option<f64>,
    /// Requested SVD rank.
    pub components: Option<usize>,
    /// Vocabulary cap.
    pub max_vocabulary: Option<usize>,
    /// Index scope.
    pub scope: Option<IndexScope>,
    /// CLI result limit.
    pub limit: Option<usize>,
}

/// Raw catalog settings.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawCatalogSettings {
    /// Mirror root, relative to the config file.
    pub root: Option<String>,
    /// Default categories. Accepts either a single string or an array of strings.
    #[serde_as(as = "Option<OneOrMany<_>>")]
    pub categories: Option<Vec<String>>,
    /// Entry exclude patterns.
    pub exclude: Option<Vec<String>>,
}

/// Raw snapshot settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawSnapshotSettings {
    /// Snapshot file, relative to the config file.
    pub path: Option<String>,
}

/// Parses a configuration file from disk.
pub fn parse_config_file(path: &Path) -> Result<RawConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    parse_config_str(&contents, path)
}

/// Parses configuration from a TOML string.
///
/// The `path` parameter is used for error reporting.
pub fn parse_config_str(contents: &str, path: &Path) -> Result<RawConfig, ConfigError> {
    toml::from_str(contents).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })
}

/// Checks if a config file has `root = true` set.
///
/// Returns false if the file cannot be read or parsed.
pub fn is_root_config(path: &Path) -> bool {
    let Ok(contents) = fs::read_to_string(path) else {
        return false;
    };
    toml::from_str::<RawConfig>(&contents).is_ok_and(|config| config.root == Some(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> RawConfig {
        parse_config_str(toml, Path::new("test.toml")).unwrap()
    }

    #[test]
    fn test_parse_empty_config() {
        let config = parse("");
        assert!(config.root.is_none());
        assert!(config.search.is_none());
        assert!(config.catalog.is_none());
        assert!(config.snapshot.is_none());
    }

    #[test]
    fn test_parse_search_settings() {
        let config = parse(
            r#"
[search]
strategy = "tfidf-reduced"
threshold = 0.3
components = 16
scope = "session"
"#,
        );
        let search = config.search.unwrap();
        assert_eq!(search.strategy, Some(Strategy::TfidfReduced));
        assert_eq!(search.threshold, Some(0.3));
        assert_eq!(search.components, Some(16));
        assert_eq!(search.scope, Some(IndexScope::Session));
        assert!(search.max_vocabulary.is_none());
    }

    #[test]
    fn test_parse_unknown_strategy_fails() {
        let err = parse_config_str("[search]\nstrategy = \"faiss\"\n", Path::new("bad.toml"))
            .unwrap_err();
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn test_parse_categories_single_string() {
        let config = parse("[catalog]\ncategories = \"cad/drivetrains\"\n");
        let catalog = config.catalog.unwrap();
        assert_eq!(catalog.categories, Some(vec!["cad/drivetrains".to_string()]));
    }

    #[test]
    fn test_parse_categories_list() {
        let config = parse(
            r#"
[catalog]
root = "../OpenVaultFiles/ftc"
categories = ["cad/drivetrains", "code/teleop"]
exclude = ["*filler*", "draft-*"]
"#,
        );
        let catalog = config.catalog.unwrap();
        assert_eq!(catalog.root.as_deref(), Some("../OpenVaultFiles/ftc"));
        assert_eq!(catalog.categories.unwrap().len(), 2);
        assert_eq!(catalog.exclude.unwrap(), vec!["*filler*", "draft-*"]);
    }

    #[test]
    fn test_parse_snapshot_path() {
        let config = parse("[snapshot]\npath = \".vault/index.json\"\n");
        assert_eq!(
            config.snapshot.unwrap().path.as_deref(),
            Some(".vault/index.json")
        );
    }

    #[test]
    fn test_parse_root_flag() {
        assert_eq!(parse("root = true\n").root, Some(true));
    }

    #[test]
    fn test_parse_invalid_toml() {
        let result = parse_config_str("[search\nthreshold = ", Path::new("broken.toml"));
        assert!(matches!(result, Err(ConfigError::ParseToml { .. })));
    }
}
