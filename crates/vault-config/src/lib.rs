//! Configuration system for vault.
//!
//! vault reads TOML files named `.vault.toml`. Configuration is resolved by walking up the
//! directory tree from the current working directory, collecting every `.vault.toml` found,
//! then loading `~/.vault.toml` as the global config with lowest precedence.
//!
//! The resolved [`Config`] carries three sections:
//! - `[search]` selects the indexing strategy, the similarity threshold and the index scope
//! - `[catalog]` points at the local mirror of the content repository
//! - `[snapshot]` optionally names a file where the built index is persisted

#![warn(missing_docs)]

mod discovery;
mod error;
mod merge;
mod parse;
mod resolve;
mod templates;
#[cfg(test)]
mod test_support;
mod validate;

use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

pub use discovery::{CONFIG_FILENAME, discover_config_files, global_config_path, is_global_config};
pub use error::ConfigError;
use globset::{Glob, GlobSet, GlobSetBuilder};
pub use merge::{ParsedConfig, merge_configs};
pub use parse::{
    RawCatalogSettings, RawConfig, RawSearchSettings, RawSnapshotSettings, parse_config_file,
    parse_config_str,
};
pub use resolve::{format_path_for_display, resolve_path};
use serde::{Deserialize, Serialize};
pub use templates::{global_template, local_template};
pub use validate::ConfigWarning;
use validate::validate_config;

/// Top-level merged configuration for vault.
///
/// This represents the fully resolved configuration after merging all discovered
/// `.vault.toml` files according to precedence rules.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Search and indexing settings.
    pub search: SearchSettings,
    /// Record source settings.
    pub catalog: CatalogSettings,
    /// Index persistence settings.
    pub snapshot: SnapshotSettings,
    /// Directory containing the most specific config file.
    pub config_root: Option<PathBuf>,
}

impl Config {
    /// Loads configuration by discovering and merging all relevant `.vault.toml` files.
    ///
    /// Returns `Ok(Config::default())` if no configuration files are found.
    pub fn load(cwd: &Path) -> Result<Self, ConfigError> {
        let config_files = discover_config_files(cwd);
        Self::load_from_files(&config_files)
    }

    /// Loads configuration from a specific list of config file paths.
    ///
    /// Files should be provided in precedence order: highest precedence first.
    pub fn load_from_files(files: &[PathBuf]) -> Result<Self, ConfigError> {
        if files.is_empty() {
            return Ok(Self::default());
        }

        let parsed: Vec<ParsedConfig> = files
            .iter()
            .map(|path| {
                Ok(ParsedConfig {
                    path: path.clone(),
                    config: parse_config_file(path)?,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        merge_configs(&parsed)
    }

    /// Validates the configuration and returns any warnings.
    pub fn validate(&self) -> Vec<ConfigWarning> {
        validate_config(self)
    }

    /// Serializes the effective settings to TOML format.
    pub fn settings_to_toml(&self) -> Result<String, ConfigError> {
        let serializable = SerializableSettings {
            search: &self.search,
            catalog: &self.catalog,
            snapshot: &self.snapshot,
        };
        toml::to_string_pretty(&serializable).map_err(ConfigError::Serialize)
    }
}

/// How documents are represented and compared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Raw term counts, L2-normalized, compared by cosine.
    BagOfWords,
    /// TF-IDF weights compared by cosine.
    #[default]
    Tfidf,
    /// TF-IDF weights projected onto a truncated SVD basis.
    TfidfReduced,
    /// BM25 ranking from an embedded full-text engine.
    External,
}

impl Strategy {
    /// All strategies, in display order.
    pub const ALL: [Self; 4] = [
        Self::BagOfWords,
        Self::Tfidf,
        Self::TfidfReduced,
        Self::External,
    ];

    /// Returns the configuration name of the strategy.
    pub fn name(self) -> &'static str {
        match self {
            Self::BagOfWords => "bag-of-words",
            Self::Tfidf => "tfidf",
            Self::TfidfReduced => "tfidf-reduced",
            Self::External => "external",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|s| s.name()).collect();
                format!("unknown strategy '{s}' (expected one of: {})", names.join(", "))
            })
    }
}

/// Lifetime of a built index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum IndexScope {
    /// Build a fresh index for every query.
    Request,
    /// Keep one index per session key.
    Session,
    /// Share one index across the whole process.
    #[default]
    Process,
}

impl IndexScope {
    /// Returns the configuration name of the scope.
    pub fn name(self) -> &'static str {
        match self {
            Self::Request => "request",
            Self::Session => "session",
            Self::Process => "process",
        }
    }
}

impl fmt::Display for IndexScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Search-related settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Document representation and scoring strategy.
    pub strategy: Strategy,
    /// Minimum similarity for a document to be returned.
    pub threshold: f64,
    /// Requested rank of the SVD projection (`tfidf-reduced` only).
    pub components: usize,
    /// Upper bound on vocabulary size.
    pub max_vocabulary: usize,
    /// Lifetime of built indexes.
    pub scope: IndexScope,
    /// Default number of results shown by the CLI.
    pub limit: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            threshold: 0.01,
            components: 100,
            max_vocabulary: 50_000,
            scope: IndexScope::default(),
            limit: 20,
        }
    }
}

/// Default exclude patterns for catalog entries.
const DEFAULT_EXCLUDE_PATTERNS: &[&str] = &["*filler*"];

/// Settings for the local record catalog.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// Resolved root of the content mirror.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
    /// Categories searched when none are given on the command line.
    pub categories: Vec<String>,
    /// Glob patterns for entry directory names to skip.
    pub exclude: Vec<String>,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            root: None,
            categories: Vec::new(),
            exclude: DEFAULT_EXCLUDE_PATTERNS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }
}

impl CatalogSettings {
    /// Compiles the exclude patterns into a single matcher.
    pub fn compile_exclude(&self) -> Result<GlobSet, ConfigError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.exclude {
            let glob = Glob::new(pattern).map_err(|source| ConfigError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })?;
            builder.add(glob);
        }
        builder.build().map_err(|source| ConfigError::InvalidPattern {
            pattern: self.exclude.join(", "),
            source,
        })
    }
}

/// Settings for persisting the built index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SnapshotSettings {
    /// Resolved path of the snapshot file; persistence is off when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Internal struct for TOML serialization of settings.
#[derive(Serialize)]
struct SerializableSettings<'a> {
    /// Search settings.
    search: &'a SearchSettings,
    /// Catalog settings.
    catalog: &'a CatalogSettings,
    /// Snapshot settings.
    snapshot: &'a SnapshotSettings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_settings_defaults() {
        let search = SearchSettings::default();
        assert_eq!(search.strategy, Strategy::Tfidf);
        assert!((search.threshold - 0.01).abs() < f64::EPSILON);
        assert_eq!(search.components, 100);
        assert_eq!(search.max_vocabulary, 50_000);
        assert_eq!(search.scope, IndexScope::Process);
        assert_eq!(search.limit, 20);
    }

    #[test]
    fn test_catalog_defaults_exclude_filler() {
        let catalog = CatalogSettings::default();
        assert!(catalog.root.is_none());
        assert_eq!(catalog.exclude, vec!["*filler*"]);

        let set = catalog.compile_exclude().unwrap();
        assert!(set.is_match("filler-entry"));
        assert!(!set.is_match("mecanum-drivetrain"));
    }

    #[test]
    fn test_invalid_exclude_pattern() {
        let catalog = CatalogSettings {
            exclude: vec!["[unclosed".into()],
            ..Default::default()
        };
        let err = catalog.compile_exclude().unwrap_err();
        assert!(err.to_string().contains("[unclosed"));
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("tfidf".parse::<Strategy>().unwrap(), Strategy::Tfidf);
        assert_eq!(
            "Bag-Of-Words".parse::<Strategy>().unwrap(),
            Strategy::BagOfWords
        );
        assert_eq!(
            "tfidf-reduced".parse::<Strategy>().unwrap(),
            Strategy::TfidfReduced
        );
        let err = "faiss".parse::<Strategy>().unwrap_err();
        assert!(err.contains("external"));
    }

    #[test]
    fn test_strategy_display_round_trips() {
        for strategy in Strategy::ALL {
            assert_eq!(strategy.to_string().parse::<Strategy>().unwrap(), strategy);
        }
    }

    #[test]
    fn test_settings_to_toml() {
        let config = Config::default();
        let toml = config.settings_to_toml().unwrap();

        assert!(toml.contains("[search]"));
        assert!(toml.contains("[catalog]"));
        assert!(toml.contains("strategy = \"tfidf\""));
        assert!(toml.contains("scope = \"process\""));

        let parsed: toml::Value =
            toml::from_str(&toml).expect("settings_to_toml should produce valid TOML");
        assert!(parsed.get("search").is_some());
    }
}
