//! Configuration merging.
//!
//! Merges multiple `RawConfig` files into a single resolved `Config`, applying precedence
//! rules and resolving paths relative to the file that declared them.

use std::path::{Path, PathBuf};

use crate::{
    CatalogSettings, Config, ConfigError, SearchSettings, SnapshotSettings,
    parse::{RawCatalogSettings, RawConfig, RawSearchSettings, RawSnapshotSettings},
    resolve::resolve_path,
};

/// A parsed config file with its source path.
pub struct ParsedConfig {
    /// Path to the config file.
    pub path: PathBuf,
    /// Parsed raw configuration.
    pub config: RawConfig,
}

impl ParsedConfig {
    /// Directory containing the config file.
    fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }
}

/// Merges multiple configuration files into a single resolved `Config`.
///
/// Configs should be provided in precedence order: highest precedence first (closest to
/// CWD), lowest precedence last (global config). Every scalar takes the first defined
/// value; lists are replaced, never concatenated.
pub fn merge_configs(configs: &[ParsedConfig]) -> Result<Config, ConfigError> {
    let Some(closest) = configs.first() else {
        return Ok(Config::default());
    };

    let mut search = SearchSettings::default();
    let mut catalog = CatalogSettings::default();
    let mut snapshot = SnapshotSettings::default();

    // Lowest precedence first so closer files overwrite.
    for parsed in configs.iter().rev() {
        if let Some(ref raw) = parsed.config.search {
            apply_raw_search(&mut search, raw);
        }
        if let Some(ref raw) = parsed.config.catalog {
            apply_raw_catalog(&mut catalog, raw, parsed.dir())?;
        }
        if let Some(ref raw) = parsed.config.snapshot {
            apply_raw_snapshot(&mut snapshot, raw, parsed.dir())?;
        }
    }

    Ok(Config {
        search,
        catalog,
        snapshot,
        config_root: Some(closest.dir().to_path_buf()),
    })
}

/// Applies raw search settings to result.
fn apply_raw_search(result: &mut SearchSettings, raw: &RawSearchSettings) {
    if let Some(v) = raw.strategy {
        result.strategy = v;
    }
    if let Some(v) = raw.threshold {
        result.threshold = v;
    }
    if let Some(v) = raw.components {
        result.components = v;
    }
    if let Some(v) = raw.max_vocabulary {
        result.max_vocabulary = v;
    }
    if let Some(v) = raw.scope {
        result.scope = v;
    }
    if let Some(v) = raw.limit {
        result.limit = v;
    }
}

/// Applies raw catalog settings to result, resolving the root against `dir`.
fn apply_raw_catalog(
    result: &mut CatalogSettings,
    raw: &RawCatalogSettings,
    dir: &Path,
) -> Result<(), ConfigError> {
    if let Some(ref root) = raw.root {
        result.root = Some(resolve_path(root, dir)?);
    }
    if let Some(ref categories) = raw.categories {
        result.categories.clone_from(categories);
    }
    if let Some(ref exclude) = raw.exclude {
        result.exclude.clone_from(exclude);
    }
    Ok(())
}

/// Applies raw snapshot settings to result, resolving the path against `dir`.
fn apply_raw_snapshot(
    result: &mut SnapshotSettings,
    raw: &RawSnapshotSettings,
    dir: &Path,
) -> Result<(), ConfigError> {
    if let Some(ref path) = raw.path {
        result.path = Some(resolve_path(path, dir)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{IndexScope, Strategy, parse::parse_config_str};

    fn parsed(path: &str, toml: &str) -> ParsedConfig {
        ParsedConfig {
            path: PathBuf::from(path),
            config: parse_config_str(toml, Path::new(path)).unwrap(),
        }
    }

    #[test]
    fn test_merge_empty_configs() {
        let result = merge_configs(&[]).unwrap();
        assert_eq!(result.search, SearchSettings::default());
        assert!(result.config_root.is_none());
    }

    #[test]
    fn test_threshold_keeps_full_precision() {
        let configs = [parsed("/site/.vault.toml", "[search]\nthreshold = 0.3\n")];
        let merged = merge_configs(&configs).unwrap();
        assert_eq!(merged.search.threshold.to_bits(), 0.3_f64.to_bits());
    }

    #[test]
    fn test_closest_config_wins() {
        let configs = [
            parsed("/site/ftc/.vault.toml", "[search]\nthreshold = 0.3\n"),
            parsed(
                "/site/.vault.toml",
                "[search]\nthreshold = 0.05\nstrategy = \"bag-of-words\"\n",
            ),
        ];

        let merged = merge_configs(&configs).unwrap();
        assert!((merged.search.threshold - 0.3).abs() < f64::EPSILON);
        assert_eq!(merged.search.strategy, Strategy::BagOfWords);
        assert_eq!(merged.config_root, Some(PathBuf::from("/site/ftc")));
    }

    #[test]
    fn test_paths_resolve_against_declaring_file() {
        let configs = [
            parsed("/site/ftc/.vault.toml", "[snapshot]\npath = \"index.json\"\n"),
            parsed("/site/.vault.toml", "[catalog]\nroot = \"mirror\"\n"),
        ];

        let merged = merge_configs(&configs).unwrap();
        assert_eq!(merged.catalog.root, Some(PathBuf::from("/site/mirror")));
        assert_eq!(
            merged.snapshot.path,
            Some(PathBuf::from("/site/ftc/index.json"))
        );
    }

    #[test]
    fn test_lists_replace_rather_than_append() {
        let configs = [
            parsed("/a/b/.vault.toml", "[catalog]\nexclude = [\"draft-*\"]\n"),
            parsed("/a/.vault.toml", "[catalog]\nexclude = [\"*filler*\"]\n"),
        ];

        let merged = merge_configs(&configs).unwrap();
        assert_eq!(merged.catalog.exclude, vec!["draft-*"]);
    }

    #[test]
    fn test_unset_values_keep_defaults() {
        let configs = [parsed("/a/.vault.toml", "[search]\nscope = \"request\"\n")];

        let merged = merge_configs(&configs).unwrap();
        assert_eq!(merged.search.scope, IndexScope::Request);
        assert_eq!(merged.search.components, 100);
        assert_eq!(merged.catalog.exclude, vec!["*filler*"]);
        assert!(merged.snapshot.path.is_none());
    }
}
