//! Configuration validation.
//!
//! Validates a loaded configuration and reports warnings for potential issues.

use std::fmt;

use crate::{Config, Strategy};

/// A non-fatal warning about the configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigWarning {
    /// No catalog root is configured.
    NoCatalogRoot,
    /// The catalog root does not exist.
    CatalogRootMissing {
        /// Path that doesn't exist.
        path: String,
    },
    /// The catalog root exists but is not a directory.
    CatalogRootNotDirectory {
        /// Path that is not a directory.
        path: String,
    },
    /// The threshold lies outside the range similarities can take.
    ThresholdOutOfRange {
        /// Configured threshold.
        threshold: f64,
    },
    /// The reduced strategy was asked for zero components.
    ZeroComponents,
    /// The vocabulary cap is zero, so nothing can be indexed.
    ZeroVocabulary,
    /// `components` is set but the strategy does not reduce dimensions.
    ComponentsIgnored {
        /// The active strategy.
        strategy: Strategy,
    },
    /// An exclude pattern does not compile.
    InvalidExclude {
        /// Error text from the glob compiler.
        message: String,
    },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCatalogRoot => write!(f, "no catalog root is configured"),
            Self::CatalogRootMissing { path } => {
                write!(f, "catalog root does not exist: {path}")
            }
            Self::CatalogRootNotDirectory { path } => {
                write!(f, "catalog root is not a directory: {path}")
            }
            Self::ThresholdOutOfRange { threshold } => {
                write!(f, "threshold {threshold} is outside [0, 1]")
            }
            Self::ZeroComponents => write!(f, "components = 0 is raised to 1"),
            Self::ZeroVocabulary => write!(f, "max_vocabulary = 0 disables every term"),
            Self::ComponentsIgnored { strategy } => {
                write!(f, "components has no effect with strategy '{strategy}'")
            }
            Self::InvalidExclude { message } => write!(f, "{message}"),
        }
    }
}

/// Validates the configuration and returns any warnings.
pub fn validate_config(config: &Config) -> Vec<ConfigWarning> {
    let mut warnings = Vec::new();

    match config.catalog.root {
        None => warnings.push(ConfigWarning::NoCatalogRoot),
        Some(ref root) if !root.exists() => warnings.push(ConfigWarning::CatalogRootMissing {
            path: root.display().to_string(),
        }),
        Some(ref root) if !root.is_dir() => {
            warnings.push(ConfigWarning::CatalogRootNotDirectory {
                path: root.display().to_string(),
            });
        }
        Some(_) => {}
    }

    if let Err(e) = config.catalog.compile_exclude() {
        warnings.push(ConfigWarning::InvalidExclude {
            message: e.to_string(),
        });
    }

    let search = &config.search;
    if !(0.0..=1.0).contains(&search.threshold) {
        warnings.push(ConfigWarning::ThresholdOutOfRange {
            threshold: search.threshold,
        });
    }
    if search.max_vocabulary == 0 {
        warnings.push(ConfigWarning::ZeroVocabulary);
    }
    if search.strategy == Strategy::TfidfReduced {
        if search.components == 0 {
            warnings.push(ConfigWarning::ZeroComponents);
        }
    } else if search.components != crate::SearchSettings::default().components {
        warnings.push(ConfigWarning::ComponentsIgnored {
            strategy: search.strategy,
        });
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CatalogSettings, SearchSettings, test_support::TestDir};

    fn config_with_root(root: &std::path::Path) -> Config {
        Config {
            catalog: CatalogSettings {
                root: Some(root.to_path_buf()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_default_config_warns_about_missing_root() {
        let warnings = validate_config(&Config::default());
        assert_eq!(warnings, vec![ConfigWarning::NoCatalogRoot]);
    }

    #[test]
    fn test_clean_config_has_no_warnings() {
        let dir = TestDir::new();
        let config = config_with_root(dir.path());
        assert!(validate_config(&config).is_empty());
    }

    #[test]
    fn test_missing_root() {
        let dir = TestDir::new();
        let config = config_with_root(&dir.path().join("nope"));
        let warnings = validate_config(&config);
        assert!(matches!(
            warnings.as_slice(),
            [ConfigWarning::CatalogRootMissing { .. }]
        ));
    }

    #[test]
    fn test_root_is_file() {
        let dir = TestDir::new();
        let file = dir.create_info("cad/claws/info.json");
        let warnings = validate_config(&config_with_root(&file));
        assert!(matches!(
            warnings.as_slice(),
            [ConfigWarning::CatalogRootNotDirectory { .. }]
        ));
    }

    #[test]
    fn test_search_setting_warnings() {
        let dir = TestDir::new();
        let mut config = config_with_root(dir.path());
        config.search = SearchSettings {
            threshold: 1.5,
            max_vocabulary: 0,
            components: 8,
            ..Default::default()
        };

        let warnings = validate_config(&config);
        assert!(warnings.contains(&ConfigWarning::ThresholdOutOfRange { threshold: 1.5 }));
        assert!(warnings.contains(&ConfigWarning::ZeroVocabulary));
        assert!(warnings.contains(&ConfigWarning::ComponentsIgnored {
            strategy: Strategy::Tfidf
        }));
    }

    #[test]
    fn test_zero_components_for_reduced_strategy() {
        let dir = TestDir::new();
        let mut config = config_with_root(dir.path());
        config.search.strategy = Strategy::TfidfReduced;
        config.search.components = 0;

        assert_eq!(validate_config(&config), vec![ConfigWarning::ZeroComponents]);
    }

    #[test]
    fn test_warning_display() {
        let warning = ConfigWarning::ThresholdOutOfRange { threshold: -0.5 };
        assert_eq!(warning.to_string(), "threshold -0.5 is outside [0, 1]");
    }
}
