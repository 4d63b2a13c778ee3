//! Path resolution for configured locations.
//!
//! Catalog roots and snapshot files may be written relative to the config file that
//! declares them, or with a `~/` prefix.

use std::path::{Path, PathBuf};

use directories::BaseDirs;

use crate::ConfigError;

/// Resolves a configured path to an absolute path.
///
/// - `~` and `~/rest` expand to the home directory
/// - relative paths are joined onto `config_dir`
/// - absolute paths are returned as-is
///
/// The path is not required to exist; validation reports missing locations.
pub fn resolve_path(path: &str, config_dir: &Path) -> Result<PathBuf, ConfigError> {
    let expanded = if path == "~" {
        home_dir()?
    } else if let Some(rest) = path.strip_prefix("~/") {
        home_dir()?.join(rest)
    } else {
        PathBuf::from(path)
    };

    if expanded.is_absolute() {
        Ok(expanded)
    } else {
        Ok(config_dir.join(expanded))
    }
}

/// Formats a path for display, relative to `base` when that is shorter.
pub fn format_path_for_display(path: &Path, base: Option<&Path>) -> String {
    let relative = base.and_then(|base| pathdiff::diff_paths(path, base));
    match relative {
        Some(rel) if rel.as_os_str().is_empty() => ".".to_string(),
        Some(rel) if rel.as_os_str().len() < path.as_os_str().len() => rel.display().to_string(),
        _ => path.display().to_string(),
    }
}

/// Returns the home directory.
fn home_dir() -> Result<PathBuf, ConfigError> {
    BaseDirs::new()
        .map(|dirs| dirs.home_dir().to_path_buf())
        .ok_or(ConfigError::NoHomeDirectory)
}
