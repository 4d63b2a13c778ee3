//! Catalog mirror on the local filesystem.
//!
//! The mirror is laid out as `<root>/<section>/<sub_section>/<entry>/info.json`. Entries
//! are read in directory-name order so the corpus, and with it every result position,
//! is the same on every fetch.

use std::{
    ffi::OsStr,
    fs, io,
    path::{Path, PathBuf},
};

use globset::GlobSet;
use tracing::{debug, warn};
use vault_config::CatalogSettings;
use vault_index::Record;
use walkdir::WalkDir;

use crate::{
    CatalogError, Category, RecordProvider,
    entry::{EntryInfo, INFO_FILE},
};

/// Reads records from a directory tree.
#[derive(Debug, Clone)]
pub struct LocalCatalog {
    /// Root of the mirror.
    root: PathBuf,
    /// Entry directory names to skip.
    exclude: GlobSet,
}

impl LocalCatalog {
    /// Creates a provider for a mirror root with no exclusions.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            exclude: GlobSet::empty(),
        }
    }

    /// Skips entry directories whose name matches `exclude`.
    #[must_use]
    pub fn with_exclude(mut self, exclude: GlobSet) -> Self {
        self.exclude = exclude;
        self
    }

    /// Creates a provider from the `[catalog]` settings.
    pub fn from_settings(settings: &CatalogSettings) -> Result<Self, CatalogError> {
        let root = settings.root.as_ref().ok_or(CatalogError::NoRoot)?;
        Ok(Self::new(root).with_exclude(settings.compile_exclude()?))
    }

    /// Root of the mirror.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lists every category present in the mirror, sorted.
    pub fn categories(&self) -> Result<Vec<Category>, CatalogError> {
        if !self.root.is_dir() {
            return Err(CatalogError::RootNotFound {
                path: self.root.clone(),
            });
        }

        let mut categories = Vec::new();
        for section in subdirectories(&self.root) {
            for sub_section in subdirectories(&section) {
                let (Some(section_name), Some(sub_name)) = (dir_name(&section), dir_name(&sub_section))
                else {
                    continue;
                };
                match Category::new(section_name, sub_name) {
                    Ok(category) => categories.push(category),
                    Err(e) => debug!(error = %e, "skipping directory"),
                }
            }
        }
        Ok(categories)
    }

    /// Reads one entry directory, returning `None` if it has no usable metadata.
    fn read_entry(category: &Category, name: &str, dir: &Path) -> Option<Record> {
        let path = dir.join(INFO_FILE);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %dir.display(), "entry has no {INFO_FILE}, skipping");
                return None;
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read entry, skipping");
                return None;
            }
        };

        match EntryInfo::parse(&contents) {
            Ok(info) => Some(info.into_record(category, name, dir)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "malformed entry, skipping");
                None
            }
        }
    }
}

impl RecordProvider for LocalCatalog {
    fn fetch_records(&self, category: &Category) -> Result<Vec<Record>, CatalogError> {
        let dir = self.root.join(category.relative_path());
        if !dir.is_dir() {
            return Err(CatalogError::CategoryNotFound {
                category: category.to_string(),
                path: dir,
            });
        }

        let mut records = Vec::new();
        for entry_dir in subdirectories(&dir) {
            let Some(name) = dir_name(&entry_dir) else {
                warn!(path = %entry_dir.display(), "entry name is not valid UTF-8, skipping");
                continue;
            };
            if self.exclude.is_match(name) {
                debug!(entry = name, "excluded");
                continue;
            }
            if let Some(record) = Self::read_entry(category, name, &entry_dir) {
                records.push(record);
            }
        }

        debug!(%category, records = records.len(), "fetched category");
        Ok(records)
    }
}

/// Immediate non-hidden subdirectories of `dir`, sorted by name.
fn subdirectories(dir: &Path) -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_hidden(e.file_name()))
    {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                debug!(error = %e, "skipping unreadable path");
                continue;
            }
        };
        if entry.file_type().is_dir() {
            dirs.push(entry.into_path());
        }
    }
    dirs
}

/// Final path component as UTF-8.
fn dir_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(OsStr::to_str)
}

/// Checks if a file or directory name is hidden (starts with `.`).
fn is_hidden(name: &OsStr) -> bool {
    name.to_str().is_some_and(|s| s.starts_with('.'))
}

#[cfg(test)]
mod tests {
    use globset::{Glob, GlobSetBuilder};
    use tempfile::TempDir;
    use vault_index::FieldValue;

    use super::*;

    fn write_entry(root: &Path, category: &str, name: &str, info: &str) {
        let dir = root.join(category).join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(INFO_FILE), info).unwrap();
    }

    fn mirror() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write_entry(root, "cad/drivetrains", "beta", r#"{"title": "Drivetrain Beta"}"#);
        write_entry(root, "cad/drivetrains", "alpha", r#"{"title": "Drivetrain Alpha"}"#);
        write_entry(root, "cad/drivetrains", "filler-entry", r#"{"title": "Filler"}"#);
        write_entry(root, "cad/drivetrains", ".hidden", r#"{"title": "Hidden"}"#);
        write_entry(root, "cad/claws", "servo", r#"{"title": "Servo Claw", "used-in-comp": true}"#);
        write_entry(root, "code/teleop", "broken", "{ not json");
        write_entry(root, "code/teleop", "drive", r#"{"title": "Drive", "years-used": "23-24"}"#);
        temp
    }

    fn filler() -> GlobSet {
        let mut builder = GlobSetBuilder::new();
        builder.add(Glob::new("*filler*").unwrap());
        builder.build().unwrap()
    }

    fn ids(records: &[Record]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn entries_are_sorted_and_filtered() {
        let temp = mirror();
        let catalog = LocalCatalog::new(temp.path()).with_exclude(filler());
        let records = catalog
            .fetch_records(&"cad/drivetrains".parse().unwrap())
            .unwrap();
        assert_eq!(ids(&records), ["cad/drivetrains/alpha", "cad/drivetrains/beta"]);
    }

    #[test]
    fn exclusions_are_optional() {
        let temp = mirror();
        let catalog = LocalCatalog::new(temp.path());
        let records = catalog
            .fetch_records(&"cad/drivetrains".parse().unwrap())
            .unwrap();
        assert_eq!(records.len(), 3);
    }

    #[test]
    fn malformed_entries_are_skipped() {
        let temp = mirror();
        let catalog = LocalCatalog::new(temp.path());
        let records = catalog.fetch_records(&"code/teleop".parse().unwrap()).unwrap();
        assert_eq!(ids(&records), ["code/teleop/drive"]);
        assert_eq!(
            records[0].get("seasons_used"),
            Some(&FieldValue::List(vec!["2023-2024".into()]))
        );
    }

    #[test]
    fn directories_without_info_are_skipped() {
        let temp = mirror();
        fs::create_dir_all(temp.path().join("cad/claws/empty")).unwrap();
        let catalog = LocalCatalog::new(temp.path());
        let records = catalog.fetch_records(&"cad/claws".parse().unwrap()).unwrap();
        assert_eq!(ids(&records), ["cad/claws/servo"]);
    }

    #[test]
    fn missing_category_is_an_error() {
        let temp = mirror();
        let catalog = LocalCatalog::new(temp.path());
        assert!(matches!(
            catalog.fetch_records(&"cad/intakes".parse().unwrap()),
            Err(CatalogError::CategoryNotFound { .. })
        ));
    }

    #[test]
    fn lists_categories() {
        let temp = mirror();
        let catalog = LocalCatalog::new(temp.path());
        let names: Vec<String> = catalog
            .categories()
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(names, ["cad/claws", "cad/drivetrains", "code/teleop"]);
    }

    #[test]
    fn missing_root_is_an_error() {
        let temp = TempDir::new().unwrap();
        let catalog = LocalCatalog::new(temp.path().join("nope"));
        assert!(matches!(
            catalog.categories(),
            Err(CatalogError::RootNotFound { .. })
        ));
    }

    #[test]
    fn from_settings_requires_root() {
        assert!(matches!(
            LocalCatalog::from_settings(&CatalogSettings::default()),
            Err(CatalogError::NoRoot)
        ));

        let temp = mirror();
        let settings = CatalogSettings {
            root: Some(temp.path().to_path_buf()),
            ..Default::default()
        };
        let catalog = LocalCatalog::from_settings(&settings).unwrap();
        let records = catalog
            .fetch_records(&"cad/drivetrains".parse().unwrap())
            .unwrap();
        assert_eq!(records.len(), 2);
    }
}
