//! Catalog categories.

use std::{
    fmt,
    path::{Component, Path, PathBuf},
    str::FromStr,
};

use crate::CatalogError;

/// A `section/sub_section` pair naming one directory of the catalog.
///
/// The section decides which optional fields an entry carries (`code`, `cad` or
/// `portfolios`); any other section only gets the common fields.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Category {
    /// Top-level section, e.g. `cad`.
    section: String,
    /// Sub-section within the section, e.g. `drivetrains`.
    sub_section: String,
}

impl Category {
    /// Creates a category from its two components.
    pub fn new(section: &str, sub_section: &str) -> Result<Self, CatalogError> {
        format!("{section}/{sub_section}").parse()
    }

    /// The top-level section.
    pub fn section(&self) -> &str {
        &self.section
    }

    /// The sub-section.
    pub fn sub_section(&self) -> &str {
        &self.sub_section
    }

    /// Relative directory of this category under a catalog root.
    pub fn relative_path(&self) -> PathBuf {
        Path::new(&self.section).join(&self.sub_section)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.section, self.sub_section)
    }
}

impl FromStr for Category {
    type Err = CatalogError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| CatalogError::InvalidCategory {
            input: input.to_string(),
            reason,
        };

        let trimmed = input.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(invalid("category is empty"));
        }

        let mut parts = Vec::with_capacity(2);
        for component in Path::new(trimmed).components() {
            match component {
                Component::Normal(part) => match part.to_str() {
                    Some(part) => parts.push(part),
                    None => return Err(invalid("category is not valid UTF-8")),
                },
                Component::ParentDir => return Err(invalid("'..' is not allowed")),
                Component::CurDir => {}
                Component::RootDir | Component::Prefix(_) => {
                    return Err(invalid("category must be relative"));
                }
            }
        }

        match parts.as_slice() {
            [section, sub_section] => Ok(Self {
                section: (*section).to_string(),
                sub_section: (*sub_section).to_string(),
            }),
            _ => Err(invalid("expected section/sub_section")),
        }
    }
}
