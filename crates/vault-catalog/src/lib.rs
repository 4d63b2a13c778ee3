//! Record providers for vault.
//!
//! A provider turns a [`Category`] into the records the search engine indexes. The
//! [`LocalCatalog`] provider reads a mirror of the catalog repository from disk, one
//! directory per entry with an `info.json` metadata file:
//!
//! ```text
//! <root>/cad/drivetrains/swerve/info.json
//! <root>/code/teleop/field-centric/info.json
//! <root>/portfolios/portfolios/inspire-2024/info.json
//! ```

#![warn(missing_docs)]

mod category;
mod entry;
mod error;
mod local;

pub use category::Category;
pub use entry::{EntryInfo, INFO_FILE, field_value, normalize_seasons};
pub use error::CatalogError;
pub use local::LocalCatalog;
use vault_index::Record;

/// Source of catalog records.
pub trait RecordProvider {
    /// Fetches every record of a category, in a stable order.
    fn fetch_records(&self, category: &Category) -> Result<Vec<Record>, CatalogError>;

    /// Fetches several categories and concatenates their records in the given order.
    fn fetch_all(&self, categories: &[Category]) -> Result<Vec<Record>, CatalogError> {
        let mut records = Vec::new();
        for category in categories {
            records.extend(self.fetch_records(category)?);
        }
        Ok(records)
    }
}
