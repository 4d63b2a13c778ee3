//! The ordered record set an index is built from.
//!
//! The corpus fixes two things for every build: the position of each record, which is
//! how search results map back to records, and the sorted union of field names, which
//! fixes the order fields are concatenated in when a record is flattened to text.

use std::collections::BTreeSet;

use crate::record::Record;

/// An ordered sequence of records with the field-name union across all of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    /// Records in caller order.
    records: Vec<Record>,
    /// Every field name seen on any record, sorted.
    field_names: Vec<String>,
}

impl Corpus {
    /// Creates a corpus, computing the field-name union.
    pub fn new(records: Vec<Record>) -> Self {
        let field_names: BTreeSet<&str> = records
            .iter()
            .flat_map(|record| record.fields.keys().map(String::as_str))
            .collect();
        let field_names = field_names.into_iter().map(String::from).collect();
        Self {
            records,
            field_names,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if there are no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in corpus order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// The record at a position.
    pub fn record(&self, position: usize) -> Option<&Record> {
        self.records.get(position)
    }

    /// Sorted union of field names.
    pub fn field_names(&self) -> &[String] {
        &self.field_names
    }

    /// Returns true if any record has the named field.
    pub fn has_field(&self, name: &str) -> bool {
        self.field_names.binary_search_by(|f| f.as_str().cmp(name)).is_ok()
    }

    /// Flattens the record at `position` into a single string.
    ///
    /// Field values are joined with single spaces in sorted field-name order; fields the
    /// record lacks contribute an empty string.
    pub fn stringify(&self, position: usize) -> String {
        self.record(position)
            .map(|record| stringify(record, &self.field_names))
            .unwrap_or_default()
    }

    /// Flattened text of every record, in corpus order.
    pub fn texts(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|record| stringify(record, &self.field_names))
            .collect()
    }

    /// Consumes the corpus, returning its records.
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

impl From<Vec<Record>> for Corpus {
    fn from(records: Vec<Record>) -> Self {
        Self::new(records)
    }
}

/// Flattens a record using an explicit field order.
pub fn stringify(record: &Record, field_names: &[String]) -> String {
    let parts: Vec<_> = field_names.iter().map(|name| record.text(name)).collect();
    parts.join(" ")
}
