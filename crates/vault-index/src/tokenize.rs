//! Document and query tokenization.
//!
//! Text is lower-cased and split on whitespace. Documents and plain-text queries go
//! through the same function so that their terms always line up.

use std::collections::BTreeSet;

/// Splits text into lower-cased whitespace-delimited tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}

/// Distinct tokens of a text.
pub fn token_set(text: &str) -> BTreeSet<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}
