//! Query planning.
//!
//! A raw query string becomes a [`QueryPlan`]: the tokens that weigh into similarity plus
//! the hard constraints a document must satisfy to be a candidate at all. Syntax errors
//! and unknown field names never reach the caller; the plan falls back to plain
//! whitespace tokens and remembers why.

use std::collections::BTreeMap;

use tracing::debug;
use vault_query::{QueryError, QueryExpr, parse};

use crate::{corpus::Corpus, record::Record, tokenize::tokenize};

/// Tokens of one document, overall and per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentTerms {
    /// Tokens of the flattened document, in order.
    pub tokens: Vec<String>,
    /// Tokens of each field, in order.
    pub fields: BTreeMap<String, Vec<String>>,
}

impl DocumentTerms {
    /// Tokenizes a record over the corpus field union.
    pub fn from_record(record: &Record, field_names: &[String]) -> Self {
        let mut tokens = Vec::new();
        let mut fields = BTreeMap::new();
        for name in field_names {
            let field_tokens = tokenize(&record.text(name));
            tokens.extend(field_tokens.iter().cloned());
            fields.insert(name.clone(), field_tokens);
        }
        Self { tokens, fields }
    }

    /// Tokenizes every record of a corpus.
    pub fn from_corpus(corpus: &Corpus) -> Vec<Self> {
        corpus
            .records()
            .iter()
            .map(|r| Self::from_record(r, corpus.field_names()))
            .collect()
    }

    /// Tokens of one field, or of the whole document.
    fn scope(&self, field: Option<&str>) -> &[String] {
        match field {
            Some(name) => self.fields.get(name).map(Vec::as_slice).unwrap_or_default(),
            None => &self.tokens,
        }
    }
}

/// An executable query.
#[derive(Debug, Clone, Default)]
pub struct QueryPlan {
    /// The query as typed.
    query: String,
    /// Tokens that contribute similarity weight.
    terms: Vec<String>,
    /// Expressions every candidate must satisfy.
    constraints: Vec<QueryExpr>,
    /// The parsed expression, when parsing succeeded.
    expr: Option<QueryExpr>,
    /// Why the structured form was abandoned, if it was.
    fallback: Option<QueryError>,
}

impl QueryPlan {
    /// Plans a query against the fields present in a corpus.
    pub fn build(query: &str, field_names: &[String]) -> Self {
        let expr = match parse(query) {
            Ok(Some(expr)) => expr,
            Ok(None) => return Self::default(),
            Err(e) => return Self::plain(query, e),
        };

        if let Some(name) = expr
            .field_names()
            .into_iter()
            .find(|name| !field_names.iter().any(|f| f == *name))
        {
            let error = QueryError::compile(format!("unknown field: {name}")).with_query(query);
            return Self::plain(query, error);
        }

        let mut plan = Self {
            query: query.to_string(),
            ..Self::default()
        };
        let items = match expr {
            QueryExpr::And(ref items) => items.clone(),
            ref other => vec![other.clone()],
        };
        for item in items {
            match item {
                QueryExpr::Term(ref word) => plan.terms.extend(tokenize(word)),
                QueryExpr::Not(_) => plan.constraints.push(item),
                _ => {
                    collect_positive_words(&item, &mut plan.terms);
                    plan.constraints.push(item);
                }
            }
        }
        plan.expr = Some(expr);
        plan
    }

    /// Falls back to whitespace tokens of the raw query.
    fn plain(query: &str, error: QueryError) -> Self {
        debug!(query, error = error.message(), "query falls back to plain text");
        Self {
            query: query.to_string(),
            terms: tokenize(query),
            constraints: Vec::new(),
            expr: None,
            fallback: Some(error),
        }
    }

    /// The query as typed.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Tokens that contribute similarity weight.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Constraints every candidate must satisfy.
    pub fn constraints(&self) -> &[QueryExpr] {
        &self.constraints
    }

    /// The parsed expression, if the structured form was used.
    pub fn expr(&self) -> Option<&QueryExpr> {
        self.expr.as_ref()
    }

    /// The error that forced plain-text matching.
    pub fn fallback(&self) -> Option<&QueryError> {
        self.fallback.as_ref()
    }

    /// Returns true if the query was matched as plain text.
    pub fn is_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    /// Returns true if the plan neither weighs nor filters anything.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty() && self.constraints.is_empty()
    }

    /// Returns true if a document satisfies every constraint.
    pub fn accepts(&self, document: &DocumentTerms) -> bool {
        self.constraints
            .iter()
            .all(|c| matches_expr(c, document, None))
    }
}

/// Collects the words of every non-negated term and phrase.
fn collect_positive_words(expr: &QueryExpr, out: &mut Vec<String>) {
    match expr {
        QueryExpr::Term(word) => out.extend(tokenize(word)),
        QueryExpr::Phrase(words) => out.extend(words.iter().flat_map(|w| tokenize(w))),
        QueryExpr::Not(_) => {}
        QueryExpr::And(items) | QueryExpr::Or(items) => {
            for item in items {
                collect_positive_words(item, out);
            }
        }
        QueryExpr::Field { expr, .. } => collect_positive_words(expr, out),
    }
}

/// Evaluates an expression against a document, optionally inside one field.
fn matches_expr(expr: &QueryExpr, document: &DocumentTerms, field: Option<&str>) -> bool {
    match expr {
        QueryExpr::Term(word) => {
            let tokens = document.scope(field);
            tokenize(word).iter().all(|t| tokens.contains(t))
        }
        QueryExpr::Phrase(words) => {
            let wanted: Vec<String> = words.iter().flat_map(|w| tokenize(w)).collect();
            contains_sequence(document.scope(field), &wanted)
        }
        QueryExpr::Not(inner) => !matches_expr(inner, document, field),
        QueryExpr::And(items) => items.iter().all(|e| matches_expr(e, document, field)),
        QueryExpr::Or(items) => items.iter().any(|e| matches_expr(e, document, field)),
        QueryExpr::Field { name, expr } => matches_expr(expr, document, Some(name)),
    }
}

/// Returns true if `needle` occurs contiguously in `haystack`.
fn contains_sequence(haystack: &[String], needle: &[String]) -> bool {
    needle.is_empty() || haystack.windows(needle.len()).any(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> Vec<String> {
        ["author", "language", "title"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    fn doc(title: &str, author: &str, language: &str) -> DocumentTerms {
        let record = Record::new("x")
            .with("title", title)
            .with("author", author)
            .with("language", language);
        DocumentTerms::from_record(&record, &fields())
    }

    fn plan(query: &str) -> QueryPlan {
        QueryPlan::build(query, &fields())
    }

    #[test]
    fn document_terms_follow_field_order() {
        let terms = doc("Claw Intake", "Smith", "");
        assert_eq!(terms.tokens, vec!["smith", "claw", "intake"]);
        assert_eq!(terms.fields["title"], vec!["claw", "intake"]);
        assert!(terms.fields["language"].is_empty());
    }

    #[test]
    fn empty_query_plans_nothing() {
        for query in ["", "   "] {
            let plan = plan(query);
            assert!(plan.is_empty());
            assert!(!plan.is_fallback());
            assert!(plan.accepts(&doc("a", "b", "c")));
        }
    }

    #[test]
    fn bare_terms_only_weigh() {
        let plan = plan("Mecanum drivetrain");
        assert_eq!(plan.terms(), ["mecanum", "drivetrain"]);
        assert!(plan.constraints().is_empty());
        assert!(plan.accepts(&doc("claw", "", "")));
    }

    #[test]
    fn phrase_weighs_and_constrains() {
        let plan = plan("\"dead axle\" intake");
        assert_eq!(plan.terms(), ["dead", "axle", "intake"]);
        assert!(plan.accepts(&doc("Dead Axle drive", "", "")));
        assert!(!plan.accepts(&doc("axle dead", "", "")));
    }

    #[test]
    fn negation_only_constrains() {
        let plan = plan("claw -python");
        assert_eq!(plan.terms(), ["claw"]);
        assert!(plan.accepts(&doc("claw", "", "java")));
        assert!(!plan.accepts(&doc("claw", "", "Python")));
    }

    #[test]
    fn field_scope_checks_only_that_field() {
        let plan = plan("author:smith");
        assert_eq!(plan.terms(), ["smith"]);
        assert!(plan.accepts(&doc("claw", "Smith", "")));
        assert!(!plan.accepts(&doc("smith claw", "jones", "")));
    }

    #[test]
    fn or_group_requires_one_alternative() {
        let plan = plan("(claw OR intake) servo");
        assert_eq!(plan.terms(), ["claw", "intake", "servo"]);
        assert!(plan.accepts(&doc("intake", "", "")));
        assert!(!plan.accepts(&doc("turret", "", "")));
    }

    #[test]
    fn syntax_error_falls_back() {
        let plan = plan("\"dead axle");
        assert!(plan.is_fallback());
        assert_eq!(plan.terms(), ["\"dead", "axle"]);
        assert!(plan.constraints().is_empty());
        assert!(plan.expr().is_none());
    }

    #[test]
    fn unknown_field_falls_back() {
        let plan = plan("colour:red claw");
        assert!(plan.is_fallback());
        assert_eq!(plan.terms(), ["colour:red", "claw"]);
        assert!(plan.fallback().unwrap().message().contains("unknown field"));
    }

    #[test]
    fn sequence_matching() {
        let hay: Vec<String> = tokenize("a b c d");
        assert!(contains_sequence(&hay, &tokenize("b c")));
        assert!(!contains_sequence(&hay, &tokenize("c b")));
        assert!(contains_sequence(&hay, &[]));
        assert!(!contains_sequence(&[], &tokenize("a")));
    }
}
