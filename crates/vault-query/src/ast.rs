//! Query abstract syntax tree.
//!
//! Represents parsed query expressions before they are planned against an index.

use std::fmt;

/// A parsed query expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryExpr {
    /// A single search term.
    Term(String),

    /// An exact phrase (sequence of terms).
    Phrase(Vec<String>),

    /// Negation: results must NOT match this expression.
    Not(Box<Self>),

    /// Conjunction: all sub-expressions must match.
    And(Vec<Self>),

    /// Disjunction: at least one sub-expression must match.
    Or(Vec<Self>),

    /// Field-scoped query: match only within a specific record field.
    Field {
        /// Record field name (e.g., title, author, language).
        name: String,
        /// Expression to match within that field.
        expr: Box<Self>,
    },
}

impl QueryExpr {
    /// Creates an And expression, flattening nested Ands.
    pub fn and(exprs: Vec<Self>) -> Self {
        let mut flattened: Vec<Self> = exprs
            .into_iter()
            .flat_map(|e| match e {
                Self::And(inner) => inner,
                other => vec![other],
            })
            .collect();

        match (flattened.pop(), flattened.is_empty()) {
            (Some(only), true) => only,
            (Some(last), false) => {
                flattened.push(last);
                Self::And(flattened)
            }
            (None, _) => Self::And(vec![]),
        }
    }

    /// Creates an Or expression, flattening nested Ors.
    pub fn or(exprs: Vec<Self>) -> Self {
        let mut flattened: Vec<Self> = exprs
            .into_iter()
            .flat_map(|e| match e {
                Self::Or(inner) => inner,
                other => vec![other],
            })
            .collect();

        match (flattened.pop(), flattened.is_empty()) {
            (Some(only), true) => only,
            (Some(last), false) => {
                flattened.push(last);
                Self::Or(flattened)
            }
            (None, _) => Self::Or(vec![]),
        }
    }

    /// Returns every field name referenced anywhere in the expression, in order of
    /// appearance.
    pub fn field_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_field_names(&mut names);
        names
    }

    /// Walks the tree collecting field names.
    fn collect_field_names<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Self::Term(_) | Self::Phrase(_) => {}
            Self::Not(inner) => inner.collect_field_names(names),
            Self::And(exprs) | Self::Or(exprs) => {
                for expr in exprs {
                    expr.collect_field_names(names);
                }
            }
            Self::Field { name, expr } => {
                names.push(name);
                expr.collect_field_names(names);
            }
        }
    }

    /// Formats the expression as a tree structure with the given indentation level.
    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let prefix = "  ".repeat(indent);
        match self {
            Self::Term(s) => writeln!(f, "{prefix}Term({s:?})"),
            Self::Phrase(words) => writeln!(f, "{prefix}Phrase({words:?})"),
            Self::Not(inner) => {
                writeln!(f, "{prefix}Not")?;
                inner.fmt_tree(f, indent + 1)
            }
            Self::And(exprs) => {
                writeln!(f, "{prefix}And")?;
                for expr in exprs {
                    expr.fmt_tree(f, indent + 1)?;
                }
                Ok(())
            }
            Self::Or(exprs) => {
                writeln!(f, "{prefix}Or")?;
                for expr in exprs {
                    expr.fmt_tree(f, indent + 1)?;
                }
                Ok(())
            }
            Self::Field { name, expr } => {
                writeln!(f, "{prefix}Field({name:?})")?;
                expr.fmt_tree(f, indent + 1)
            }
        }
    }

    /// Formats the expression as a query string (human-readable form).
    ///
    /// This produces output like: `author:smith (claw OR intake) -"dead axle"`
    pub fn to_query_string(&self) -> String {
        self.fmt_query_string(false)
    }

    /// Internal helper for query string formatting.
    fn fmt_query_string(&self, in_field: bool) -> String {
        match self {
            Self::Term(s) => s.clone(),
            Self::Phrase(words) => format!("\"{}\"", words.join(" ")),
            Self::Not(inner) => format!("-{}", inner.fmt_query_string(true)),
            Self::And(exprs) => {
                let parts: Vec<String> =
                    exprs.iter().map(|e| e.fmt_query_string(true)).collect();
                if in_field && exprs.len() > 1 {
                    format!("({})", parts.join(" "))
                } else {
                    parts.join(" ")
                }
            }
            Self::Or(exprs) => {
                let parts: Vec<String> =
                    exprs.iter().map(|e| e.fmt_query_string(true)).collect();
                if in_field && exprs.len() > 1 {
                    format!("({})", parts.join(" OR "))
                } else {
                    parts.join(" OR ")
                }
            }
            Self::Field { name, expr } => {
                format!("{}:{}", name, expr.fmt_query_string(true))
            }
        }
    }
}

impl fmt::Display for QueryExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_tree(f, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn term(s: &str) -> QueryExpr {
        QueryExpr::Term(s.into())
    }

    #[test]
    fn and_flattens_nested() {
        let nested = QueryExpr::and(vec![
            term("a"),
            QueryExpr::And(vec![term("b"), term("c")]),
        ]);

        assert_eq!(nested, QueryExpr::And(vec![term("a"), term("b"), term("c")]));
    }

    #[test]
    fn and_single_element_unwraps() {
        assert_eq!(QueryExpr::and(vec![term("a")]), term("a"));
        assert_eq!(QueryExpr::and(vec![]), QueryExpr::And(vec![]));
    }

    #[test]
    fn or_flattens_nested() {
        let nested = QueryExpr::or(vec![
            term("a"),
            QueryExpr::Or(vec![term("b"), term("c")]),
        ]);

        assert_eq!(nested, QueryExpr::Or(vec![term("a"), term("b"), term("c")]));
    }

    #[test]
    fn or_single_element_unwraps() {
        assert_eq!(QueryExpr::or(vec![term("a")]), term("a"));
    }

    #[test]
    fn field_names_in_order() {
        let expr = QueryExpr::and(vec![
            QueryExpr::Field {
                name: "author".into(),
                expr: Box::new(term("smith")),
            },
            QueryExpr::Not(Box::new(QueryExpr::Field {
                name: "language".into(),
                expr: Box::new(term("python")),
            })),
            term("claw"),
        ]);

        assert_eq!(expr.field_names(), vec!["author", "language"]);
    }

    #[test]
    fn query_string_form() {
        let expr = QueryExpr::and(vec![
            QueryExpr::Field {
                name: "title".into(),
                expr: Box::new(QueryExpr::or(vec![term("claw"), term("intake")])),
            },
            QueryExpr::Not(Box::new(QueryExpr::Phrase(vec![
                "dead".into(),
                "axle".into(),
            ]))),
        ]);

        assert_eq!(expr.to_query_string(), "title:(claw OR intake) -\"dead axle\"");
    }

    #[test]
    fn tree_display() {
        let expr = QueryExpr::Not(Box::new(term("swerve")));
        assert_eq!(expr.to_string(), "Not\n  Term(\"swerve\")\n");
    }
}
