//! Error types for query parsing and planning.

use std::{error::Error, fmt};

use thiserror::Error;

/// Lexer error with position information.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at byte {position}")]
pub struct LexError {
    /// Error message.
    pub message: String,
    /// Byte position in input where error occurred.
    pub position: usize,
    /// The original input string.
    pub input: String,
}

impl LexError {
    /// Creates a new lexer error.
    pub fn new(message: impl Into<String>, position: usize, input: &str) -> Self {
        Self {
            message: message.into(),
            position,
            input: input.to_string(),
        }
    }
}

/// Parse error with position information.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A token appeared where the grammar does not allow it.
    #[error("at token {index}: {message}")]
    Unexpected {
        /// Error message.
        message: String,
        /// Token index where the error occurred.
        index: usize,
    },
    /// The query ended in the middle of an expression.
    #[error("unexpected end of query")]
    UnexpectedEnd,
}

impl ParseError {
    /// Creates an error at a token index.
    pub fn at(message: impl Into<String>, index: usize) -> Self {
        Self::Unexpected {
            message: message.into(),
            index,
        }
    }

    /// Returns the message without the token index.
    pub fn message(&self) -> String {
        match self {
            Self::Unexpected { message, .. } => message.clone(),
            Self::UnexpectedEnd => "unexpected end of query".to_string(),
        }
    }
}

/// A unified error type for query handling.
///
/// Renders the original query with a caret under the failing position where one is
/// known, followed by a hint for common mistakes.
#[derive(Debug, Clone)]
pub struct QueryError {
    /// The kind of error that occurred.
    pub kind: QueryErrorKind,
    /// The original query string (if available).
    pub query: Option<String>,
}

/// The specific kind of query error.
#[derive(Debug, Clone)]
pub enum QueryErrorKind {
    /// Lexer error (tokenization failed).
    Lex {
        /// Error message.
        message: String,
        /// Byte position in input.
        position: usize,
    },
    /// Parser error (invalid syntax).
    Parse {
        /// Error message.
        message: String,
        /// Approximate byte position in input (if available).
        position: Option<usize>,
    },
    /// The query is well-formed but cannot be applied to the index, for example
    /// because it names a field no record has.
    Compile {
        /// Error message.
        message: String,
    },
}

impl QueryError {
    /// Creates a lex error.
    pub fn lex(message: impl Into<String>, position: usize, query: impl Into<String>) -> Self {
        Self {
            kind: QueryErrorKind::Lex {
                message: message.into(),
                position,
            },
            query: Some(query.into()),
        }
    }

    /// Creates a parse error.
    pub fn parse(
        message: impl Into<String>,
        position: Option<usize>,
        query: Option<String>,
    ) -> Self {
        Self {
            kind: QueryErrorKind::Parse {
                message: message.into(),
                position,
            },
            query,
        }
    }

    /// Creates a compile error.
    pub fn compile(message: impl Into<String>) -> Self {
        Self {
            kind: QueryErrorKind::Compile {
                message: message.into(),
            },
            query: None,
        }
    }

    /// Sets the query string for this error.
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Returns the error message without context.
    pub fn message(&self) -> &str {
        match &self.kind {
            QueryErrorKind::Lex { message, .. }
            | QueryErrorKind::Parse { message, .. }
            | QueryErrorKind::Compile { message } => message,
        }
    }

    /// Returns a suggestion for common errors.
    pub fn suggestion(&self) -> Option<&'static str> {
        match &self.kind {
            QueryErrorKind::Lex { message, .. } if message.contains("unclosed quote") => {
                Some("Add a closing quote (\") to complete the phrase")
            }
            QueryErrorKind::Parse { message, .. } if message.contains("closing parenthesis") => {
                Some("Add a closing parenthesis ) to match the opening one")
            }
            QueryErrorKind::Parse { message, .. } if message.contains("OR") => {
                Some("OR requires expressions on both sides, e.g., 'claw OR intake'")
            }
            QueryErrorKind::Compile { message } if message.contains("unknown field") => {
                Some("Field names are record fields, e.g., title, author, description")
            }
            _ => None,
        }
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match &self.kind {
            QueryErrorKind::Lex { .. } | QueryErrorKind::Parse { .. } => "query syntax error",
            QueryErrorKind::Compile { .. } => "query error",
        };

        writeln!(f, "{prefix}: {}", self.message())?;

        if let Some(query) = &self.query {
            let position = match &self.kind {
                QueryErrorKind::Lex { position, .. } => Some(*position),
                QueryErrorKind::Parse { position, .. } => *position,
                QueryErrorKind::Compile { .. } => None,
            };

            writeln!(f, "  {query}")?;
            if let Some(pos) = position {
                let clamped = pos.min(query.len());
                writeln!(f, "  {}^", " ".repeat(clamped))?;
            }
        }

        if let Some(suggestion) = self.suggestion() {
            write!(f, "hint: {suggestion}")?;
        }

        Ok(())
    }
}

impl Error for QueryError {}

impl From<LexError> for QueryError {
    fn from(err: LexError) -> Self {
        Self {
            kind: QueryErrorKind::Lex {
                message: err.message,
                position: err.position,
            },
            query: Some(err.input),
        }
    }
}

impl From<ParseError> for QueryError {
    fn from(err: ParseError) -> Self {
        Self {
            kind: QueryErrorKind::Parse {
                message: err.message(),
                position: None,
            },
            query: None,
        }
    }
}
