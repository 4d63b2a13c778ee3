//! Query grammar and AST for vault catalog search.
//!
//! Queries are free text with a small amount of structure:
//!
//! - **Terms**: `mecanum` - words that add relevance weight
//! - **Phrases**: `"dead axle"` - words that must appear together
//! - **Negation**: `-python` - terms that must NOT appear
//! - **OR**: `claw OR intake` - at least one alternative must appear
//! - **Grouping**: `(claw servo) OR intake` - precedence control
//! - **Fields**: `author:smith` - restrict a match to one record field
//!
//! # Example
//!
//! ```
//! use vault_query::parse;
//!
//! let expr = parse("language:java (mecanum OR tank) -swerve").unwrap();
//! assert!(expr.is_some());
//! ```

#![warn(missing_docs)]

mod ast;
mod error;
mod lexer;
mod parser;

pub use ast::QueryExpr;
pub use error::{LexError, ParseError, QueryError, QueryErrorKind};
pub use lexer::{Token, tokenize};
pub use parser::parse;
