//! Query parser.
//!
//! Parses a token stream into a query AST using recursive descent.
//!
//! # Grammar
//!
//! ```text
//! query      → or_expr
//! or_expr    → and_expr ("OR" and_expr)*
//! and_expr   → unary+
//! unary      → "-" unary | primary
//! primary    → TERM | PHRASE | field_expr | "(" or_expr ")"
//! field_expr → FIELD_PREFIX (TERM | PHRASE | "(" or_expr ")")
//! ```
//!
//! # Precedence (highest to lowest)
//!
//! 1. Grouping: `(...)`
//! 2. Field prefix: `field:`
//! 3. Negation: `-`
//! 4. AND (implicit, between adjacent terms)
//! 5. OR (explicit keyword)

use std::mem;

use crate::{
    ast::QueryExpr,
    error::{ParseError, QueryError},
    lexer::{Spanned, Token, tokenize_spanned},
};

/// Recursive descent parser for query expressions.
struct Parser {
    /// Token stream to parse.
    tokens: Vec<Token>,
    /// Current position in token stream.
    position: usize,
}

impl Parser {
    /// Creates a new parser from a token stream.
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    /// Parses the token stream into a query expression.
    fn parse(mut self) -> Result<Option<QueryExpr>, ParseError> {
        if self.tokens.is_empty() {
            return Ok(None);
        }

        let expr = self.parse_or_expr()?;

        if let Some(token) = self.peek() {
            let message = match token {
                Token::RParen => "unexpected closing parenthesis".to_string(),
                other => format!("unexpected token: {other:?}"),
            };
            return Err(ParseError::at(message, self.position));
        }

        Ok(Some(expr))
    }

    /// Parses: or_expr → and_expr ("OR" and_expr)*
    fn parse_or_expr(&mut self) -> Result<QueryExpr, ParseError> {
        let mut left = self.parse_and_expr()?;

        while self.check(&Token::Or) {
            self.advance();
            let right = self.parse_and_expr()?;
            left = QueryExpr::or(vec![left, right]);
        }

        Ok(left)
    }

    /// Parses: and_expr → unary+
    fn parse_and_expr(&mut self) -> Result<QueryExpr, ParseError> {
        let mut exprs = vec![self.parse_unary()?];

        while self.can_start_unary() {
            exprs.push(self.parse_unary()?);
        }

        Ok(QueryExpr::and(exprs))
    }

    /// Checks if the current token can start a unary expression.
    fn can_start_unary(&self) -> bool {
        matches!(
            self.peek(),
            Some(
                Token::Term(_)
                    | Token::Phrase(_)
                    | Token::Not
                    | Token::LParen
                    | Token::FieldPrefix(_)
            )
        )
    }

    /// Parses: unary → "-" unary | primary
    fn parse_unary(&mut self) -> Result<QueryExpr, ParseError> {
        if self.check(&Token::Not) {
            self.advance();
            let expr = self.parse_unary()?;
            return Ok(QueryExpr::Not(Box::new(expr)));
        }

        self.parse_primary()
    }

    /// Parses: primary → TERM | PHRASE | field_expr | "(" or_expr ")"
    fn parse_primary(&mut self) -> Result<QueryExpr, ParseError> {
        match self.peek().cloned() {
            Some(Token::Term(text)) => {
                self.advance();
                Ok(QueryExpr::Term(text))
            }
            Some(Token::Phrase(text)) => {
                self.advance();
                Ok(phrase_expr(&text))
            }
            Some(Token::FieldPrefix(name)) => {
                self.advance();
                self.parse_field_expr(name)
            }
            Some(Token::LParen) => self.parse_group("expected closing parenthesis"),
            Some(Token::RParen) => Err(ParseError::at(
                "unexpected closing parenthesis",
                self.position,
            )),
            Some(Token::Or) => Err(ParseError::at(
                "unexpected OR (needs expression before it)",
                self.position,
            )),
            Some(Token::Not) => Err(ParseError::at("unexpected negation", self.position)),
            None => Err(ParseError::UnexpectedEnd),
        }
    }

    /// Parses the expression after a field prefix.
    fn parse_field_expr(&mut self, name: String) -> Result<QueryExpr, ParseError> {
        let expr = match self.peek().cloned() {
            Some(Token::Term(text)) => {
                self.advance();
                QueryExpr::Term(text)
            }
            Some(Token::Phrase(text)) => {
                self.advance();
                phrase_expr(&text)
            }
            Some(Token::LParen) => {
                self.parse_group("expected closing parenthesis after field expression")?
            }
            _ => {
                return Err(ParseError::at(
                    format!("expected term, phrase, or group after '{name}:'"),
                    self.position,
                ));
            }
        };

        Ok(QueryExpr::Field {
            name,
            expr: Box::new(expr),
        })
    }

    /// Parses a parenthesized group, consuming the surrounding parentheses.
    fn parse_group(&mut self, missing_rparen_msg: &str) -> Result<QueryExpr, ParseError> {
        self.advance(); // (
        let inner = self.parse_or_expr()?;

        if !self.check(&Token::RParen) {
            return Err(ParseError::at(missing_rparen_msg, self.position));
        }
        self.advance(); // )

        Ok(inner)
    }

    /// Returns the current token without consuming it.
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    /// Checks if the current token matches the given token.
    fn check(&self, token: &Token) -> bool {
        self.peek()
            .is_some_and(|t| mem::discriminant(t) == mem::discriminant(token))
    }

    /// Advances to the next token.
    fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }
}

/// Builds the expression for a quoted phrase; a one-word phrase is a plain term.
fn phrase_expr(text: &str) -> QueryExpr {
    let mut words: Vec<String> = text.split_whitespace().map(String::from).collect();
    match words.len() {
        0 => QueryExpr::And(vec![]),
        1 => QueryExpr::Term(words.remove(0)),
        _ => QueryExpr::Phrase(words),
    }
}

/// Maps a token-level parse error onto a byte offset in the input.
fn locate(err: ParseError, spans: &[Spanned], input: &str) -> QueryError {
    let position = match err {
        ParseError::Unexpected { index, .. } => spans.get(index).map_or(input.len(), |(_, at)| *at),
        ParseError::UnexpectedEnd => input.len(),
    };
    QueryError::parse(err.message(), Some(position), Some(input.to_string()))
}

/// Parses a query string into an AST.
///
/// Returns `Ok(None)` for empty queries, `Ok(Some(expr))` for valid queries,
/// or `Err(QueryError)` for invalid syntax.
pub fn parse(input: &str) -> Result<Option<QueryExpr>, QueryError> {
    let spanned = tokenize_spanned(input).map_err(QueryError::from)?;
    let tokens = spanned.iter().map(|(token, _)| token.clone()).collect();
    Parser::new(tokens)
        .parse()
        .map_err(|err| locate(err, &spanned, input))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::QueryErrorKind;

    fn term(s: &str) -> QueryExpr {
        QueryExpr::Term(s.into())
    }

    fn phrase(words: &[&str]) -> QueryExpr {
        QueryExpr::Phrase(words.iter().map(|s| (*s).to_string()).collect())
    }

    fn not(e: QueryExpr) -> QueryExpr {
        QueryExpr::Not(Box::new(e))
    }

    fn and(exprs: Vec<QueryExpr>) -> QueryExpr {
        QueryExpr::and(exprs)
    }

    fn or(exprs: Vec<QueryExpr>) -> QueryExpr {
        QueryExpr::or(exprs)
    }

    fn field(name: &str, e: QueryExpr) -> QueryExpr {
        QueryExpr::Field {
            name: name.into(),
            expr: Box::new(e),
        }
    }

    fn error_position(err: &QueryError) -> Option<usize> {
        match err.kind {
            QueryErrorKind::Parse { position, .. } => position,
            QueryErrorKind::Lex { position, .. } => Some(position),
            QueryErrorKind::Compile { .. } => None,
        }
    }

    #[test]
    fn empty_query() {
        assert_eq!(parse("").unwrap(), None);
        assert_eq!(parse("   ").unwrap(), None);
    }

    #[test]
    fn single_term() {
        assert_eq!(parse("drivetrain").unwrap(), Some(term("drivetrain")));
    }

    #[test]
    fn multiple_terms_and() {
        assert_eq!(
            parse("mecanum drivetrain java").unwrap(),
            Some(and(vec![term("mecanum"), term("drivetrain"), term("java")]))
        );
    }

    #[test]
    fn quoted_phrase() {
        assert_eq!(
            parse("\"dead axle\"").unwrap(),
            Some(phrase(&["dead", "axle"]))
        );
    }

    #[test]
    fn single_word_phrase_is_term() {
        assert_eq!(parse("\"claw\"").unwrap(), Some(term("claw")));
    }

    #[test]
    fn or_binds_looser_than_and() {
        assert_eq!(
            parse("servo claw OR intake").unwrap(),
            Some(or(vec![
                and(vec![term("servo"), term("claw")]),
                term("intake")
            ]))
        );
    }

    #[test]
    fn chained_or() {
        assert_eq!(
            parse("claw OR intake OR outtake").unwrap(),
            Some(or(vec![term("claw"), term("intake"), term("outtake")]))
        );
    }

    #[test]
    fn negation_with_term() {
        assert_eq!(
            parse("drivetrain -swerve").unwrap(),
            Some(and(vec![term("drivetrain"), not(term("swerve"))]))
        );
    }

    #[test]
    fn double_negation() {
        assert_eq!(parse("--claw").unwrap(), Some(not(not(term("claw")))));
    }

    #[test]
    fn grouped_or() {
        assert_eq!(
            parse("(mecanum OR tank) drivetrain").unwrap(),
            Some(and(vec![
                or(vec![term("mecanum"), term("tank")]),
                term("drivetrain")
            ]))
        );
    }

    #[test]
    fn field_forms() {
        assert_eq!(
            parse("author:smith").unwrap(),
            Some(field("author", term("smith")))
        );
        assert_eq!(
            parse("title:\"power transmission\"").unwrap(),
            Some(field("title", phrase(&["power", "transmission"])))
        );
        assert_eq!(
            parse("language:(java OR kotlin)").unwrap(),
            Some(field("language", or(vec![term("java"), term("kotlin")])))
        );
    }

    #[test]
    fn complex_query() {
        assert_eq!(
            parse("language:java (mecanum OR tank) -swerve").unwrap(),
            Some(and(vec![
                field("language", term("java")),
                or(vec![term("mecanum"), term("tank")]),
                not(term("swerve"))
            ]))
        );
    }

    #[test]
    fn negated_field() {
        assert_eq!(
            parse("-language:python").unwrap(),
            Some(not(field("language", term("python"))))
        );
    }

    #[test]
    fn error_unclosed_paren() {
        let err = parse("(claw servo").unwrap_err();
        assert!(err.message().contains("closing parenthesis"));
        assert_eq!(error_position(&err), Some(11));
    }

    #[test]
    fn error_unexpected_rparen() {
        let err = parse("claw) servo").unwrap_err();
        assert!(err.message().contains("unexpected closing parenthesis"));
        assert_eq!(error_position(&err), Some(4));
    }

    #[test]
    fn error_or_at_start() {
        let err = parse("OR claw").unwrap_err();
        assert!(err.message().contains("OR"));
        assert_eq!(error_position(&err), Some(0));
    }

    #[test]
    fn error_or_at_end() {
        let err = parse("claw OR").unwrap_err();
        assert!(err.message().contains("end of query"));
        assert_eq!(error_position(&err), Some(7));
    }

    #[test]
    fn error_field_without_value() {
        let err = parse("title:").unwrap_err();
        assert!(err.message().contains("expected"));
    }

    #[test]
    fn error_unclosed_quote() {
        let err = parse("\"unclosed").unwrap_err();
        assert!(err.message().contains("unclosed"));
    }

    #[test]
    fn error_keeps_query_for_display() {
        let err = parse("(claw").unwrap_err();
        assert_eq!(err.query.as_deref(), Some("(claw"));
        assert!(err.to_string().contains("hint:"));
    }

    #[test]
    fn query_string_reparses() {
        let expr = parse("title:(claw OR intake) -\"dead axle\" servo")
            .unwrap()
            .unwrap();
        assert_eq!(parse(&expr.to_query_string()).unwrap(), Some(expr));
    }
}
