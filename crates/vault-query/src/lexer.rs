//! Query lexer (tokenizer).
//!
//! Converts a query string into a stream of tokens for the parser.

use std::{iter::Peekable, str::Chars};

use crate::error::LexError;

/// A token in the query language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A bare word (search term).
    Term(String),

    /// A quoted phrase (the quotes are stripped, content preserved).
    Phrase(String),

    /// The OR keyword.
    Or,

    /// Negation prefix (-).
    Not,

    /// Left parenthesis.
    LParen,

    /// Right parenthesis.
    RParen,

    /// Field prefix (e.g., "title:" produces FieldPrefix("title")).
    FieldPrefix(String),
}

/// A token together with the byte offset where it starts.
pub type Spanned = (Token, usize);

/// Tokenizes a query string.
struct Lexer<'a> {
    /// The original input string.
    input: &'a str,
    /// Character iterator with one-character lookahead.
    chars: Peekable<Chars<'a>>,
    /// Current byte position in input.
    position: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input.
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.chars().peekable(),
            position: 0,
        }
    }

    /// Tokenizes the entire input, returning all tokens or an error.
    fn tokenize(mut self) -> Result<Vec<Spanned>, LexError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();
            if self.chars.peek().is_none() {
                break;
            }
            let start = self.position;
            // Every call consumes input, so stray colons just vanish.
            if let Some(token) = self.next_token()? {
                tokens.push((token, start));
            }
        }

        Ok(tokens)
    }

    /// Returns the next token, or None if at end of input.
    fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        let Some(&ch) = self.chars.peek() else {
            return Ok(None);
        };

        match ch {
            '"' => self.read_phrase().map(Some),
            '(' => {
                self.advance();
                Ok(Some(Token::LParen))
            }
            ')' => {
                self.advance();
                Ok(Some(Token::RParen))
            }
            '-' => {
                self.advance();
                Ok(Some(Token::Not))
            }
            _ => Ok(self.read_term_or_keyword()),
        }
    }

    /// Reads a quoted phrase.
    fn read_phrase(&mut self) -> Result<Token, LexError> {
        let start_pos = self.position;
        self.advance(); // opening quote

        let mut content = String::new();
        loop {
            match self.chars.peek() {
                Some(&'"') => {
                    self.advance();
                    return Ok(Token::Phrase(content));
                }
                Some(&ch) => {
                    content.push(ch);
                    self.advance();
                }
                None => return Err(LexError::new("unclosed quote", start_pos, self.input)),
            }
        }
    }

    /// Reads a term, keyword (OR), or field prefix.
    fn read_term_or_keyword(&mut self) -> Option<Token> {
        let mut word = String::new();

        while let Some(&ch) = self.chars.peek() {
            if ch.is_whitespace() || ch == '(' || ch == ')' || ch == '"' {
                break;
            }

            if ch == ':' {
                self.advance();
                if word.is_empty() {
                    // Bare colon, treat as part of next term
                    continue;
                }
                return Some(Token::FieldPrefix(word));
            }

            word.push(ch);
            self.advance();
        }

        if word.is_empty() {
            return None;
        }

        if word.eq_ignore_ascii_case("OR") {
            return Some(Token::Or);
        }

        Some(Token::Term(word))
    }

    /// Skips whitespace characters.
    fn skip_whitespace(&mut self) {
        while self.chars.peek().is_some_and(|ch| ch.is_whitespace()) {
            self.advance();
        }
    }

    /// Advances to the next character.
    fn advance(&mut self) {
        if let Some(ch) = self.chars.next() {
            self.position += ch.len_utf8();
        }
    }
}

/// Tokenizes a query string, keeping the byte offset of every token.
pub fn tokenize_spanned(input: &str) -> Result<Vec<Spanned>, LexError> {
    Lexer::new(input).tokenize()
}

/// Convenience function to tokenize a query string.
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    Ok(tokenize_spanned(input)?
        .into_iter()
        .map(|(token, _)| token)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn term(s: &str) -> Token {
        Token::Term(s.into())
    }

    #[test]
    fn empty_input() {
        assert_eq!(tokenize("").unwrap(), vec![]);
        assert_eq!(tokenize("   ").unwrap(), vec![]);
    }

    #[test]
    fn multiple_terms() {
        assert_eq!(
            tokenize("  mecanum   drivetrain ").unwrap(),
            vec![term("mecanum"), term("drivetrain")]
        );
    }

    #[test]
    fn quoted_phrase() {
        assert_eq!(
            tokenize("\"dead axle\"").unwrap(),
            vec![Token::Phrase("dead axle".into())]
        );
    }

    #[test]
    fn unclosed_quote_error() {
        let err = tokenize("claw \"dead axle").unwrap_err();
        assert_eq!(err.position, 5);
        assert!(err.message.contains("unclosed"));
    }

    #[test]
    fn or_keyword_any_case() {
        for query in ["claw OR intake", "claw or intake", "claw Or intake"] {
            assert_eq!(
                tokenize(query).unwrap(),
                vec![term("claw"), Token::Or, term("intake")]
            );
        }
    }

    #[test]
    fn leading_dash_negates() {
        assert_eq!(
            tokenize("claw -python").unwrap(),
            vec![term("claw"), Token::Not, term("python")]
        );
    }

    #[test]
    fn inner_dash_is_part_of_term() {
        assert_eq!(
            tokenize("2024-2025 team-number").unwrap(),
            vec![term("2024-2025"), term("team-number")]
        );
    }

    #[test]
    fn caret_is_part_of_term() {
        assert_eq!(tokenize("x^2").unwrap(), vec![term("x^2")]);
    }

    #[test]
    fn field_prefix() {
        assert_eq!(
            tokenize("author:smith claw").unwrap(),
            vec![Token::FieldPrefix("author".into()), term("smith"), term("claw")]
        );
    }

    #[test]
    fn field_with_phrase() {
        assert_eq!(
            tokenize("title:\"power transmission\"").unwrap(),
            vec![
                Token::FieldPrefix("title".into()),
                Token::Phrase("power transmission".into())
            ]
        );
    }

    #[test]
    fn complex_query() {
        assert_eq!(
            tokenize("language:java (mecanum OR tank) -swerve").unwrap(),
            vec![
                Token::FieldPrefix("language".into()),
                term("java"),
                Token::LParen,
                term("mecanum"),
                Token::Or,
                term("tank"),
                Token::RParen,
                Token::Not,
                term("swerve")
            ]
        );
    }

    #[test]
    fn stray_colon_is_dropped() {
        assert_eq!(tokenize(": claw").unwrap(), vec![term("claw")]);
    }

    #[test]
    fn spans_point_at_token_starts() {
        let spans: Vec<usize> = tokenize_spanned("a (bb) \"c d\"")
            .unwrap()
            .into_iter()
            .map(|(_, at)| at)
            .collect();
        assert_eq!(spans, vec![0, 2, 3, 5, 7]);
    }
}
