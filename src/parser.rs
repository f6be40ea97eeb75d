//! Recursive-descent parser for the device-tree grammar.
//!
//! The parser never builds a tree. Its only output is the pre-order sequence
//! of significant terminals in document order, which is exactly what the path
//! indexer consumes. Trivia tokens are skipped here but stay in the stream.
//!
//! Grammar:
//!
//! ```text
//! document := Version? pair* Eof
//! pair     := Key ( '=' value (',' value)* | block )? ';'
//! block    := '{' pair* '}'
//! value    := Str | CellArray | Number
//! ```

use crate::stream::{TokenKind, TokenStream};
use thiserror::Error;

/// One terminal-visitation event: the token's kind tag and stream index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Terminal {
    pub kind: TokenKind,
    pub index: usize,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("unexpected {found} at token {index}, expected {expected}")]
    Unexpected {
        expected: &'static str,
        found: TokenKind,
        index: usize,
    },
}

/// Parse a token stream, returning every significant terminal in document
/// order. Fails on malformed input without producing a partial event list.
pub fn parse(stream: &TokenStream) -> Result<Vec<Terminal>, ParseError> {
    let mut parser = Parser {
        stream,
        pos: 0,
        events: Vec::new(),
    };

    if parser.peek().0 == TokenKind::Version {
        parser.bump();
    }
    while parser.peek().0 != TokenKind::Eof {
        parser.parse_pair()?;
    }
    Ok(parser.events)
}

struct Parser<'a> {
    stream: &'a TokenStream,
    pos: usize,
    events: Vec<Terminal>,
}

impl Parser<'_> {
    /// Kind and index of the next non-trivia token; advances past trivia.
    fn peek(&mut self) -> (TokenKind, usize) {
        let mut i = self.pos;
        while let Some(token) = self.stream.token_at(i) {
            if token.kind.is_trivia() {
                i += 1;
                continue;
            }
            self.pos = i;
            return (token.kind, token.index);
        }
        // The Eof sentinel is not trivia, so the loop always returns first.
        (TokenKind::Eof, self.stream.len().saturating_sub(1))
    }

    fn bump(&mut self) -> Terminal {
        let (kind, index) = self.peek();
        let terminal = Terminal { kind, index };
        if kind != TokenKind::Eof {
            self.pos = index + 1;
            self.events.push(terminal);
        }
        terminal
    }

    fn expect(&mut self, kind: TokenKind, expected: &'static str) -> Result<Terminal, ParseError> {
        let (found, index) = self.peek();
        if found == kind {
            Ok(self.bump())
        } else {
            Err(ParseError::Unexpected {
                expected,
                found,
                index,
            })
        }
    }

    fn parse_pair(&mut self) -> Result<(), ParseError> {
        self.expect(TokenKind::Key, "property or node name")?;
        match self.peek().0 {
            TokenKind::Eq => {
                self.bump();
                self.parse_value()?;
                while self.peek().0 == TokenKind::Comma {
                    self.bump();
                    self.parse_value()?;
                }
            }
            TokenKind::BraceOpen => self.parse_block()?,
            // Bare key: a boolean property with no value.
            _ => {}
        }
        self.expect(TokenKind::Semicolon, "';'")?;
        Ok(())
    }

    fn parse_block(&mut self) -> Result<(), ParseError> {
        self.expect(TokenKind::BraceOpen, "'{'")?;
        while self.peek().0 != TokenKind::BraceClose {
            if self.peek().0 == TokenKind::Eof {
                let (found, index) = self.peek();
                return Err(ParseError::Unexpected {
                    expected: "'}'",
                    found,
                    index,
                });
            }
            self.parse_pair()?;
        }
        self.expect(TokenKind::BraceClose, "'}'")?;
        Ok(())
    }

    fn parse_value(&mut self) -> Result<(), ParseError> {
        let (found, index) = self.peek();
        match found {
            TokenKind::Str | TokenKind::CellArray | TokenKind::Number => {
                self.bump();
                Ok(())
            }
            _ => Err(ParseError::Unexpected {
                expected: "property value",
                found,
                index,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn terminals(input: &str) -> Vec<(TokenKind, usize)> {
        let stream = tokenize(input).expect("lex");
        parse(&stream)
            .expect("parse")
            .into_iter()
            .map(|t| (t.kind, t.index))
            .collect()
    }

    #[test]
    fn document_order_terminals() {
        let events = terminals("/ { k = \"v\"; };");
        let kinds: Vec<TokenKind> = events.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Key,
                TokenKind::BraceOpen,
                TokenKind::Key,
                TokenKind::Eq,
                TokenKind::Str,
                TokenKind::Semicolon,
                TokenKind::BraceClose,
                TokenKind::Semicolon,
            ]
        );
    }

    #[test]
    fn terminal_indices_count_trivia() {
        // "k = <1>;" puts whitespace at indices 1 and 3.
        let events = terminals("k = <1>;");
        assert_eq!(
            events,
            vec![
                (TokenKind::Key, 0),
                (TokenKind::Eq, 2),
                (TokenKind::CellArray, 4),
                (TokenKind::Semicolon, 5),
            ]
        );
    }

    #[test]
    fn version_marker_then_nodes() {
        let events = terminals("/dts-v1/;\n/ { };");
        assert_eq!(events[0].0, TokenKind::Version);
        assert_eq!(events[1].0, TokenKind::Key);
    }

    #[test]
    fn comma_separated_values() {
        let events = terminals("compatible = \"a\", \"b\";");
        let kinds: Vec<TokenKind> = events.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Key,
                TokenKind::Eq,
                TokenKind::Str,
                TokenKind::Comma,
                TokenKind::Str,
                TokenKind::Semicolon,
            ]
        );
    }

    #[test]
    fn boolean_property_without_value() {
        let events = terminals("read-only;");
        let kinds: Vec<TokenKind> = events.iter().map(|(k, _)| *k).collect();
        assert_eq!(kinds, vec![TokenKind::Key, TokenKind::Semicolon]);
    }

    #[test]
    fn unbalanced_block_is_rejected() {
        let stream = tokenize("/ { a = <1>;").expect("lex");
        let err = parse(&stream).expect_err("should fail");
        assert!(matches!(
            err,
            ParseError::Unexpected {
                expected: "'}'",
                found: TokenKind::Eof,
                ..
            }
        ));
    }

    #[test]
    fn missing_semicolon_is_rejected() {
        let stream = tokenize("k = <1>").expect("lex");
        let err = parse(&stream).expect_err("should fail");
        assert!(matches!(err, ParseError::Unexpected { expected: "';'", .. }));
    }
}
