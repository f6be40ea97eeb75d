//! Tokenizer for device-tree source text.
//!
//! Lossless by construction: whitespace and comments become trivia tokens, so
//! the stream concatenates back to the input byte-for-byte. The rewriter and
//! renderer rely on this to leave untouched regions untouched.

use crate::stream::{Token, TokenKind, TokenStream};
use thiserror::Error;

const VERSION_MARKER: &str = "/dts-v1/;";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum LexError {
    #[error("unexpected character {ch:?} at byte {offset}")]
    UnexpectedChar { ch: char, offset: usize },

    #[error("unterminated {what} starting at byte {offset}")]
    Unterminated { what: &'static str, offset: usize },
}

/// Tokenize a complete document, appending the end-of-stream sentinel.
pub fn tokenize(input: &str) -> Result<TokenStream, LexError> {
    let mut tokens = Vec::new();
    let bytes = input.as_bytes();
    let mut pos = 0usize;

    while pos < bytes.len() {
        let rest = &input[pos..];
        let start = pos;

        let (kind, len) = if rest.starts_with(VERSION_MARKER) {
            (TokenKind::Version, VERSION_MARKER.len())
        } else if rest.starts_with("//") {
            (TokenKind::Comment, line_comment_len(rest))
        } else if rest.starts_with("/*") {
            (TokenKind::Comment, block_comment_len(rest, start)?)
        } else if rest.starts_with('"') {
            (TokenKind::Str, string_len(rest, start)?)
        } else if rest.starts_with('<') {
            (TokenKind::CellArray, cell_array_len(rest, start)?)
        } else {
            match bytes[pos] {
                b'{' => (TokenKind::BraceOpen, 1),
                b'}' => (TokenKind::BraceClose, 1),
                b'=' => (TokenKind::Eq, 1),
                b';' => (TokenKind::Semicolon, 1),
                b',' => (TokenKind::Comma, 1),
                b'/' => (TokenKind::Key, 1),
                b'0'..=b'9' => (TokenKind::Number, number_len(rest)),
                c if c.is_ascii_whitespace() => (TokenKind::Whitespace, whitespace_len(rest)),
                c if is_key_start(c) => (TokenKind::Key, key_len(rest)),
                _ => {
                    let ch = rest.chars().next().unwrap_or('\0');
                    return Err(LexError::UnexpectedChar { ch, offset: start });
                }
            }
        };

        tokens.push(Token {
            index: tokens.len(),
            kind,
            text: input[start..start + len].to_string(),
        });
        pos += len;
    }

    tokens.push(Token {
        index: tokens.len(),
        kind: TokenKind::Eof,
        text: String::new(),
    });
    Ok(TokenStream::from_tokens(tokens))
}

fn is_key_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'#' || b == b'&'
}

fn is_key_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'@' | b'#' | b',' | b'.' | b'+')
}

fn key_len(rest: &str) -> usize {
    rest.bytes().take_while(|&b| is_key_continue(b)).count()
}

fn number_len(rest: &str) -> usize {
    rest.bytes()
        .take_while(|&b| b.is_ascii_alphanumeric() || b == b'.')
        .count()
}

fn whitespace_len(rest: &str) -> usize {
    rest.bytes().take_while(|b| b.is_ascii_whitespace()).count()
}

fn line_comment_len(rest: &str) -> usize {
    rest.find('\n').unwrap_or(rest.len())
}

fn block_comment_len(rest: &str, offset: usize) -> Result<usize, LexError> {
    match rest.find("*/") {
        Some(end) => Ok(end + 2),
        None => Err(LexError::Unterminated {
            what: "block comment",
            offset,
        }),
    }
}

fn string_len(rest: &str, offset: usize) -> Result<usize, LexError> {
    let mut escape = false;
    for (idx, ch) in rest.char_indices().skip(1) {
        if escape {
            escape = false;
            continue;
        }
        match ch {
            '\\' => escape = true,
            '"' => return Ok(idx + 1),
            _ => {}
        }
    }
    Err(LexError::Unterminated {
        what: "string literal",
        offset,
    })
}

fn cell_array_len(rest: &str, offset: usize) -> Result<usize, LexError> {
    match rest.find('>') {
        Some(end) => Ok(end + 1),
        None => Err(LexError::Unterminated {
            what: "cell array",
            offset,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input)
            .expect("lex")
            .iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn lex_compact_pair() {
        assert_eq!(
            kinds("k1=<1>;"),
            vec![
                TokenKind::Key,
                TokenKind::Eq,
                TokenKind::CellArray,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_version_marker_as_single_token() {
        let stream = tokenize("/dts-v1/;").expect("lex");
        let first = stream.token_at(0).expect("token");
        assert_eq!(first.kind, TokenKind::Version);
        assert_eq!(first.text, "/dts-v1/;");
    }

    #[test]
    fn lex_root_slash_as_key() {
        assert_eq!(
            kinds("/ {};"),
            vec![
                TokenKind::Key,
                TokenKind::Whitespace,
                TokenKind::BraceOpen,
                TokenKind::BraceClose,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_preserves_input_bytes() {
        let input = "/dts-v1/;\n/ {\n\t/* slots */\n\tinternal_slot@4 = \"a b\"; // x\n};\n";
        let stream = tokenize(input).expect("lex");
        assert_eq!(stream.text(), input);
    }

    #[test]
    fn lex_key_with_at_and_dash() {
        let stream = tokenize("internal_slot@4;").expect("lex");
        assert_eq!(stream.token_at(0).expect("token").text, "internal_slot@4");
        let stream = tokenize("pcie-root;").expect("lex");
        assert_eq!(stream.token_at(0).expect("token").text, "pcie-root");
    }

    #[test]
    fn lex_string_with_escape() {
        let stream = tokenize(r#""a\"b""#).expect("lex");
        let first = stream.token_at(0).expect("token");
        assert_eq!(first.kind, TokenKind::Str);
        assert_eq!(first.text, r#""a\"b""#);
    }

    #[test]
    fn lex_unterminated_string_fails() {
        let err = tokenize("k = \"oops;").expect_err("should fail");
        assert!(matches!(
            err,
            LexError::Unterminated {
                what: "string literal",
                ..
            }
        ));
    }

    #[test]
    fn lex_unterminated_cell_array_fails() {
        let err = tokenize("k = <0x1;").expect_err("should fail");
        assert!(matches!(
            err,
            LexError::Unterminated {
                what: "cell array",
                ..
            }
        ));
    }

    #[test]
    fn eof_sentinel_is_last_and_empty() {
        let stream = tokenize("a;").expect("lex");
        let last = stream.token_at(stream.len() - 1).expect("token");
        assert_eq!(last.kind, TokenKind::Eof);
        assert_eq!(last.text, "");
    }
}
