use std::fmt;

/// Lexical class of a token in a device-tree source document.
///
/// Whitespace and comments are real tokens: the stream preserves every byte
/// of the input, so rendering an unmodified stream reproduces it exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// The leading `/dts-v1/;` version marker, lexed as a single token
    Version,
    BraceOpen,
    BraceClose,
    Eq,
    Semicolon,
    Comma,
    /// A double-quoted string literal, quotes included
    Str,
    /// An angle-bracketed cell array (`<0x00 0x01>`), brackets included
    CellArray,
    Number,
    /// A property or node name; the root name `/` is also a key
    Key,
    Whitespace,
    Comment,
    /// End-of-stream sentinel; always present, always last, empty text
    Eof,
}

impl TokenKind {
    /// Trivia is carried in the stream but invisible to the parser.
    pub fn is_trivia(self) -> bool {
        matches!(self, TokenKind::Whitespace | TokenKind::Comment)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Version => "version marker",
            TokenKind::BraceOpen => "'{'",
            TokenKind::BraceClose => "'}'",
            TokenKind::Eq => "'='",
            TokenKind::Semicolon => "';'",
            TokenKind::Comma => "','",
            TokenKind::Str => "string",
            TokenKind::CellArray => "cell array",
            TokenKind::Number => "number",
            TokenKind::Key => "key",
            TokenKind::Whitespace => "whitespace",
            TokenKind::Comment => "comment",
            TokenKind::Eof => "end of input",
        };
        f.write_str(name)
    }
}

/// A single token: stable index, kind tag, and its exact source text.
///
/// Tokens are immutable once lexed. Edits never touch them; all mutation is
/// deferred to rendering via a [`crate::rewrite::TokenRewriter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub index: usize,
    pub kind: TokenKind,
    pub text: String,
}

/// An ordered, random-access, read-only token sequence backing one document.
#[derive(Debug, Clone, Default)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    pub(crate) fn from_tokens(tokens: Vec<Token>) -> Self {
        debug_assert!(matches!(
            tokens.last().map(|t| t.kind),
            Some(TokenKind::Eof)
        ));
        Self { tokens }
    }

    pub fn token_at(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    /// Number of tokens including the end-of-stream sentinel.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter()
    }

    /// The next non-trivia token strictly after `index`.
    pub fn next_significant(&self, index: usize) -> Option<&Token> {
        self.tokens
            .get(index + 1..)
            .into_iter()
            .flatten()
            .find(|t| !t.kind.is_trivia())
    }

    /// Concatenation of every token's text; reproduces the lexed input.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for token in &self.tokens {
            out.push_str(&token.text);
        }
        out
    }
}
