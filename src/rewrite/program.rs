//! Deferred-edit program over a read-only token stream.
//!
//! Callers queue inserts, replacements, and deletions anchored at token
//! indices; nothing touches the stream until [`TokenRewriter::get_text`]
//! reduces the log and emits the final document in one linear pass.

use crate::rewrite::errors::RewriteError;
use crate::rewrite::op::{InsertOrigin, RewriteOp};
use crate::rewrite::reduce::reduce;
use crate::stream::{TokenKind, TokenStream};
use std::collections::HashMap;

/// Name of the program used when the caller does not pick one.
pub const DEFAULT_PROGRAM: &str = "default";

/// An ordered log of pending rewrite operations, keyed by program name.
///
/// The rewriter holds only the stream length, not the stream itself, so a
/// document type can own both without self-reference; the stream is passed
/// back in at render time.
#[derive(Debug, Clone)]
pub struct TokenRewriter {
    stream_len: usize,
    programs: HashMap<String, Vec<Option<RewriteOp>>>,
}

impl TokenRewriter {
    pub fn new(stream_len: usize) -> Self {
        Self {
            stream_len,
            programs: HashMap::new(),
        }
    }

    /// Queue text to render immediately before the token at `index`.
    pub fn insert_before(&mut self, index: usize, text: impl Into<String>) {
        self.insert_before_in(DEFAULT_PROGRAM, index, text);
    }

    pub fn insert_before_in(&mut self, program: &str, index: usize, text: impl Into<String>) {
        self.push(
            program,
            RewriteOp::Insert {
                index,
                text: text.into(),
                origin: InsertOrigin::Before,
            },
        );
    }

    /// Queue text to render immediately after the token at `index`.
    ///
    /// Normalized at once to an insert before `index + 1`; the after-origin
    /// is kept because it changes merge order when inserts collide.
    pub fn insert_after(&mut self, index: usize, text: impl Into<String>) {
        self.insert_after_in(DEFAULT_PROGRAM, index, text);
    }

    pub fn insert_after_in(&mut self, program: &str, index: usize, text: impl Into<String>) {
        self.push(
            program,
            RewriteOp::Insert {
                index: index + 1,
                text: text.into(),
                origin: InsertOrigin::After,
            },
        );
    }

    /// Queue a replacement of tokens `from..=to`. Bounds are validated at
    /// queue time; a rejected operation is not recorded.
    pub fn replace(
        &mut self,
        from: usize,
        to: usize,
        text: impl Into<String>,
    ) -> Result<(), RewriteError> {
        self.replace_in(DEFAULT_PROGRAM, from, to, Some(text.into()))
    }

    /// Queue a replacement of the single token at `index`.
    pub fn replace_single(
        &mut self,
        index: usize,
        text: impl Into<String>,
    ) -> Result<(), RewriteError> {
        self.replace_in(DEFAULT_PROGRAM, index, index, Some(text.into()))
    }

    /// Queue a pure deletion of tokens `from..=to`.
    pub fn delete(&mut self, from: usize, to: usize) -> Result<(), RewriteError> {
        self.replace_in(DEFAULT_PROGRAM, from, to, None)
    }

    pub fn replace_in(
        &mut self,
        program: &str,
        from: usize,
        to: usize,
        text: Option<String>,
    ) -> Result<(), RewriteError> {
        if from > to || to >= self.stream_len {
            return Err(RewriteError::OutOfRange {
                from,
                to,
                len: self.stream_len,
            });
        }
        self.push(program, RewriteOp::Replace { from, to, text });
        Ok(())
    }

    fn push(&mut self, program: &str, op: RewriteOp) {
        self.programs.entry(program.to_string()).or_default().push(Some(op));
    }

    /// Number of queued (non-retracted) operations in the default program.
    pub fn pending(&self) -> usize {
        self.programs
            .get(DEFAULT_PROGRAM)
            .map(|log| log.iter().flatten().count())
            .unwrap_or(0)
    }

    /// Render the whole document with the default program applied.
    pub fn get_text(&self, tokens: &TokenStream) -> Result<String, RewriteError> {
        self.get_text_in(DEFAULT_PROGRAM, tokens, 0, tokens.len().saturating_sub(1))
    }

    /// Render the inclusive token range `[start, stop]` with the default
    /// program applied.
    pub fn get_text_range(
        &self,
        tokens: &TokenStream,
        start: usize,
        stop: usize,
    ) -> Result<String, RewriteError> {
        self.get_text_in(DEFAULT_PROGRAM, tokens, start, stop)
    }

    pub fn get_text_in(
        &self,
        program: &str,
        tokens: &TokenStream,
        start: usize,
        stop: usize,
    ) -> Result<String, RewriteError> {
        let len = tokens.len();
        let stop = stop.min(len.saturating_sub(1));

        let log = self.programs.get(program);
        if log.map(|ops| ops.is_empty()).unwrap_or(true) {
            let mut out = String::new();
            for i in start..=stop {
                if let Some(token) = tokens.token_at(i) {
                    if token.kind != TokenKind::Eof {
                        out.push_str(&token.text);
                    }
                }
            }
            return Ok(out);
        }

        let mut log = log.cloned().unwrap_or_default();
        let mut reduced = reduce(&mut log)?;

        let mut out = String::new();
        let mut i = start;
        while i <= stop && i < len {
            match reduced.remove(&i) {
                Some((_, op)) => i = execute(&op, tokens, &mut out),
                None => {
                    if let Some(token) = tokens.token_at(i) {
                        if token.kind != TokenKind::Eof {
                            out.push_str(&token.text);
                        }
                    }
                    i += 1;
                }
            }
        }

        // Operations anchored at or past the final index are trailing
        // inserts; append them in issue order when rendering to the end.
        if stop + 1 == len {
            let mut rest: Vec<(usize, RewriteOp)> = reduced.into_values().collect();
            rest.sort_unstable_by_key(|(slot, _)| *slot);
            for (_, op) in rest {
                if op.anchor() < len.saturating_sub(1) {
                    continue;
                }
                match op {
                    RewriteOp::Insert { text, .. } => out.push_str(&text),
                    RewriteOp::Replace { text, .. } => {
                        if let Some(text) = text {
                            out.push_str(&text);
                        }
                    }
                }
            }
        }

        Ok(out)
    }
}

fn execute(op: &RewriteOp, tokens: &TokenStream, out: &mut String) -> usize {
    match op {
        RewriteOp::Insert { index, text, .. } => {
            out.push_str(text);
            if let Some(token) = tokens.token_at(*index) {
                if token.kind != TokenKind::Eof {
                    out.push_str(&token.text);
                }
            }
            index + 1
        }
        RewriteOp::Replace { to, text, .. } => {
            if let Some(text) = text {
                out.push_str(text);
            }
            to + 1
        }
    }
}
