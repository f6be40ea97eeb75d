//! High-level patching facade: parse once, queue value replacements by
//! path, render once.

use crate::dts::errors::{DtsError, PatchError};
use crate::dts::indexer::{index_document, PathIndex};
use crate::lexer::tokenize;
use crate::parser::parse;
use crate::rewrite::{RewriteError, TokenRewriter};
use crate::stream::{TokenKind, TokenStream};
use serde::{Deserialize, Serialize};

/// One requested edit: a hierarchical path and the literal replacement text
/// for its value token.
///
/// The value is emitted exactly as given; callers are responsible for
/// quoting (`"\"00:12.0\""`) or cell-array syntax (`"<0x00>"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patch {
    pub path: String,
    pub value: String,
}

impl Patch {
    pub fn new(path: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            value: value.into(),
        }
    }
}

/// A parsed document with its path index and pending rewrite program.
///
/// The pipeline runs one direction: token stream -> path indexer (map plus
/// formatting edits) -> `put` (value-replacement edits) -> reduce -> render.
/// The stream itself is never mutated.
pub struct DtsEditor {
    stream: TokenStream,
    rewriter: TokenRewriter,
    index: PathIndex,
}

impl DtsEditor {
    /// Lex, parse, and index a document. Indexing queues the formatting
    /// edits as a side effect of the same pass that builds the path map.
    pub fn parse(content: &str) -> Result<Self, DtsError> {
        let stream = tokenize(content)?;
        let terminals = parse(&stream)?;
        let mut rewriter = TokenRewriter::new(stream.len());
        let index = index_document(&stream, &terminals, &mut rewriter);
        Ok(Self {
            stream,
            rewriter,
            index,
        })
    }

    /// Queue a replacement of the value assigned at `path`.
    ///
    /// The key token must be followed by the assignment operator; a key that
    /// introduces a nested block is a structural mismatch. Repeated puts on
    /// one path target the identical single-token span and collapse during
    /// reduction, latest value winning.
    pub fn put(&mut self, path: &str, value: &str) -> Result<(), PatchError> {
        let key_index = self
            .index
            .get(path)
            .ok_or_else(|| PatchError::PathNotFound {
                path: path.to_string(),
            })?;

        let eq = match self.stream.next_significant(key_index) {
            Some(token) if token.kind == TokenKind::Eq => token.index,
            _ => {
                return Err(PatchError::StructuralMismatch {
                    path: path.to_string(),
                });
            }
        };
        let value_index = match self.stream.next_significant(eq) {
            Some(token) if !matches!(token.kind, TokenKind::Eof) => token.index,
            _ => {
                return Err(PatchError::StructuralMismatch {
                    path: path.to_string(),
                });
            }
        };

        self.rewriter
            .replace_single(value_index, value)
            .map_err(|source| PatchError::Rewrite {
                path: path.to_string(),
                source,
            })
    }

    /// Apply a batch of patches, collecting one outcome per patch. Per-patch
    /// failures never abort the batch.
    pub fn apply(&mut self, patches: &[Patch]) -> Vec<(String, Result<(), PatchError>)> {
        patches
            .iter()
            .map(|patch| (patch.path.clone(), self.put(&patch.path, &patch.value)))
            .collect()
    }

    /// Render the full document: reduce the rewrite program and walk the
    /// stream once. Either a complete document or an explicit failure;
    /// partial output is never returned.
    pub fn render(&self) -> Result<String, RewriteError> {
        self.rewriter.get_text(&self.stream)
    }

    /// Render an inclusive token index range.
    pub fn render_range(&self, start: usize, stop: usize) -> Result<String, RewriteError> {
        self.rewriter.get_text_range(&self.stream, start, stop)
    }

    pub fn paths(&self) -> &PathIndex {
        &self.index
    }

    pub fn stream(&self) -> &TokenStream {
        &self.stream
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_replaces_only_the_value_token() {
        let mut editor = DtsEditor::parse("/{k=\"old\";};").expect("parse");
        editor.put("/k", "\"new\"").expect("put");
        let out = editor.render().expect("render");
        assert!(out.contains("k = \"new\";"));
        assert!(!out.contains("old"));
    }

    #[test]
    fn put_missing_path_is_path_not_found() {
        let mut editor = DtsEditor::parse("/{k=\"v\";};").expect("parse");
        let err = editor.put("/nope", "\"x\"").expect_err("missing path");
        assert!(matches!(err, PatchError::PathNotFound { .. }));
    }

    #[test]
    fn put_on_block_path_is_structural_mismatch() {
        let mut editor = DtsEditor::parse("/{a{k=<1>;};};").expect("parse");
        let err = editor.put("/a", "\"x\"").expect_err("block path");
        assert!(matches!(err, PatchError::StructuralMismatch { .. }));
    }

    #[test]
    fn put_on_boolean_property_is_structural_mismatch() {
        let mut editor = DtsEditor::parse("/{flag;};").expect("parse");
        let err = editor.put("/flag", "\"x\"").expect_err("no assignment");
        assert!(matches!(err, PatchError::StructuralMismatch { .. }));
    }

    #[test]
    fn double_put_keeps_latest_value() {
        let mut editor = DtsEditor::parse("/{k=\"s\";};").expect("parse");
        editor.put("/k", "\"first\"").expect("put");
        editor.put("/k", "\"second\"").expect("put");
        let out = editor.render().expect("render");
        assert!(out.contains("\"second\""));
        assert!(!out.contains("\"first\""));
        assert!(!out.contains("\"s\""));
    }

    #[test]
    fn put_skips_trivia_between_key_and_value() {
        let mut editor = DtsEditor::parse("k /* c */ = /* d */ <1>;").expect("parse");
        editor.put("/k", "<2>").expect("put");
        let out = editor.render().expect("render");
        assert!(out.contains("<2>"));
        assert!(out.contains("/* c */"));
        assert!(out.contains("/* d */"));
    }

    #[test]
    fn batch_collects_per_patch_outcomes() {
        let mut editor = DtsEditor::parse("/{a=<1>;b=<2>;};").expect("parse");
        let patches = vec![
            Patch::new("/a", "<10>"),
            Patch::new("/missing", "<0>"),
            Patch::new("/b", "<20>"),
        ];
        let outcomes = editor.apply(&patches);
        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].1.is_ok());
        assert!(matches!(
            outcomes[1].1,
            Err(PatchError::PathNotFound { .. })
        ));
        assert!(outcomes[2].1.is_ok());

        let out = editor.render().expect("render");
        assert!(out.contains("<10>"));
        assert!(out.contains("<20>"));
    }
}
