//! Path indexing over the terminal-visitation sequence.
//!
//! One pre-order pass does two jobs at once: it maps every slash-joined
//! property path to the token index of its key, and it queues the formatting
//! edits (indentation, newlines, spacing) into the shared rewrite program.
//! Both are expressed as the same primitive, anchored text insertion, which
//! is why they share a traversal.

use crate::parser::Terminal;
use crate::rewrite::TokenRewriter;
use crate::stream::{TokenKind, TokenStream};
use std::collections::HashMap;

/// Mapping from normalized path string to the token index of the key token
/// that last produced that path. Later occurrences overwrite earlier ones;
/// only the most recent is addressable.
#[derive(Debug, Clone, Default)]
pub struct PathIndex {
    entries: HashMap<String, usize>,
}

impl PathIndex {
    pub fn get(&self, path: &str) -> Option<usize> {
        self.entries.get(path).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(path, index)| (path.as_str(), *index))
    }

    /// Entries sorted by path, for stable listings.
    pub fn sorted(&self) -> Vec<(&str, usize)> {
        let mut entries: Vec<(&str, usize)> = self.iter().collect();
        entries.sort_unstable();
        entries
    }
}

/// Walk the terminals once, building the path index and queueing formatting
/// edits into `rewriter`. All traversal state is local to this call.
pub fn index_document(
    stream: &TokenStream,
    terminals: &[Terminal],
    rewriter: &mut TokenRewriter,
) -> PathIndex {
    let mut depth: i32 = 0;
    let mut path = String::new();
    let mut entries = HashMap::new();

    for terminal in terminals {
        match terminal.kind {
            TokenKind::BraceOpen => {
                depth += 1;
                rewriter.insert_after(terminal.index, "\n");
            }
            TokenKind::BraceClose => {
                depth -= 1;
                rewriter.insert_before(terminal.index, tabs(depth));
            }
            TokenKind::Key => {
                rewriter.insert_before(terminal.index, tabs(depth));
                rewriter.insert_after(terminal.index, " ");

                let text = stream
                    .token_at(terminal.index)
                    .map(|t| t.text.as_str())
                    .unwrap_or("");
                if text == "/" {
                    path = "/".to_string();
                } else {
                    path.push('/');
                    path.push_str(text);
                }
                entries.insert(path.replacen("//", "/", 1), terminal.index);
            }
            TokenKind::Eq => {
                rewriter.insert_after(terminal.index, " ");
            }
            TokenKind::Semicolon => {
                rewriter.insert_after(terminal.index, "\n");
                match path.rfind('/') {
                    Some(pos) => path.truncate(pos),
                    None => path.clear(),
                }
            }
            TokenKind::Version => {
                rewriter.insert_after(terminal.index, "\n");
            }
            _ => {}
        }
    }

    PathIndex { entries }
}

fn tabs(depth: i32) -> String {
    "\t".repeat(depth.max(0) as usize)
}
