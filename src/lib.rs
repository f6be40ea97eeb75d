//! DTS Patcher: surgical device-tree-source patching
//!
//! A patching system for hierarchical key/value documents built on
//! token-stream rewriting: edits are queued against token indices, reduced
//! to at most one operation per index, and rendered in a single pass.
//! Every byte outside the edited spans survives verbatim.
//!
//! # Architecture
//!
//! The stream is read-only; intelligence lives in where edits anchor, not
//! in how they apply. One indexing pass over the parse's terminal sequence
//! builds the path map and queues formatting edits; [`dts::DtsEditor::put`]
//! queues value replacements; rendering reduces the operation log and emits
//! the final text.
//!
//! # Example
//!
//! ```
//! use dts_patcher::DtsEditor;
//!
//! let mut editor = DtsEditor::parse("/{k=\"old\";};").unwrap();
//! editor.put("/k", "\"new\"").unwrap();
//! let output = editor.render().unwrap();
//! assert!(output.contains("k = \"new\";"));
//! ```

pub mod dts;
pub mod lexer;
pub mod parser;
pub mod probe;
pub mod rewrite;
pub mod stream;

// Re-exports
pub use dts::{DtsEditor, DtsError, Patch, PatchError, PathIndex};
pub use lexer::{tokenize, LexError};
pub use parser::{parse, ParseError, Terminal};
pub use probe::{probe_block_devices, read_properties, ProbeError, ProbeReport};
pub use rewrite::{InsertOrigin, RewriteError, RewriteOp, TokenRewriter, DEFAULT_PROGRAM};
pub use stream::{Token, TokenKind, TokenStream};
