//! Device-tree document patching: path indexing plus targeted value
//! replacement over the rewrite program.

pub mod editor;
pub mod errors;
pub mod indexer;

pub use editor::{DtsEditor, Patch};
pub use errors::{DtsError, PatchError};
pub use indexer::{index_document, PathIndex};
