use crate::lexer::LexError;
use crate::parser::ParseError;
use crate::rewrite::RewriteError;
use thiserror::Error;

/// Per-patch failures. These are reported to the caller and skipped; other
/// patches in the same batch still proceed.
#[derive(Error, Debug)]
pub enum PatchError {
    #[error("path not found: {path}")]
    PathNotFound { path: String },

    #[error("path is not a scalar assignment: {path}")]
    StructuralMismatch { path: String },

    #[error("rewrite rejected for {path}: {source}")]
    Rewrite {
        path: String,
        #[source]
        source: RewriteError,
    },
}

#[derive(Error, Debug)]
pub enum DtsError {
    #[error("lex error: {0}")]
    Lex(#[from] LexError),

    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("rewrite error: {0}")]
    Rewrite(#[from] RewriteError),

    #[error("patch error: {0}")]
    Patch(#[from] PatchError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
