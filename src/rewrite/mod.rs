//! Token-stream rewriting: a deferred-edit log, its reducer, and the
//! single-pass renderer.
//!
//! Edits are anchored at token indices and never applied eagerly. At render
//! time the log is reduced to at most one surviving operation per index,
//! merging compatible overlaps and rejecting incompatible ones, then the
//! stream is walked once to emit the output.

pub mod errors;
pub mod op;
pub mod program;

mod reduce;

pub use errors::RewriteError;
pub use op::{InsertOrigin, RewriteOp};
pub use program::{TokenRewriter, DEFAULT_PROGRAM};
