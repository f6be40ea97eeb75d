use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RewriteError {
    /// Rejected at queue time; nothing is recorded and the caller may retry.
    #[error("rewrite range {from}..{to} out of bounds (stream has {len} tokens)")]
    OutOfRange { from: usize, to: usize, len: usize },

    /// Two replace spans overlap in a way the reducer cannot merge. Fatal for
    /// the current render.
    #[error("replace {from}..{to} overlaps earlier replace {prev_from}..{prev_to}")]
    ReplaceOverlap {
        from: usize,
        to: usize,
        prev_from: usize,
        prev_to: usize,
    },

    /// An insert anchored strictly inside an earlier replace span. Fatal.
    #[error("insert at token {index} lands inside replace span {from}..{to}")]
    InsertInsideReplace {
        index: usize,
        from: usize,
        to: usize,
    },

    /// Reduction left more than one live operation at one index. This is a
    /// defect in the reducer itself, never tolerated.
    #[error("reduction left more than one operation at token {index}")]
    IncompleteReduction { index: usize },
}
