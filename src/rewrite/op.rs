/// Provenance of a normalized insert.
///
/// `insert_after(i, ..)` becomes an insert before `i + 1` immediately, but
/// the origin must be remembered: when two inserts collide at one index,
/// after-origin text renders before plain insert-before text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOrigin {
    Before,
    After,
}

/// A pending edit, anchored to token indices. Never applied directly to the
/// stream; the reducer may merge, rewrite, or retract it, and the renderer
/// executes whatever survives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteOp {
    /// Text inserted immediately before the token at `index`.
    Insert {
        index: usize,
        text: String,
        origin: InsertOrigin,
    },
    /// Tokens `from..=to` replaced by `text`; `None` is a pure deletion.
    Replace {
        from: usize,
        to: usize,
        text: Option<String>,
    },
}

impl RewriteOp {
    /// The token index this operation is keyed under after reduction.
    pub fn anchor(&self) -> usize {
        match self {
            RewriteOp::Insert { index, .. } => *index,
            RewriteOp::Replace { from, .. } => *from,
        }
    }
}
