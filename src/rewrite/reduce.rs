//! Reduction of an operation log to at most one operation per token index.
//!
//! The log is a sequence of `Option<RewriteOp>` slots; slot position is the
//! issue sequence number and `None` marks a retracted (tombstoned) operation.
//! Two ordered scans, oldest to newest:
//!
//! 1. Replaces absorb earlier inserts at their from-index, drop inserts that
//!    fall inside their span, drop earlier replaces they fully contain, and
//!    merge with earlier pure deletions that overlap or touch. Any other
//!    overlap between replace spans is a structural error.
//! 2. Inserts at the same index combine into one (after-origin text first),
//!    an insert at a replace's from-index folds into the replace, and an
//!    insert strictly inside a replace span is a structural error.

use crate::rewrite::errors::RewriteError;
use crate::rewrite::op::{InsertOrigin, RewriteOp};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Map from anchor index to the surviving operation and its sequence slot.
pub(crate) type ReducedOps = HashMap<usize, (usize, RewriteOp)>;

pub(crate) fn reduce(log: &mut [Option<RewriteOp>]) -> Result<ReducedOps, RewriteError> {
    walk_replaces(log)?;
    walk_inserts(log)?;

    let mut reduced = ReducedOps::new();
    for (slot, op) in log.iter().enumerate() {
        let Some(op) = op else { continue };
        match reduced.entry(op.anchor()) {
            Entry::Occupied(_) => {
                return Err(RewriteError::IncompleteReduction { index: op.anchor() });
            }
            Entry::Vacant(vacant) => {
                vacant.insert((slot, op.clone()));
            }
        }
    }
    Ok(reduced)
}

fn walk_replaces(log: &mut [Option<RewriteOp>]) -> Result<(), RewriteError> {
    for i in 0..log.len() {
        let (mut from, mut to, mut text) = match &log[i] {
            Some(RewriteOp::Replace { from, to, text }) => (*from, *to, text.clone()),
            _ => continue,
        };

        // Earlier inserts: fold at the from-index, drop inside the span.
        for j in 0..i {
            let insert_index = match &log[j] {
                Some(RewriteOp::Insert { index, .. }) => *index,
                _ => continue,
            };
            if insert_index == from {
                if let Some(RewriteOp::Insert {
                    text: insert_text, ..
                }) = log[j].take()
                {
                    let mut folded = insert_text;
                    folded.push_str(text.as_deref().unwrap_or(""));
                    text = Some(folded);
                }
            } else if insert_index > from && insert_index <= to {
                log[j] = None;
            }
        }

        // Earlier replaces: drop contained, merge touching deletions,
        // reject every other overlap.
        for j in 0..i {
            let (prev_from, prev_to, prev_is_deletion) = match &log[j] {
                Some(RewriteOp::Replace { from, to, text }) => (*from, *to, text.is_none()),
                _ => continue,
            };
            if prev_from >= from && prev_to <= to {
                log[j] = None;
                continue;
            }
            let disjoint = prev_to < from || prev_from > to;
            if prev_is_deletion && text.is_none() && !disjoint {
                log[j] = None;
                from = from.min(prev_from);
                to = to.max(prev_to);
            } else if !disjoint {
                return Err(RewriteError::ReplaceOverlap {
                    from,
                    to,
                    prev_from,
                    prev_to,
                });
            }
        }

        log[i] = Some(RewriteOp::Replace { from, to, text });
    }
    Ok(())
}

fn walk_inserts(log: &mut [Option<RewriteOp>]) -> Result<(), RewriteError> {
    for i in 0..log.len() {
        let index = match &log[i] {
            Some(RewriteOp::Insert { index, .. }) => *index,
            _ => continue,
        };

        // Combine with earlier inserts at the same index. Text destined to
        // render after the previous anchor token goes in front of text
        // destined to render immediately before this one.
        for j in 0..i {
            let (prev_index, prev_origin) = match &log[j] {
                Some(RewriteOp::Insert { index, origin, .. }) => (*index, *origin),
                _ => continue,
            };
            if prev_index != index {
                continue;
            }
            let Some(RewriteOp::Insert {
                text: prev_text, ..
            }) = log[j].take()
            else {
                continue;
            };
            if let Some(RewriteOp::Insert { text, .. }) = log[i].as_mut() {
                match prev_origin {
                    InsertOrigin::After => text.insert_str(0, &prev_text),
                    InsertOrigin::Before => text.push_str(&prev_text),
                }
            }
        }

        // Earlier replaces: fold at the from-index, reject strictly inside.
        for j in 0..i {
            let (replace_from, replace_to) = match &log[j] {
                Some(RewriteOp::Replace { from, to, .. }) => (*from, *to),
                _ => continue,
            };
            if index == replace_from {
                let Some(RewriteOp::Insert {
                    text: insert_text, ..
                }) = log[i].take()
                else {
                    break;
                };
                if let Some(RewriteOp::Replace { text, .. }) = log[j].as_mut() {
                    let mut folded = insert_text;
                    folded.push_str(text.as_deref().unwrap_or(""));
                    *text = Some(folded);
                }
                break;
            }
            if index > replace_from && index <= replace_to {
                return Err(RewriteError::InsertInsideReplace {
                    index,
                    from: replace_from,
                    to: replace_to,
                });
            }
        }
    }
    Ok(())
}
