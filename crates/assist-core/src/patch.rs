//! Patch engine: apply a set of line-level changes in one pass.
//!
//! Every [`ChangeOperation`] refers to line numbers of the *original* document. Operations are
//! stably sorted by their reference line and applied top to bottom while a single running
//! offset tracks how many lines earlier operations added or removed. That offset is added to
//! each later operation's line numbers, so no position ever has to be recomputed from scratch.
//!
//! The engine never fails: missing, reversed or out-of-range line numbers are clamped to the
//! nearest valid boundary.
//!
//! # Example
//!
//! ```rust
//! use assist_core::{ChangeOperation, HighlightRange, LineDocument, apply_changes};
//!
//! let doc = LineDocument::from_lines(["a", "b", "c"]);
//! let changes = [
//!     ChangeOperation::insert(2, "X"),
//!     ChangeOperation::delete(1, 1),
//! ];
//!
//! let result = apply_changes(&doc, &changes).unwrap();
//! assert_eq!(result.document.lines(), ["b", "X", "c"]);
//! assert_eq!(result.inserted, vec![HighlightRange::new(2, 2)]);
//! ```

use crate::change::ChangeOperation;
use crate::document::LineDocument;
use crate::highlight::HighlightRange;

/// Output of [`apply_changes`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchResult {
    /// The patched document.
    pub document: LineDocument,
    /// Lines added by inserts and replaces (post-edit line numbers).
    pub inserted: Vec<HighlightRange>,
    /// Anchor lines of deletions and replacements (post-edit line numbers).
    pub touched: Vec<HighlightRange>,
}

impl PatchResult {
    /// The patched text, joined with `'\n'`.
    pub fn text(&self) -> String {
        self.document.text()
    }
}

/// Apply `changes` to `document`.
///
/// Returns `None` when `changes` is empty. Operations sharing a reference line keep their
/// input order.
pub fn apply_changes(document: &LineDocument, changes: &[ChangeOperation]) -> Option<PatchResult> {
    if changes.is_empty() {
        return None;
    }

    let original_line_count = document.line_count();
    let mut ordered = changes
        .iter()
        .map(|op| {
            (
                op.reference_line(original_line_count).unwrap_or(i64::MAX),
                op,
            )
        })
        .collect::<Vec<_>>();
    ordered.sort_by_key(|(reference, _)| *reference);

    let mut patcher = Patcher {
        document: document.clone(),
        line_offset: 0,
        inserted: Vec::new(),
        touched: Vec::new(),
    };
    for (reference, op) in ordered {
        tracing::trace!(reference, offset = patcher.line_offset, ?op, "applying change");
        patcher.apply(op);
    }

    Some(PatchResult {
        document: patcher.document,
        inserted: patcher.inserted,
        touched: patcher.touched,
    })
}

/// Convenience wrapper: build a [`LineDocument`] from `text` and apply `changes`.
pub fn apply_changes_to_text(text: &str, changes: &[ChangeOperation]) -> Option<PatchResult> {
    apply_changes(&LineDocument::from_text(text), changes)
}

struct Patcher {
    document: LineDocument,
    line_offset: i64,
    inserted: Vec<HighlightRange>,
    touched: Vec<HighlightRange>,
}

impl Patcher {
    fn apply(&mut self, op: &ChangeOperation) {
        match op {
            ChangeOperation::Insert { lines, .. } => {
                let len = self.document.line_count();
                let position = match lines.insert_line() {
                    Some(line) => clamp_line(line.saturating_add(self.line_offset), 1, len + 1),
                    None => len + 1,
                };
                self.insert_at(position.min(len), op.content_lines());
            }
            ChangeOperation::Delete { lines } => {
                let len = self.document.line_count();
                if len == 0 {
                    tracing::debug!("skipping delete on an empty document");
                    return;
                }
                let Some((start, end)) = lines.span() else {
                    tracing::debug!("skipping delete without any line number");
                    return;
                };
                let (start, end) = self.resolve_range(start, end, len);

                self.document.lines_mut().drain(start - 1..end);
                let removed = end - start + 1;
                self.touched.push(HighlightRange::single(self.anchor_line(start)));
                self.line_offset = self.line_offset.saturating_sub(to_i64(removed));
            }
            ChangeOperation::Replace { lines, .. } => {
                let content = op.content_lines();
                let len = self.document.line_count();
                if len == 0 {
                    self.insert_at(0, content);
                    return;
                }
                let Some((start, end)) = lines.span() else {
                    tracing::debug!("skipping replace without any line number");
                    return;
                };
                let (start, end) = self.resolve_range(start, end, len);

                let added = content.len();
                self.document.lines_mut().splice(start - 1..end, content);
                let removed = end - start + 1;
                if added > 0 {
                    self.inserted
                        .push(HighlightRange::new(start, start + added - 1));
                }
                self.touched.push(HighlightRange::single(self.anchor_line(start)));
                self.line_offset = self
                    .line_offset
                    .saturating_add(to_i64(added))
                    .saturating_sub(to_i64(removed));
            }
        }
    }

    /// Splice `content` in before zero-based `index`.
    fn insert_at(&mut self, index: usize, content: Vec<String>) {
        let added = content.len();
        if added == 0 {
            return;
        }
        self.document.lines_mut().splice(index..index, content);
        self.inserted
            .push(HighlightRange::new(index + 1, index + added));
        self.line_offset = self.line_offset.saturating_add(to_i64(added));
    }

    /// Offset-correct and clamp an inclusive range into `[1, len]` (`len > 0`).
    fn resolve_range(&self, start: i64, end: i64, len: usize) -> (usize, usize) {
        let start = clamp_line(start.saturating_add(self.line_offset), 1, len);
        let end = clamp_line(end.saturating_add(self.line_offset), start, len);
        (start, end)
    }

    /// Clamp a post-edit anchor line into the current document (at least line 1).
    fn anchor_line(&self, line: usize) -> usize {
        line.min(self.document.line_count().max(1))
    }
}

fn clamp_line(value: i64, min: usize, max: usize) -> usize {
    let clamped = value.clamp(to_i64(min), to_i64(max.max(min)));
    usize::try_from(clamped).unwrap_or(min)
}

fn to_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
