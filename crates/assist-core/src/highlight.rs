//! Highlight ranges produced by the patch engine.
//!
//! Highlights mark the regions a patch changed so the host can paint them. They are UI-facing
//! annotations expressed in **post-edit, 1-based, inclusive** line numbers; they are never
//! persisted and never influence the document text.

/// What happened to the lines a [`HighlightRange`] covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HighlightKind {
    /// Lines that were added by an insert or a replace.
    Inserted,
    /// Anchor line where content was deleted or replaced.
    Touched,
}

/// An inclusive range of post-edit line numbers (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HighlightRange {
    /// First highlighted line (inclusive).
    pub start_line: usize,
    /// Last highlighted line (inclusive).
    pub end_line: usize,
}

impl HighlightRange {
    /// Create a new range. Bounds are swapped if given in reverse order.
    pub fn new(start_line: usize, end_line: usize) -> Self {
        Self {
            start_line: start_line.min(end_line),
            end_line: start_line.max(end_line),
        }
    }

    /// A range covering exactly one line.
    pub fn single(line: usize) -> Self {
        Self::new(line, line)
    }

    /// Number of lines covered.
    pub fn line_count(&self) -> usize {
        self.end_line - self.start_line + 1
    }

    /// Returns `true` if `line` falls inside the range.
    pub fn contains(&self, line: usize) -> bool {
        (self.start_line..=self.end_line).contains(&line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_is_normalized() {
        let range = HighlightRange::new(5, 2);
        assert_eq!(range, HighlightRange::new(2, 5));
        assert_eq!(range.line_count(), 4);
        assert!(range.contains(2) && range.contains(5) && !range.contains(6));
    }
}
