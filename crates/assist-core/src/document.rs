//! Line-oriented document model.
//!
//! A [`LineDocument`] is the snapshot the patch engine works on: an ordered list of lines with
//! terminators normalized to `'\n'`. The empty string is the zero-line document, so joining the
//! lines back with `'\n'` reproduces the normalized input exactly.

use crate::line_ending::{LineEnding, normalize_line_endings};

/// An ordered sequence of text lines (no terminators stored).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LineDocument {
    lines: Vec<String>,
    line_ending: LineEnding,
}

impl LineDocument {
    /// Create an empty (zero-line) document.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a document from raw text, normalizing line terminators.
    ///
    /// The original terminator style is remembered (see [`LineDocument::line_ending`]).
    pub fn from_text(text: &str) -> Self {
        let line_ending = LineEnding::detect_in_text(text);
        Self {
            lines: split_lines(&normalize_line_endings(text)),
            line_ending,
        }
    }

    /// Build a document from already-split lines.
    pub fn from_lines<I, L>(lines: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            line_ending: LineEnding::Lf,
        }
    }

    /// Number of lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Returns `true` for the zero-line document.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// All lines, in order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Get a line by **1-based** line number.
    pub fn line(&self, line_number: usize) -> Option<&str> {
        line_number
            .checked_sub(1)
            .and_then(|idx| self.lines.get(idx))
            .map(String::as_str)
    }

    /// The terminator style detected when this document was built from text.
    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    /// Override the remembered terminator style.
    pub fn with_line_ending(mut self, line_ending: LineEnding) -> Self {
        self.line_ending = line_ending;
        self
    }

    /// Join the lines with `'\n'`.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Join the lines using the remembered terminator style.
    pub fn text_with_line_ending(&self) -> String {
        self.line_ending.apply_to_text(&self.text())
    }

    pub(crate) fn lines_mut(&mut self) -> &mut Vec<String> {
        &mut self.lines
    }
}

/// Split normalized text into lines; `""` yields no lines.
pub(crate) fn split_lines(normalized: &str) -> Vec<String> {
    if normalized.is_empty() {
        return Vec::new();
    }
    normalized.split('\n').map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_is_zero_lines() {
        let doc = LineDocument::from_text("");
        assert!(doc.is_empty());
        assert_eq!(doc.text(), "");
    }

    #[test]
    fn test_trailing_newline_is_an_empty_last_line() {
        let doc = LineDocument::from_text("a\nb\n");
        assert_eq!(doc.lines(), ["a", "b", ""]);
        assert_eq!(doc.text(), "a\nb\n");
    }

    #[test]
    fn test_crlf_is_normalized_and_remembered() {
        let doc = LineDocument::from_text("a\r\nb");
        assert_eq!(doc.lines(), ["a", "b"]);
        assert_eq!(doc.line_ending(), LineEnding::Crlf);
        assert_eq!(doc.text_with_line_ending(), "a\r\nb");
    }

    #[test]
    fn test_line_is_one_based() {
        let doc = LineDocument::from_lines(["x", "y"]);
        assert_eq!(doc.line(0), None);
        assert_eq!(doc.line(1), Some("x"));
        assert_eq!(doc.line(2), Some("y"));
        assert_eq!(doc.line(3), None);
    }
}
