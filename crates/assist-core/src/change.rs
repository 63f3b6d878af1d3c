//! Line-level change operations declared by the assistant.
//!
//! All line numbers are **1-based** and refer to the document *before* any change of the same
//! envelope was applied. Because the source is generative, every line field is optional and the
//! wire form is parsed leniently: see [`ChangeOperation::from_value`].

use crate::document::split_lines;
use crate::line_ending::normalize_line_endings;
use serde_json::Value;

const KIND_KEYS: &[&str] = &["type", "op", "action"];
const AT_LINE_KEYS: &[&str] = &["atLine", "line", "at_line", "lineNumber"];
const START_LINE_KEYS: &[&str] = &["startLine", "start", "start_line", "fromLine"];
const END_LINE_KEYS: &[&str] = &["endLine", "end", "end_line", "toLine"];
pub(crate) const CONTENT_KEYS: &[&str] = &["content", "replacement", "text", "newContent", "code"];

/// The optional line fields an operation may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineRefs {
    /// Insertion point (`atLine`).
    pub at_line: Option<i64>,
    /// Range start (`startLine`).
    pub start_line: Option<i64>,
    /// Range end, inclusive (`endLine`).
    pub end_line: Option<i64>,
}

impl LineRefs {
    /// Only an insertion point.
    pub fn at(line: i64) -> Self {
        Self {
            at_line: Some(line),
            ..Self::default()
        }
    }

    /// An inclusive range.
    pub fn range(start_line: i64, end_line: i64) -> Self {
        Self {
            at_line: None,
            start_line: Some(start_line),
            end_line: Some(end_line),
        }
    }

    /// The line an insert targets: `at_line`, then `start_line`, then `end_line`.
    pub fn insert_line(&self) -> Option<i64> {
        self.at_line.or(self.start_line).or(self.end_line)
    }

    /// Normalized `(start, end)` with `start <= end`, filling a missing bound from the others.
    pub fn span(&self) -> Option<(i64, i64)> {
        let start = self.start_line.or(self.at_line).or(self.end_line)?;
        let end = self.end_line.or(self.start_line).or(self.at_line)?;
        Some((start.min(end), start.max(end)))
    }

    /// The line a ranged operation is ordered by: `start_line`, then `end_line`, then `at_line`.
    pub fn range_anchor(&self) -> Option<i64> {
        self.start_line.or(self.end_line).or(self.at_line)
    }
}

/// A single line-level edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeOperation {
    /// Insert `content` at a line.
    Insert {
        /// Line fields as received.
        lines: LineRefs,
        /// Inserted text (may span several lines).
        content: String,
    },
    /// Delete an inclusive line range.
    Delete {
        /// Line fields as received.
        lines: LineRefs,
    },
    /// Replace an inclusive line range with `content`.
    Replace {
        /// Line fields as received.
        lines: LineRefs,
        /// Replacement text (may span several lines, may be empty).
        content: String,
    },
}

impl ChangeOperation {
    /// Convenience constructor for an insert at `at_line`.
    pub fn insert(at_line: i64, content: impl Into<String>) -> Self {
        Self::Insert {
            lines: LineRefs::at(at_line),
            content: content.into(),
        }
    }

    /// Convenience constructor for deleting `start_line..=end_line`.
    pub fn delete(start_line: i64, end_line: i64) -> Self {
        Self::Delete {
            lines: LineRefs::range(start_line, end_line),
        }
    }

    /// Convenience constructor for replacing `start_line..=end_line`.
    pub fn replace(start_line: i64, end_line: i64, content: impl Into<String>) -> Self {
        Self::Replace {
            lines: LineRefs::range(start_line, end_line),
            content: content.into(),
        }
    }

    /// The raw line fields of this operation.
    pub fn line_refs(&self) -> &LineRefs {
        match self {
            Self::Insert { lines, .. } | Self::Delete { lines } | Self::Replace { lines, .. } => {
                lines
            }
        }
    }

    /// Line used to order this operation and to anchor the running offset.
    ///
    /// `original_line_count` resolves an insert without any line field to end-of-document.
    /// Ranged operations without any line field return `None`.
    pub fn reference_line(&self, original_line_count: usize) -> Option<i64> {
        match self {
            Self::Insert { lines, .. } => Some(
                lines
                    .insert_line()
                    .unwrap_or_else(|| end_of_document(original_line_count)),
            ),
            Self::Delete { lines } | Self::Replace { lines, .. } => lines.range_anchor(),
        }
    }

    /// Content split into normalized lines.
    ///
    /// One trailing newline is dropped, and empty content yields no lines.
    pub fn content_lines(&self) -> Vec<String> {
        match self {
            Self::Insert { content, .. } | Self::Replace { content, .. } => {
                let normalized = normalize_line_endings(content);
                let trimmed = normalized.strip_suffix('\n').unwrap_or(&normalized);
                split_lines(trimmed)
            }
            Self::Delete { .. } => Vec::new(),
        }
    }

    /// Parse a change object leniently.
    ///
    /// - the kind comes from `type`/`op`/`action`; when missing or unknown it is inferred
    ///   (content and a range → replace, content only → insert, no content → delete)
    /// - line numbers may be integers, floats (rounded) or numeric strings
    ///
    /// Returns `None` only for values that are not JSON objects.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;

        let lines = LineRefs {
            at_line: first_line_number(object, AT_LINE_KEYS),
            start_line: first_line_number(object, START_LINE_KEYS),
            end_line: first_line_number(object, END_LINE_KEYS),
        };
        let content = CONTENT_KEYS
            .iter()
            .find_map(|key| object.get(*key).and_then(Value::as_str))
            .map(str::to_string);
        let kind = KIND_KEYS
            .iter()
            .find_map(|key| object.get(*key).and_then(Value::as_str))
            .and_then(ChangeKind::parse)
            .unwrap_or_else(|| ChangeKind::infer(&lines, content.is_some()));

        Some(match kind {
            ChangeKind::Insert => Self::Insert {
                lines,
                content: content.unwrap_or_default(),
            },
            ChangeKind::Delete => Self::Delete { lines },
            ChangeKind::Replace => Self::Replace {
                lines,
                content: content.unwrap_or_default(),
            },
        })
    }
}

/// Parse a JSON array of change objects, dropping entries that are not objects.
pub fn changes_from_value(value: &Value) -> Vec<ChangeOperation> {
    value
        .as_array()
        .map(|arr| {
            arr.iter()
                .filter_map(ChangeOperation::from_value)
                .collect::<Vec<_>>()
        })
        .unwrap_or_default()
}

fn end_of_document(line_count: usize) -> i64 {
    i64::try_from(line_count)
        .unwrap_or(i64::MAX)
        .saturating_add(1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChangeKind {
    Insert,
    Delete,
    Replace,
}

impl ChangeKind {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "insert" | "add" => Some(Self::Insert),
            "delete" | "remove" => Some(Self::Delete),
            "replace" | "modify" | "update" => Some(Self::Replace),
            _ => None,
        }
    }

    fn infer(lines: &LineRefs, has_content: bool) -> Self {
        let ranged = lines.start_line.is_some() || lines.end_line.is_some();
        match (has_content, ranged) {
            (true, true) => Self::Replace,
            (true, false) => Self::Insert,
            (false, _) => Self::Delete,
        }
    }
}

fn first_line_number(object: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<i64> {
    keys.iter()
        .find_map(|key| object.get(*key).and_then(line_number_from_value))
}

/// Interpret a JSON value as a line number.
///
/// Floats are rounded half away from zero and saturate at the `i64` range.
fn line_number_from_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().and_then(round_finite)),
        Value::String(text) => {
            let text = text.trim();
            text.parse::<i64>()
                .ok()
                .or_else(|| text.parse::<f64>().ok().and_then(round_finite))
        }
        _ => None,
    }
}

fn round_finite(value: f64) -> Option<i64> {
    value.is_finite().then(|| value.round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_explicit_kinds() {
        assert_eq!(
            ChangeOperation::from_value(&json!({"type": "insert", "atLine": 3, "content": "x"})),
            Some(ChangeOperation::insert(3, "x"))
        );
        assert_eq!(
            ChangeOperation::from_value(&json!({"type": "delete", "startLine": 2, "endLine": 4})),
            Some(ChangeOperation::delete(2, 4))
        );
        assert_eq!(
            ChangeOperation::from_value(
                &json!({"type": "REPLACE", "start": 1, "end": 1, "replacement": "y"})
            ),
            Some(ChangeOperation::replace(1, 1, "y"))
        );
    }

    #[test]
    fn test_lenient_line_numbers() {
        let op = ChangeOperation::from_value(
            &json!({"type": "delete", "startLine": "7", "endLine": 8.6}),
        )
        .unwrap();
        assert_eq!(op, ChangeOperation::delete(7, 9));

        let op = ChangeOperation::from_value(
            &json!({"type": "delete", "startLine": null, "endLine": true, "line": 2}),
        )
        .unwrap();
        assert_eq!(op.line_refs().span(), Some((2, 2)));
    }

    #[test]
    fn test_kind_is_inferred_when_missing() {
        let replace = ChangeOperation::from_value(&json!({"start": 2, "content": "z"})).unwrap();
        assert!(matches!(replace, ChangeOperation::Replace { .. }));

        let insert = ChangeOperation::from_value(&json!({"line": 2, "content": "z"})).unwrap();
        assert!(matches!(insert, ChangeOperation::Insert { .. }));

        let delete = ChangeOperation::from_value(&json!({"type": "??", "line": 2})).unwrap();
        assert!(matches!(delete, ChangeOperation::Delete { .. }));
    }

    #[test]
    fn test_reference_line_fallbacks() {
        let insert = ChangeOperation::Insert {
            lines: LineRefs::default(),
            content: "tail".into(),
        };
        assert_eq!(insert.reference_line(10), Some(11));

        let delete = ChangeOperation::Delete {
            lines: LineRefs {
                at_line: Some(9),
                start_line: None,
                end_line: Some(4),
            },
        };
        assert_eq!(delete.reference_line(10), Some(4));
        assert_eq!(delete.line_refs().span(), Some((4, 9)));

        let nothing = ChangeOperation::Delete {
            lines: LineRefs::default(),
        };
        assert_eq!(nothing.reference_line(10), None);
    }

    #[test]
    fn test_content_lines() {
        assert_eq!(
            ChangeOperation::insert(1, "a\r\nb\n").content_lines(),
            vec!["a".to_string(), "b".to_string()]
        );
        assert!(ChangeOperation::replace(1, 1, "").content_lines().is_empty());
        assert_eq!(
            ChangeOperation::insert(1, "\n").content_lines(),
            Vec::<String>::new()
        );
        assert_eq!(
            ChangeOperation::insert(1, "\n\n").content_lines(),
            vec![String::new(), String::new()]
        );
    }

    #[test]
    fn test_changes_from_value_drops_non_objects() {
        let changes = changes_from_value(&json!([1, "x", {"type": "delete", "line": 1}, null]));
        assert_eq!(changes.len(), 1);
        assert!(changes_from_value(&json!({"not": "an array"})).is_empty());
    }
}
