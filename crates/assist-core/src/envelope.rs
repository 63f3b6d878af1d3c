//! Edit envelopes: the structured message describing one proposed edit turn.
//!
//! Wire shape (JSON):
//!
//! ```json
//! {
//!   "type": "code_edit",
//!   "explanation": "Fix the off-by-one",
//!   "changes": [{ "type": "replace", "startLine": 3, "endLine": 3, "content": "..." }],
//!   "fullContent": "optional whole-file replacement",
//!   "file": "src/main.rs"
//! }
//! ```

use crate::change::{ChangeOperation, changes_from_value};
use serde::Deserialize;
use serde_json::Value;

/// Keys that may carry whole-document replacement content (mirrors the `RawEnvelope` aliases).
pub(crate) const FULL_CONTENT_KEYS: &[&str] = &[
    "fullContent",
    "full_content",
    "fullReplacementContent",
    "newContent",
];

/// A parsed edit envelope.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EditEnvelope {
    /// Human-readable explanation of the change.
    pub explanation: Option<String>,
    /// Line-level changes against the document the request was made for.
    pub changes: Vec<ChangeOperation>,
    /// Whole-document replacement; supersedes `changes` when present.
    pub full_replacement_content: Option<String>,
    /// Document the envelope claims to target.
    pub target_file_identifier: Option<String>,
}

/// What applying an envelope amounts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeAction<'a> {
    /// Replace the whole document with this text.
    ReplaceAll(&'a str),
    /// Run the patch engine with these changes.
    Patch(&'a [ChangeOperation]),
    /// Nothing actionable (no replacement content, no changes).
    Nothing,
}

impl EditEnvelope {
    /// Decide how this envelope applies. Full replacement content wins over `changes`.
    pub fn action(&self) -> EnvelopeAction<'_> {
        if let Some(content) = self.full_replacement_content.as_deref() {
            return EnvelopeAction::ReplaceAll(content);
        }
        if self.changes.is_empty() {
            EnvelopeAction::Nothing
        } else {
            EnvelopeAction::Patch(&self.changes)
        }
    }

    /// Returns `true` if the envelope carries something to apply.
    pub fn is_actionable(&self) -> bool {
        !matches!(self.action(), EnvelopeAction::Nothing)
    }

    /// Strictly parse `candidate` as an envelope.
    ///
    /// Succeeds only when the text is a JSON object whose `type` satisfies `accepts`.
    /// Individual change entries are still parsed leniently.
    pub fn parse_strict(candidate: &str, accepts: impl Fn(&str) -> bool) -> Option<Self> {
        let raw: RawEnvelope = serde_json::from_str(candidate.trim()).ok()?;
        if !accepts(&raw.kind) {
            return None;
        }
        Some(Self {
            explanation: raw.explanation,
            changes: raw
                .changes
                .as_ref()
                .map(changes_from_value)
                .unwrap_or_default(),
            full_replacement_content: raw.full_content,
            target_file_identifier: raw.file,
        })
    }
}

#[derive(Debug, Deserialize)]
struct RawEnvelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    explanation: Option<String>,
    #[serde(default)]
    changes: Option<Value>,
    #[serde(
        default,
        rename = "fullContent",
        alias = "full_content",
        alias = "fullReplacementContent",
        alias = "newContent"
    )]
    full_content: Option<String>,
    #[serde(default, alias = "targetFile", alias = "target_file")]
    file: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accept_edit(kind: &str) -> bool {
        kind == "code_edit"
    }

    #[test]
    fn test_parse_strict_requires_matching_type() {
        let text = r#"{"type":"code_edit","changes":[{"type":"delete","line":2}]}"#;
        let envelope = EditEnvelope::parse_strict(text, accept_edit).unwrap();
        assert_eq!(envelope.changes, vec![ChangeOperation::delete(2, 2)]);

        assert!(EditEnvelope::parse_strict(r#"{"type":"chat"}"#, accept_edit).is_none());
        assert!(EditEnvelope::parse_strict(r#"{"changes":[]}"#, accept_edit).is_none());
        assert!(EditEnvelope::parse_strict(r#"{"type":"code_edit""#, accept_edit).is_none());
    }

    #[test]
    fn test_full_replacement_supersedes_changes() {
        let text = r#"{
            "type": "code_edit",
            "full_content": "all new",
            "changes": [{"type": "delete", "line": 1}],
            "targetFile": "a.rs"
        }"#;
        let envelope = EditEnvelope::parse_strict(text, accept_edit).unwrap();
        assert_eq!(envelope.action(), EnvelopeAction::ReplaceAll("all new"));
        assert_eq!(envelope.target_file_identifier.as_deref(), Some("a.rs"));
    }

    #[test]
    fn test_empty_changes_are_not_actionable() {
        let envelope =
            EditEnvelope::parse_strict(r#"{"type":"code_edit","changes":[]}"#, accept_edit)
                .unwrap();
        assert_eq!(envelope.action(), EnvelopeAction::Nothing);
        assert!(!envelope.is_actionable());
    }
}
