//! Live preview of a partially received edit envelope.
//!
//! While the assistant is still streaming, the buffer is usually an unterminated JSON object.
//! Instead of parsing it, the extractor locates the interesting keys with regexes and reads
//! their (possibly cut off) string values. The result is cosmetic only: the finished buffer is
//! always strictly parsed by [`crate::finalize`] before anything is applied.

use crate::change::CONTENT_KEYS;
use crate::envelope::FULL_CONTENT_KEYS;
use crate::options::{AssistOptions, DEFAULT_GENERATING_PLACEHOLDER};
use crate::scan::read_partial_string;
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

/// Marker appended to a preview while code is still arriving.
///
/// Hosts strip it and show a busy indicator instead.
pub const GENERATING_MARKER: &str = "<!-- assist:generating -->";

static EXPLANATION_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""explanation"\s*:\s*""#).expect("explanation key pattern is valid")
});

/// Any key a change or envelope may carry code under.
static CODE_KEY: LazyLock<Regex> = LazyLock::new(|| {
    let keys = CONTENT_KEYS
        .iter()
        .chain(FULL_CONTENT_KEYS)
        .map(|key| regex::escape(key))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r#""(?:{keys})"\s*:\s*""#)).expect("code key pattern is valid")
});

/// A renderable snapshot of the stream so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    /// Explanation captured so far (or free text before the envelope).
    pub explanation: Option<String>,
    /// Code captured so far, multiple fields joined with `'\n'`.
    pub code: Option<String>,
    /// Text to display (markdown).
    pub display: String,
    /// Whether an envelope appears to be in progress.
    pub generating: bool,
}

/// Builds [`Preview`]s for a given document language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewExtractor {
    fence_tag: String,
    placeholder: String,
}

impl PreviewExtractor {
    /// Create an extractor labelling code with `fence_tag`.
    pub fn new(fence_tag: impl Into<String>) -> Self {
        Self {
            fence_tag: fence_tag.into(),
            placeholder: DEFAULT_GENERATING_PLACEHOLDER.to_string(),
        }
    }

    /// Create an extractor from options; `fence_tag` falls back to the configured default.
    pub fn from_options(options: &AssistOptions, fence_tag: Option<&str>) -> Self {
        Self {
            fence_tag: fence_tag.unwrap_or(&options.default_fence_tag).to_string(),
            placeholder: options.generating_placeholder.clone(),
        }
    }

    /// Use a different placeholder for "envelope started, nothing readable yet".
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// The fence tag code is labelled with.
    pub fn fence_tag(&self) -> &str {
        &self.fence_tag
    }

    /// Render the buffer received so far.
    pub fn extract(&self, buffer: &str) -> Preview {
        let looks_like_envelope = buffer.contains('{');
        let (explanation, explanation_span) = match explanation_field(buffer) {
            Some((text, span)) => (non_empty(text), Some(span)),
            None if looks_like_envelope => (provisional_explanation(buffer), None),
            None => (None, None),
        };
        let code = code_fields(buffer, explanation_span);

        if let Some(code) = code {
            let mut display = String::new();
            if let Some(explanation) = explanation.as_deref() {
                display.push_str(explanation);
                display.push_str("\n\n");
            }
            display.push_str("```");
            display.push_str(&self.fence_tag);
            display.push('\n');
            display.push_str(code.trim_end());
            display.push_str("\n```\n\n");
            display.push_str(GENERATING_MARKER);

            return Preview {
                explanation,
                code: Some(code),
                display,
                generating: true,
            };
        }

        let display = match explanation.as_deref() {
            Some(explanation) => explanation.to_string(),
            None if looks_like_envelope => self.placeholder.clone(),
            None => buffer.to_string(),
        };
        Preview {
            explanation,
            code: None,
            display,
            generating: looks_like_envelope,
        }
    }
}

/// Render `buffer` with the default placeholder, labelling code with `fence_tag`.
pub fn extract_preview(buffer: &str, fence_tag: &str) -> Preview {
    PreviewExtractor::new(fence_tag).extract(buffer)
}

fn explanation_field(buffer: &str) -> Option<(String, Range<usize>)> {
    let key = EXPLANATION_KEY.find(buffer)?;
    let value = read_partial_string(buffer, key.end());
    Some((value.value, key.start()..value.end))
}

/// Free text before the first `{`, without a trailing fence opener such as ```` ```json ````.
fn provisional_explanation(buffer: &str) -> Option<String> {
    let head = &buffer[..buffer.find('{')?];
    let head = head.trim_end();
    let (before, last_line) = head.rsplit_once('\n').unwrap_or(("", head));
    if last_line.trim_start().starts_with("```") {
        return non_empty(before.to_string());
    }
    non_empty(head.to_string())
}

fn code_fields(buffer: &str, skip: Option<Range<usize>>) -> Option<String> {
    let mut captured: Vec<String> = Vec::new();
    let mut resume = 0;

    for key in CODE_KEY.find_iter(buffer) {
        if key.start() < resume || skip.as_ref().is_some_and(|span| span.contains(&key.start())) {
            continue;
        }
        let value = read_partial_string(buffer, key.end());
        resume = value.end;
        captured.push(value.value);
    }

    if captured.is_empty() {
        None
    } else {
        Some(captured.join("\n"))
    }
}

fn non_empty(text: String) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
