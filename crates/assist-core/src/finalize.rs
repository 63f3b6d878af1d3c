//! Strict envelope recognition once the stream has ended, plus the narrative fallback.
//!
//! Candidates are tried in order:
//!
//! 1. the contents of each fenced code block
//! 2. the whole trimmed buffer
//! 3. each top-level balanced `{...}` object (string-aware brace counting)
//!
//! The first candidate that parses as JSON *and* declares an accepted envelope `type` wins.
//! When none does, the buffer is narrative text and [`fallback_block`] picks the fenced code
//! region to insert as a whole-document replacement.

use crate::envelope::EditEnvelope;
use crate::fence::{CodeBlock, code_blocks};
use crate::options::AssistOptions;
use crate::scan::balanced_objects;
use assist_core_lang::Language;

/// Recognizes finished edit envelopes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeFinalizer {
    envelope_types: Vec<String>,
}

impl EnvelopeFinalizer {
    /// Accept envelopes whose `type` is one of `envelope_types` (ASCII case-insensitive).
    pub fn new<I, T>(envelope_types: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            envelope_types: envelope_types.into_iter().map(Into::into).collect(),
        }
    }

    /// Use the envelope types configured in `options`.
    pub fn from_options(options: &AssistOptions) -> Self {
        Self::new(options.envelope_types.iter().cloned())
    }

    /// Returns `true` if `kind` names an accepted envelope type.
    pub fn accepts(&self, kind: &str) -> bool {
        let kind = kind.trim();
        self.envelope_types
            .iter()
            .any(|accepted| accepted.eq_ignore_ascii_case(kind))
    }

    /// Find and strictly parse an edit envelope in the finished `buffer`.
    pub fn finalize(&self, buffer: &str) -> Option<EditEnvelope> {
        let accepts = |kind: &str| self.accepts(kind);

        let fenced = code_blocks(buffer);
        let from_fence = fenced
            .iter()
            .find_map(|block| EditEnvelope::parse_strict(&block.content, accepts));
        if from_fence.is_some() {
            tracing::debug!("edit envelope found inside a fenced block");
            return from_fence;
        }

        if let Some(envelope) = EditEnvelope::parse_strict(buffer, accepts) {
            tracing::debug!("edit envelope is the whole buffer");
            return Some(envelope);
        }

        let embedded = balanced_objects(buffer)
            .into_iter()
            .find_map(|candidate| EditEnvelope::parse_strict(candidate, accepts));
        if embedded.is_some() {
            tracing::debug!("edit envelope embedded in narrative text");
        }
        embedded
    }
}

impl Default for EnvelopeFinalizer {
    fn default() -> Self {
        Self::from_options(&AssistOptions::default())
    }
}

/// Finalize with the envelope types from `options`.
pub fn finalize_envelope(buffer: &str, options: &AssistOptions) -> Option<EditEnvelope> {
    EnvelopeFinalizer::from_options(options).finalize(buffer)
}

/// Pick the fenced region a narrative response should insert directly.
///
/// Prefers the last block tagged with the active document's language, then the last block.
/// Returns `None` when the response has no fenced code at all.
pub fn fallback_block(buffer: &str, language: Option<&Language>) -> Option<CodeBlock> {
    let mut blocks = code_blocks(buffer);
    let preferred = language.and_then(|language| {
        blocks
            .iter()
            .rposition(|block| language.matches_fence_tag(block.language_tag()))
    });
    match preferred {
        Some(idx) => Some(blocks.swap_remove(idx)),
        None => blocks.pop(),
    }
}
