//! Turn orchestration: stream chunks in, previews out, one finalized edit applied per turn.
//!
//! An [`AssistSession`] ties the pure pieces of the kernel to the two collaborators:
//!
//! ```text
//! begin_turn ──► push_chunk* ──► finish_turn ──► reveal_tick* / finish_reveal
//!                    │                │                  │
//!                 Preview     DocumentHost::      EditorSurface::set_document_text
//!                             on_patch_applied    (then highlights + focus)
//! ```
//!
//! Only the latest turn is live. Starting a new turn supersedes the previous one: its chunks
//! and its final result are discarded, and an in-flight reveal jumps straight to its end.

use crate::document::LineDocument;
use crate::envelope::{EditEnvelope, EnvelopeAction};
use crate::finalize::{EnvelopeFinalizer, fallback_block};
use crate::highlight::{HighlightKind, HighlightRange};
use crate::line_ending::{LineEnding, normalize_line_endings};
use crate::options::AssistOptions;
use crate::patch::apply_changes;
use crate::preview::{Preview, PreviewExtractor};
use crate::reveal::{RevealController, RevealStatus};
use crate::surface::{DocumentHost, EditorSurface};
use assist_core_lang::{Language, language_by_id, language_for_path};

/// Passive notice shown when an envelope was recognized but nothing in it could be applied.
pub const NOTHING_TO_APPLY_NOTICE: &str = "could not apply changes";

/// Identifies one request/response turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TurnId(u64);

impl TurnId {
    /// Raw turn number (monotonically increasing per session).
    pub fn get(self) -> u64 {
        self.0
    }
}

/// What finishing a turn did to the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Line-level changes were applied by the patch engine.
    Patched {
        /// Lines added by inserts and replaces.
        inserted: Vec<HighlightRange>,
        /// Anchor lines of deletions and replacements.
        touched: Vec<HighlightRange>,
    },
    /// The envelope carried full replacement content.
    Replaced,
    /// No envelope was found; a fenced code block from the narrative replaced the document.
    FencedFallback {
        /// Info string of the block that was used.
        info: String,
    },
    /// No envelope and no code: the response is conversation only.
    Narrative,
    /// An envelope was recognized but had nothing actionable.
    NothingToApply {
        /// Passive notice for the user.
        notice: &'static str,
    },
    /// The envelope targets a different document than the active one.
    TargetMismatch {
        /// Document the envelope names.
        target: String,
        /// Identifier of the active document.
        active: String,
    },
    /// The turn was superseded or aborted before it finished.
    Stale,
}

impl ApplyOutcome {
    /// Returns `true` if the document was changed (and a reveal started).
    pub fn is_applied(&self) -> bool {
        matches!(
            self,
            Self::Patched { .. } | Self::Replaced | Self::FencedFallback { .. }
        )
    }

    /// A passive notice for the user, if the outcome warrants one.
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            Self::NothingToApply { notice } => Some(*notice),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct ActiveDocument {
    identifier: String,
    language: Option<&'static Language>,
}

#[derive(Debug)]
struct Turn {
    id: TurnId,
    buffer: String,
}

#[derive(Debug)]
struct PendingReveal {
    turn: TurnId,
    controller: RevealController,
    inserted: Vec<HighlightRange>,
    touched: Vec<HighlightRange>,
}

/// Drives assistant turns against one editing surface and document host.
#[derive(Debug)]
pub struct AssistSession<S, H> {
    surface: S,
    host: H,
    options: AssistOptions,
    finalizer: EnvelopeFinalizer,
    extractor: PreviewExtractor,
    active: Option<ActiveDocument>,
    next_turn: u64,
    turn: Option<Turn>,
    reveal: Option<PendingReveal>,
}

impl<S: EditorSurface, H: DocumentHost> AssistSession<S, H> {
    /// Create a session with default options.
    pub fn new(surface: S, host: H) -> Self {
        Self::with_options(surface, host, AssistOptions::default())
    }

    /// Create a session with explicit options.
    pub fn with_options(surface: S, host: H, options: AssistOptions) -> Self {
        Self {
            surface,
            host,
            finalizer: EnvelopeFinalizer::from_options(&options),
            extractor: PreviewExtractor::from_options(&options, None),
            options,
            active: None,
            next_turn: 0,
            turn: None,
            reveal: None,
        }
    }

    /// The editing surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access to the editing surface (e.g. to reflect user typing in tests).
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// The document host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Session options.
    pub fn options(&self) -> &AssistOptions {
        &self.options
    }

    /// Identifier of the active document, if one was set.
    pub fn active_document(&self) -> Option<&str> {
        self.active.as_ref().map(|active| active.identifier.as_str())
    }

    /// Fence tag previews label code with.
    pub fn fence_tag(&self) -> &str {
        self.extractor.fence_tag()
    }

    /// Set the document edits are applied to.
    ///
    /// `language` is a language id (`"rust"`); when absent or unknown, it is derived from the
    /// identifier's extension.
    pub fn set_active_document(&mut self, identifier: impl Into<String>, language: Option<&str>) {
        let identifier = identifier.into();
        let language = language
            .and_then(language_by_id)
            .or_else(|| language_for_path(&identifier));
        let fence_tag = language.map(|language| language.fence_tag);
        tracing::debug!(identifier = %identifier, fence_tag, "active document changed");

        self.extractor = PreviewExtractor::from_options(&self.options, fence_tag);
        self.active = Some(ActiveDocument {
            identifier,
            language,
        });
    }

    /// The live turn, if any.
    pub fn current_turn(&self) -> Option<TurnId> {
        self.turn.as_ref().map(|turn| turn.id)
    }

    /// Text received so far for `turn`.
    pub fn buffer(&self, turn: TurnId) -> Option<&str> {
        self.live(turn).map(|turn| turn.buffer.as_str())
    }

    /// Start a new turn, superseding any previous one.
    ///
    /// A reveal still in progress jumps to its final text (with highlights) first.
    pub fn begin_turn(&mut self) -> TurnId {
        self.finish_reveal();
        if let Some(previous) = self.turn.take() {
            tracing::debug!(turn = previous.id.0, "turn superseded");
        }

        self.next_turn += 1;
        let id = TurnId(self.next_turn);
        self.turn = Some(Turn {
            id,
            buffer: String::new(),
        });
        tracing::debug!(turn = id.0, "turn started");
        id
    }

    /// Append a chunk to `turn` and render a preview of everything received so far.
    ///
    /// Returns `None` for a turn that is no longer live.
    pub fn push_chunk(&mut self, turn: TurnId, chunk: &str) -> Option<Preview> {
        let Some(live) = self.turn.as_mut().filter(|live| live.id == turn) else {
            tracing::debug!(turn = turn.0, "dropping chunk for stale turn");
            return None;
        };
        live.buffer.push_str(chunk);
        Some(self.extractor.extract(&live.buffer))
    }

    /// Drop `turn` without touching the document (transport failure or user abort).
    ///
    /// Returns `false` if the turn was not live.
    pub fn abort_turn(&mut self, turn: TurnId) -> bool {
        if self.live(turn).is_none() {
            return false;
        }
        self.turn = None;
        tracing::debug!(turn = turn.0, "turn aborted");
        true
    }

    /// Finalize `turn`: recognize the envelope, apply it and start the reveal.
    pub fn finish_turn(&mut self, turn: TurnId) -> ApplyOutcome {
        let Some(Turn { buffer, .. }) = self.turn.take_if(|live| live.id == turn) else {
            tracing::debug!(turn = turn.0, "ignoring result of stale turn");
            return ApplyOutcome::Stale;
        };

        let outcome = match self.finalizer.finalize(&buffer) {
            Some(envelope) => self.apply_envelope(turn, &envelope),
            None => self.apply_fallback(turn, &buffer),
        };
        tracing::debug!(turn = turn.0, ?outcome, "turn finished");
        outcome
    }

    /// Returns `true` while a reveal is in progress.
    pub fn is_revealing(&self) -> bool {
        self.reveal.is_some()
    }

    /// The turn whose edit is being revealed.
    pub fn revealing_turn(&self) -> Option<TurnId> {
        self.reveal.as_ref().map(|pending| pending.turn)
    }

    /// Paint the next reveal step onto the surface.
    pub fn reveal_tick(&mut self) -> RevealStatus {
        let Some(pending) = self.reveal.as_mut() else {
            return RevealStatus::Idle;
        };
        if let Some(prefix) = pending.controller.tick() {
            self.surface.set_document_text(prefix);
        }
        if pending.controller.is_complete() {
            self.complete_reveal();
            RevealStatus::Complete
        } else {
            RevealStatus::InProgress
        }
    }

    /// Jump an in-progress reveal to its final text.
    ///
    /// Returns `false` if nothing was being revealed.
    pub fn finish_reveal(&mut self) -> bool {
        let Some(pending) = self.reveal.as_mut() else {
            return false;
        };
        if let Some(text) = pending.controller.finish() {
            self.surface.set_document_text(text);
        }
        self.complete_reveal();
        true
    }

    fn live(&self, turn: TurnId) -> Option<&Turn> {
        self.turn.as_ref().filter(|live| live.id == turn)
    }

    fn apply_envelope(&mut self, turn: TurnId, envelope: &EditEnvelope) -> ApplyOutcome {
        if let Some(mismatch) = self.target_mismatch(envelope) {
            tracing::warn!(?mismatch, "envelope targets another document");
            return mismatch;
        }

        let current = self.surface.document_text();
        match envelope.action() {
            EnvelopeAction::ReplaceAll(content) => {
                let document = LineDocument::from_text(content)
                    .with_line_ending(LineEnding::detect_in_text(&current));
                self.commit(turn, &document, Vec::new(), Vec::new());
                ApplyOutcome::Replaced
            }
            EnvelopeAction::Patch(changes) => {
                let document = LineDocument::from_text(&current);
                let Some(result) = apply_changes(&document, changes) else {
                    return nothing_to_apply();
                };
                let outcome = ApplyOutcome::Patched {
                    inserted: result.inserted.clone(),
                    touched: result.touched.clone(),
                };
                self.commit(turn, &result.document, result.inserted, result.touched);
                outcome
            }
            EnvelopeAction::Nothing => {
                tracing::debug!("envelope has nothing to apply");
                nothing_to_apply()
            }
        }
    }

    fn apply_fallback(&mut self, turn: TurnId, buffer: &str) -> ApplyOutcome {
        let language = self.active.as_ref().and_then(|active| active.language);
        let Some(block) = fallback_block(buffer, language) else {
            tracing::debug!("narrative response without code");
            return ApplyOutcome::Narrative;
        };
        tracing::debug!(info = %block.info, "no envelope; inserting fenced block");

        let document = LineDocument::from_text(&block.content)
            .with_line_ending(LineEnding::detect_in_text(&self.surface.document_text()));
        self.commit(turn, &document, Vec::new(), Vec::new());
        ApplyOutcome::FencedFallback { info: block.info }
    }

    fn target_mismatch(&self, envelope: &EditEnvelope) -> Option<ApplyOutcome> {
        let target = envelope.target_file_identifier.as_deref()?.trim();
        let active = self.active.as_ref()?;
        if target.is_empty() || same_document(target, &active.identifier) {
            return None;
        }
        Some(ApplyOutcome::TargetMismatch {
            target: target.to_string(),
            active: active.identifier.clone(),
        })
    }

    /// Hand `document` to the host and start revealing it on the surface.
    ///
    /// Both receive the text in the document's own line endings, so the next turn detects the
    /// same style from the surface.
    fn commit(
        &mut self,
        turn: TurnId,
        document: &LineDocument,
        inserted: Vec<HighlightRange>,
        touched: Vec<HighlightRange>,
    ) {
        self.finish_reveal();
        let text = document.text_with_line_ending();
        self.host.on_patch_applied(&text);
        let controller = RevealController::new(text, self.options.reveal_steps);
        tracing::debug!(turn = turn.0, ticks = controller.total_ticks(), "reveal started");
        self.reveal = Some(PendingReveal {
            turn,
            controller,
            inserted,
            touched,
        });
    }

    fn complete_reveal(&mut self) {
        let Some(pending) = self.reveal.take() else {
            return;
        };
        let shown = normalize_line_endings(&self.surface.document_text());
        if shown != normalize_line_endings(pending.controller.target()) {
            // the user typed over the reveal; highlights would point at the wrong lines
            tracing::debug!("surface diverged from reveal target; skipping highlights");
            return;
        }

        self.surface.clear_highlights();
        if !pending.inserted.is_empty() {
            self.surface.set_highlight(&pending.inserted, HighlightKind::Inserted);
        }
        if !pending.touched.is_empty() {
            self.surface.set_highlight(&pending.touched, HighlightKind::Touched);
        }
        self.surface.focus_at_end();
    }
}

fn nothing_to_apply() -> ApplyOutcome {
    ApplyOutcome::NothingToApply {
        notice: NOTHING_TO_APPLY_NOTICE,
    }
}

/// Whether two document identifiers (paths or URIs) plausibly name the same document.
///
/// Separators are unified and a leading `file://` is dropped; one identifier may be a
/// path-suffix of the other (`src/main.rs` matches `/home/me/project/src/main.rs`).
fn same_document(a: &str, b: &str) -> bool {
    fn clean(id: &str) -> String {
        let id = id.strip_prefix("file://").unwrap_or(id);
        id.replace('\\', "/").trim_start_matches("./").to_string()
    }
    fn is_suffix(long: &str, short: &str) -> bool {
        long.len() > short.len()
            && long.ends_with(short)
            && long[..long.len() - short.len()].ends_with('/')
    }

    let (a, b) = (clean(a), clean(b));
    a == b || is_suffix(&a, &b) || is_suffix(&b, &a)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_document() {
        assert!(same_document("src/main.rs", "/home/me/proj/src/main.rs"));
        assert!(same_document("file:///c/x.py", "/c/x.py"));
        assert!(same_document("C:\\proj\\a.rs", "proj/a.rs"));
        assert!(same_document("./a.rs", "a.rs"));
        assert!(!same_document("main.rs", "/proj/domain.rs"));
        assert!(!same_document("lib.rs", "main.rs"));
    }

    #[test]
    fn test_turn_ids_increase() {
        let mut session = AssistSession::new(NullSurface::default(), ());
        let first = session.begin_turn();
        let second = session.begin_turn();
        assert!(second > first);
        assert_eq!(session.current_turn(), Some(second));
        assert_eq!(session.push_chunk(first, "x"), None);
        assert!(!session.abort_turn(first));
        assert!(session.abort_turn(second));
        assert_eq!(session.finish_turn(second), ApplyOutcome::Stale);
    }

    #[derive(Default)]
    struct NullSurface(String);

    impl EditorSurface for NullSurface {
        fn document_text(&self) -> String {
            self.0.clone()
        }
        fn set_document_text(&mut self, text: &str) {
            self.0 = text.to_string();
        }
        fn set_highlight(&mut self, _ranges: &[HighlightRange], _kind: HighlightKind) {}
        fn clear_highlights(&mut self) {}
        fn focus_at_end(&mut self) {}
    }
}
