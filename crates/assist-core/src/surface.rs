//! Collaborator interfaces.
//!
//! The kernel never owns a widget or a file. It talks to two external parties:
//!
//! - the [`EditorSurface`] the user is looking at (text, highlights, caret), and
//! - the [`DocumentHost`] that owns the document state (persistence, undo history, sync).
//!
//! Both are plain traits so they can be backed by a GUI widget, a terminal view or a test double.

use crate::highlight::{HighlightKind, HighlightRange};

/// The live editing surface.
pub trait EditorSurface {
    /// Current full text of the surface.
    fn document_text(&self) -> String;

    /// Replace the full text of the surface.
    fn set_document_text(&mut self, text: &str);

    /// Emphasize `ranges` (1-based, post-edit lines) with the given kind.
    fn set_highlight(&mut self, ranges: &[HighlightRange], kind: HighlightKind);

    /// Remove every highlight previously set by the kernel.
    fn clear_highlights(&mut self);

    /// Move the caret to the end of the document and focus the surface.
    fn focus_at_end(&mut self);
}

/// Owner of the document state.
pub trait DocumentHost {
    /// Called once per applied edit with the complete new text, before the reveal starts.
    ///
    /// The text uses the document's original line endings.
    fn on_patch_applied(&mut self, new_text: &str);
}

impl<T: EditorSurface + ?Sized> EditorSurface for &mut T {
    fn document_text(&self) -> String {
        (**self).document_text()
    }

    fn set_document_text(&mut self, text: &str) {
        (**self).set_document_text(text);
    }

    fn set_highlight(&mut self, ranges: &[HighlightRange], kind: HighlightKind) {
        (**self).set_highlight(ranges, kind);
    }

    fn clear_highlights(&mut self) {
        (**self).clear_highlights();
    }

    fn focus_at_end(&mut self) {
        (**self).focus_at_end();
    }
}

impl<T: DocumentHost + ?Sized> DocumentHost for &mut T {
    fn on_patch_applied(&mut self, new_text: &str) {
        (**self).on_patch_applied(new_text);
    }
}

/// A host that ignores applied edits.
impl DocumentHost for () {
    fn on_patch_applied(&mut self, _new_text: &str) {}
}
