#![warn(missing_docs)]
//! Assist Core - headless kernel for AI-proposed document edits
//!
//! # Overview
//!
//! `assist-core` turns an assistant's streamed response into a safe edit of a live document.
//! It renders nothing itself: the editing surface and the document owner are collaborators
//! behind the [`EditorSurface`] and [`DocumentHost`] traits.
//!
//! Two problems sit at the center:
//!
//! - **Patch application**: line-level insert / delete / replace operations, all referring to
//!   the *original* document, are applied in one pass with a running line offset
//!   ([`apply_changes`]).
//! - **Tolerant streaming extraction**: while the response is still arriving as an unterminated
//!   JSON envelope, a readable preview (explanation, then code) is extracted without ever showing
//!   raw envelope syntax ([`extract_preview`]).
//!
//! # Pipeline
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  AssistSession (turns, supersession)         │  ← Public API
//! ├──────────────────────────────────────────────┤
//! │  PreviewExtractor      EnvelopeFinalizer     │  ← Streaming / final parse
//! ├──────────────────────────────────────────────┤
//! │  Patch Engine          Fence scanner         │  ← Applying edits
//! ├──────────────────────────────────────────────┤
//! │  LineDocument          RevealController      │  ← Text model / pacing
//! └──────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use assist_core::{apply_changes_to_text, extract_preview, ChangeOperation};
//!
//! let result = apply_changes_to_text(
//!     "fn main() {\n}\n",
//!     &[ChangeOperation::insert(1, "    println!(\"hi\");")],
//! )
//! .unwrap();
//! assert_eq!(result.text(), "fn main() {\n    println!(\"hi\");\n}\n");
//!
//! let preview = extract_preview(r#"{"explanation":"Say hi","changes":[{"content":"pri"#, "rust");
//! assert!(preview.display.starts_with("Say hi\n\n```rust\npri\n```"));
//! ```
//!
//! # Module Description
//!
//! - [`document`] - line document model
//! - [`change`] - change operations and lenient wire parsing
//! - [`patch`] - the patch engine
//! - [`envelope`] - edit envelopes
//! - [`preview`] - partial envelope extraction
//! - [`finalize`] - strict envelope recognition and narrative fallback
//! - [`fence`] - fenced code block scanning
//! - [`reveal`] - reveal stepping
//! - [`session`] - turn orchestration

pub mod change;
pub mod document;
pub mod envelope;
mod error;
pub mod fence;
pub mod finalize;
pub mod highlight;
pub mod line_ending;
pub mod options;
pub mod patch;
pub mod preview;
pub mod reveal;
mod scan;
pub mod session;
pub mod surface;

pub use change::{ChangeOperation, LineRefs, changes_from_value};
pub use document::LineDocument;
pub use envelope::{EditEnvelope, EnvelopeAction};
pub use error::AssistError;
pub use fence::{CodeBlock, Segment, code_blocks, split_fenced};
pub use finalize::{EnvelopeFinalizer, fallback_block, finalize_envelope};
pub use highlight::{HighlightKind, HighlightRange};
pub use line_ending::{LineEnding, normalize_line_endings};
pub use options::{AssistOptions, DEFAULT_GENERATING_PLACEHOLDER};
pub use patch::{PatchResult, apply_changes, apply_changes_to_text};
pub use preview::{GENERATING_MARKER, Preview, PreviewExtractor, extract_preview};
pub use reveal::{DEFAULT_REVEAL_STEPS, RevealController, RevealStatus};
pub use session::{ApplyOutcome, AssistSession, NOTHING_TO_APPLY_NOTICE, TurnId};
pub use surface::{DocumentHost, EditorSurface};
