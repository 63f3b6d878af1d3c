#![warn(missing_docs)]
//! `assist-core-stream` - async stream integration for `assist-core`.
//!
//! This crate connects an assistant's network response to an `assist_core::AssistSession`:
//! event framing (JSON event objects, server-sent events), a timer-driven reveal with a cancel
//! handle, and a turn driver that applies chunks in order, honours aborts and lets the latest
//! request supersede older ones.

pub mod driver;
mod error;
pub mod events;
pub mod reveal;
pub mod transport;

pub use driver::{AssistController, SharedSession, TurnEvent, run_turn};
pub use error::StreamError;
pub use events::StreamEvent;
pub use reveal::{RevealHandle, reveal, run_reveal};
pub use transport::{DONE_SENTINEL, SseDecoder, sse_events};
