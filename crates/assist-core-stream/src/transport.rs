//! Server-sent events framing.
//!
//! Streaming HTTP APIs deliver events as `text/event-stream`:
//!
//! ```text
//! event: delta\n
//! data: {"type":"text","text":"Hel"}\n
//! \n
//! data: [DONE]\n
//! \n
//! ```
//!
//! Network reads do not respect event boundaries, so [`SseDecoder`] buffers partial lines across
//! chunks and only dispatches an event at its terminating blank line.

use crate::error::StreamError;
use crate::events::StreamEvent;
use futures_util::{Stream, StreamExt, stream};
use std::collections::VecDeque;

/// Sentinel payload some providers send instead of a final event object.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Incremental decoder from raw byte chunks to [`StreamEvent`]s.
#[derive(Debug, Default)]
pub struct SseDecoder {
    pending: Vec<u8>,
    data: Vec<String>,
}

impl SseDecoder {
    /// Create an empty decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return every event completed by it.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        self.pending.extend_from_slice(chunk);
        let mut events = Vec::new();
        while let Some(newline) = self.pending.iter().position(|b| *b == b'\n') {
            let line = self.pending.drain(..=newline).collect::<Vec<_>>();
            let line = String::from_utf8_lossy(&line);
            self.line(line.trim_end_matches(['\r', '\n']), &mut events);
        }
        events
    }

    /// Flush a trailing line and any undispatched event at end of stream.
    pub fn finish(&mut self) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        if !self.pending.is_empty() {
            let line = std::mem::take(&mut self.pending);
            let line = String::from_utf8_lossy(&line);
            self.line(line.trim_end_matches('\r'), &mut events);
        }
        self.dispatch(&mut events);
        events
    }

    fn line(&mut self, line: &str, events: &mut Vec<StreamEvent>) {
        if line.is_empty() {
            self.dispatch(events);
            return;
        }
        // `event:`, `id:`, `retry:` and `:` comments carry nothing the driver needs
        if let Some(data) = line.strip_prefix("data:") {
            self.data.push(data.strip_prefix(' ').unwrap_or(data).to_string());
        }
    }

    fn dispatch(&mut self, events: &mut Vec<StreamEvent>) {
        if self.data.is_empty() {
            return;
        }
        let payload = self.data.join("\n");
        self.data.clear();

        let event = if payload.trim() == DONE_SENTINEL {
            StreamEvent::Done
        } else {
            StreamEvent::from_payload(&payload)
        };
        tracing::trace!(?event, "sse event");
        events.push(event);
    }
}

/// Decode a stream of raw byte chunks as server-sent events.
///
/// A chunk error becomes [`StreamError::Transport`] and ends the stream.
pub fn sse_events<S, B, E>(bytes: S) -> impl Stream<Item = Result<StreamEvent, StreamError>>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    let state = (bytes, SseDecoder::new(), VecDeque::new(), false);
    stream::unfold(
        state,
        |(mut bytes, mut decoder, mut queue, mut ended)| async move {
            loop {
                if let Some(event) = queue.pop_front() {
                    return Some((Ok(event), (bytes, decoder, queue, ended)));
                }
                if ended {
                    return None;
                }
                match bytes.next().await {
                    Some(Ok(chunk)) => queue.extend(decoder.push(chunk.as_ref())),
                    Some(Err(err)) => {
                        let err = StreamError::Transport(err.to_string());
                        return Some((Err(err), (bytes, decoder, queue, true)));
                    }
                    None => {
                        ended = true;
                        queue.extend(decoder.finish());
                    }
                }
            }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text(s: &str) -> StreamEvent {
        StreamEvent::Text(s.to_string())
    }

    #[test]
    fn test_frames_split_across_chunks() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"data: {\"type\":\"text\",").is_empty());
        assert!(decoder.push(b"\"text\":\"He").is_empty());
        assert_eq!(decoder.push(b"l\"}\r\n\r\ndata: [DO"), vec![text("Hel")]);
        assert_eq!(decoder.push(b"NE]\n\n"), vec![StreamEvent::Done]);
    }

    #[test]
    fn test_multibyte_char_split_between_chunks() {
        let mut decoder = SseDecoder::new();
        let bytes = "data: héllo\n\n".as_bytes();
        let (a, b) = bytes.split_at(8);
        assert!(decoder.push(a).is_empty());
        assert_eq!(decoder.push(b), vec![text("héllo")]);
    }

    #[test]
    fn test_comments_fields_and_multiline_data() {
        let mut decoder = SseDecoder::new();
        let events =
            decoder.push(b": keep-alive\nevent: delta\nid: 7\ndata:line one\ndata: line two\n\n");
        assert_eq!(events, vec![text("line one\nline two")]);
    }

    #[test]
    fn test_finish_flushes_unterminated_event() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"data: tail").is_empty());
        assert_eq!(decoder.finish(), vec![text("tail")]);
        assert!(decoder.finish().is_empty());
    }

    #[tokio::test]
    async fn test_sse_events_stream() {
        let chunks = stream::iter(vec![
            Ok::<_, std::io::Error>(b"data: {\"text\":\"a\"}\n\nda".to_vec()),
            Ok(b"ta: {\"text\":\"b\"}\n\n".to_vec()),
            Err(std::io::Error::other("reset")),
            Ok(b"data: never\n\n".to_vec()),
        ]);
        let events = sse_events(chunks).collect::<Vec<_>>().await;

        assert_eq!(events.len(), 3);
        assert_eq!(events[0].as_ref().ok(), Some(&text("a")));
        assert_eq!(events[1].as_ref().ok(), Some(&text("b")));
        assert!(matches!(&events[2], Err(StreamError::Transport(msg)) if msg == "reset"));
    }
}
