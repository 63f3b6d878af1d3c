//! Inbound stream events.
//!
//! Providers frame their streamed output differently. This module folds the common JSON event
//! shapes into one [`StreamEvent`] type so the turn driver only sees text, end and error.
//!
//! Recognized shapes:
//!
//! ```json
//! {"type": "text", "text": "chunk"}
//! {"type": "delta", "delta": "chunk"}
//! {"type": "content_block_delta", "delta": {"text": "chunk"}}
//! {"content": "chunk"}
//! {"type": "done"}
//! {"type": "error", "error": {"message": "overloaded"}}
//! ```

use serde_json::Value;

const TEXT_TYPES: &[&str] = &[
    "text",
    "delta",
    "chunk",
    "content",
    "content_block_delta",
    "message",
];
const DONE_TYPES: &[&str] = &["done", "end", "stop", "message_stop", "finish"];
const TEXT_KEYS: &[&str] = &["text", "content", "delta"];

#[derive(Debug, Clone, PartialEq)]
/// One event of an assistant response stream.
pub enum StreamEvent {
    /// A chunk of response text.
    Text(String),
    /// The response is complete.
    Done,
    /// The provider reported an error; the turn must be aborted.
    Error(String),
    /// Anything else (keep-alives, metadata). Ignored by the driver.
    Other(Value),
}

impl StreamEvent {
    /// Interpret a JSON event object.
    pub fn from_value(value: &Value) -> Self {
        let kind = value
            .get("type")
            .or_else(|| value.get("event"))
            .and_then(Value::as_str)
            .map(str::to_ascii_lowercase);

        match kind.as_deref() {
            Some("error") => return Self::Error(error_message(value)),
            Some(kind) if DONE_TYPES.contains(&kind) => return Self::Done,
            Some(kind) if !TEXT_TYPES.contains(&kind) => return Self::Other(value.clone()),
            _ => {}
        }

        match text_of(value) {
            Some(text) => Self::Text(text.to_string()),
            None => Self::Other(value.clone()),
        }
    }

    /// Interpret one event payload: a JSON object, or plain text when it is not JSON.
    pub fn from_payload(payload: &str) -> Self {
        match serde_json::from_str::<Value>(payload) {
            Ok(value) if value.is_object() => Self::from_value(&value),
            Ok(Value::String(text)) => Self::Text(text),
            _ => Self::Text(payload.to_string()),
        }
    }
}

fn text_of(value: &Value) -> Option<&str> {
    TEXT_KEYS.iter().find_map(|key| match value.get(key)? {
        Value::String(text) => Some(text.as_str()),
        nested @ Value::Object(_) => nested
            .get("text")
            .or_else(|| nested.get("content"))
            .and_then(Value::as_str),
        _ => None,
    })
}

fn error_message(value: &Value) -> String {
    let error = value.get("error");
    error
        .and_then(|error| error.get("message"))
        .or(error)
        .or_else(|| value.get("message"))
        .and_then(Value::as_str)
        .unwrap_or("unknown stream error")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_shapes() {
        for value in [
            json!({"type": "text", "text": "hi"}),
            json!({"type": "delta", "delta": "hi"}),
            json!({"type": "content_block_delta", "delta": {"type": "text_delta", "text": "hi"}}),
            json!({"content": "hi"}),
        ] {
            assert_eq!(StreamEvent::from_value(&value), StreamEvent::Text("hi".into()));
        }
    }

    #[test]
    fn test_done_and_error() {
        assert_eq!(StreamEvent::from_value(&json!({"type": "DONE"})), StreamEvent::Done);
        assert_eq!(
            StreamEvent::from_value(&json!({"type": "error", "error": {"message": "overloaded"}})),
            StreamEvent::Error("overloaded".into())
        );
        assert_eq!(
            StreamEvent::from_value(&json!({"type": "error", "error": "boom"})),
            StreamEvent::Error("boom".into())
        );
    }

    #[test]
    fn test_unknown_events_are_other() {
        let ping = json!({"type": "ping"});
        assert_eq!(StreamEvent::from_value(&ping), StreamEvent::Other(ping.clone()));
        assert!(matches!(
            StreamEvent::from_value(&json!({"type": "text"})),
            StreamEvent::Other(_)
        ));
    }

    #[test]
    fn test_plain_payloads() {
        assert_eq!(StreamEvent::from_payload("raw words"), StreamEvent::Text("raw words".into()));
        assert_eq!(StreamEvent::from_payload("\"quoted\""), StreamEvent::Text("quoted".into()));
        assert_eq!(StreamEvent::from_payload("42"), StreamEvent::Text("42".into()));
    }
}
