//! Event normalization
//!
//! Turns a [`RawEvent`] into a [`NormalizedEvent`] whose payload has been
//! resolved to exactly one [`DisplayPayload`] variant. Normalization never
//! fails: missing or oddly shaped fields degrade to empty or stringified text.
//!
//! Payload fields are checked in a fixed order and the first one present wins:
//!
//! | Field | Payload |
//! |-------|---------|
//! | `thought` | [`DisplayPayload::Thought`] |
//! | `action` | [`DisplayPayload::Action`] |
//! | `observation` | [`DisplayPayload::Error`] if it carries `error`, else [`DisplayPayload::Observation`] |
//! | `content` | [`DisplayPayload::Content`] |
//! | `system_prompt` | [`DisplayPayload::Content`] from its `text` field |

use crate::types::{DisplayPayload, NormalizedEvent, RawEvent};
use serde_json::Value;

/// Render a JSON value as display text.
///
/// Strings pass through unchanged, `null` and absent values become the empty
/// string, and everything else is pretty-printed JSON.
pub fn stringify(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

fn thought_text(thought: &Value) -> String {
    match thought {
        Value::Array(parts) => parts
            .iter()
            .map(|part| stringify(Some(part)))
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Object(map) if map.contains_key("text") => stringify(map.get("text")),
        other => stringify(Some(other)),
    }
}

/// Resolve the display payload of a raw event.
pub fn resolve_payload(raw: &RawEvent) -> DisplayPayload {
    if let Some(thought) = &raw.thought {
        return DisplayPayload::Thought(thought_text(thought));
    }

    if let Some(action) = &raw.action {
        return DisplayPayload::Action(stringify(Some(action)));
    }

    if let Some(observation) = &raw.observation {
        // `get` only matches keys on objects
        return match observation.get("error") {
            Some(error) => DisplayPayload::Error(stringify(Some(error))),
            None => DisplayPayload::Observation(stringify(Some(observation))),
        };
    }

    if let Some(content) = &raw.content {
        return DisplayPayload::Content(stringify(Some(content)));
    }

    if let Some(prompt) = &raw.system_prompt {
        return DisplayPayload::Content(stringify(prompt.get("text")));
    }

    DisplayPayload::None
}

/// Normalize one raw event.
pub fn normalize_event(raw: &RawEvent) -> NormalizedEvent {
    NormalizedEvent {
        id: raw.id.clone(),
        source: raw.source.clone(),
        kind: raw.kind.clone(),
        timestamp: raw.timestamp.clone(),
        duration: raw.duration.as_ref().and_then(Value::as_f64),
        display_payload: resolve_payload(raw),
    }
}

/// Normalize a conversation's events, preserving order.
pub fn normalize_events(events: &[RawEvent]) -> Vec<NormalizedEvent> {
    events.iter().map(normalize_event).collect()
}
