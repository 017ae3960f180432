use serde_json::Value;
use tracing::warn;

use crate::classify::classify_error;
use crate::errors::ClassifiedError;
use crate::event::{AgentEvent, UNKNOWN_AUTHOR};

/// Prefix that marks a logical line as a data frame.
pub const DATA_PREFIX: &str = "data:";

/// Decodes one logical line.
///
/// Non-data lines (comments, `event:` lines, blank separators) and data
/// frames whose payload is not a JSON object yield `Ok(None)`; the latter are
/// logged as warnings. An `error` payload is classified and returned as
/// `Err`, which ends the stream.
pub fn parse_frame(line: &str) -> Result<Option<AgentEvent>, ClassifiedError> {
    let Some(rest) = line.strip_prefix(DATA_PREFIX) else {
        return Ok(None);
    };
    let payload = rest.trim_start();

    let value: Value = match serde_json::from_str(payload) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, frame = %line, "dropping undecodable SSE frame");
            return Ok(None);
        }
    };
    if !value.is_object() {
        warn!(frame = %line, "dropping SSE frame whose payload is not a JSON object");
        return Ok(None);
    }

    if let Some(message) = error_text(&value) {
        return Err(classify_error(&message));
    }
    Ok(extract_event(&value))
}

/// Builds an event from a content payload, or `None` when it has no text.
pub fn extract_event(value: &Value) -> Option<AgentEvent> {
    let author = value
        .get("author")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .unwrap_or(UNKNOWN_AUTHOR);

    let mut text = String::new();
    if let Some(parts) = value
        .get("content")
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())
    {
        for part in parts {
            if let Some(fragment) = part.get("text").and_then(|t| t.as_str()) {
                text.push_str(fragment);
            }
        }
    }
    AgentEvent::new(author, text)
}

fn error_text(value: &Value) -> Option<String> {
    match value.get("error")? {
        Value::String(message) if !message.is_empty() => Some(message.clone()),
        Value::Object(inner) => inner
            .get("message")
            .and_then(|m| m.as_str())
            .filter(|m| !m.is_empty())
            .map(ToOwned::to_owned),
        _ => None,
    }
}
