use chrono::{DateTime, Utc};

/// Author used when a frame does not name one.
pub const UNKNOWN_AUTHOR: &str = "unknown";

/// One piece of agent output decoded from a content frame.
///
/// `text` is never empty or whitespace-only; frames without usable text do
/// not produce an event.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AgentEvent {
    /// Name of the sub-agent that produced the text (for example `WeatherAgent`).
    pub author: String,
    /// Concatenated text of all content parts, in order.
    pub text: String,
    /// Instant the frame was decoded on the client.
    pub timestamp: DateTime<Utc>,
}

impl AgentEvent {
    /// Creates an event stamped with the current instant.
    ///
    /// Returns `None` when `text` has no non-whitespace content.
    pub fn new(author: impl Into<String>, text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return None;
        }
        Some(Self {
            author: author.into(),
            text,
            timestamp: Utc::now(),
        })
    }
}
