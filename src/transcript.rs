//! Conversation transcript types and windowing
//!
//! A session transcript is an append-only list of counselor and client
//! messages. Every prompt tier sees a bounded window of the most recent
//! messages, rendered as a numbered, speaker-labeled list.

use crate::providers::ChatMessage;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who wrote a transcript message
///
/// The browser client sends `user`/`assistant`; both spellings are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Speaker {
    /// The trainee counselor
    #[serde(rename = "counselor", alias = "user")]
    Counselor,
    /// The simulated client
    #[serde(rename = "client", alias = "assistant")]
    Client,
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Counselor => write!(f, "Counselor"),
            Self::Client => write!(f, "Client"),
        }
    }
}

/// One transcript entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Author of the message
    pub role: Speaker,
    /// Message text
    pub content: String,
}

impl Message {
    /// Creates a counselor message
    pub fn counselor(content: impl Into<String>) -> Self {
        Self {
            role: Speaker::Counselor,
            content: content.into(),
        }
    }

    /// Creates a client message
    pub fn client(content: impl Into<String>) -> Self {
        Self {
            role: Speaker::Client,
            content: content.into(),
        }
    }

    /// Maps the message onto a prompt message from the simulated client's
    /// point of view (counselor speaks as `user`, client as `assistant`)
    pub fn to_chat_message(&self) -> ChatMessage {
        match self.role {
            Speaker::Counselor => ChatMessage::user(self.content.clone()),
            Speaker::Client => ChatMessage::assistant(self.content.clone()),
        }
    }
}

/// Returns the most recent `keep` messages, preserving order
///
/// # Examples
///
/// ```
/// use crisis_coach::transcript::{select_recent, Message};
///
/// let messages = vec![
///     Message::client("a"),
///     Message::counselor("b"),
///     Message::client("c"),
/// ];
/// assert_eq!(select_recent(&messages, 2), &messages[1..]);
/// assert_eq!(select_recent(&messages, 10).len(), 3);
/// ```
pub fn select_recent(messages: &[Message], keep: usize) -> &[Message] {
    &messages[messages.len().saturating_sub(keep)..]
}

/// Renders messages as `1. Counselor: ...` / `2. Client: ...` lines
///
/// # Examples
///
/// ```
/// use crisis_coach::transcript::{render_transcript, Message};
///
/// let text = render_transcript(&[Message::client("Hi."), Message::counselor("Hello.")]);
/// assert_eq!(text, "1. Client: Hi.\n2. Counselor: Hello.");
/// ```
pub fn render_transcript(messages: &[Message]) -> String {
    messages
        .iter()
        .enumerate()
        .map(|(idx, message)| format!("{}. {}: {}", idx + 1, message.role, message.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Number of counselor-authored messages, i.e. completed or pending turns
pub fn counselor_turns(messages: &[Message]) -> usize {
    messages
        .iter()
        .filter(|message| message.role == Speaker::Counselor)
        .count()
}

/// Most recent counselor message, if any
pub fn last_counselor_message(messages: &[Message]) -> Option<&str> {
    messages
        .iter()
        .rev()
        .find(|message| message.role == Speaker::Counselor)
        .map(|message| message.content.as_str())
}

/// Trims `value` and cuts it to `max` characters with a trailing `...`
///
/// Blank or missing input becomes `Not provided`.
pub fn shorten(value: Option<&str>, max: usize) -> String {
    let text = value.unwrap_or("").trim();
    if text.is_empty() {
        return "Not provided".to_string();
    }
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max).collect();
    format!("{}...", cut.trim())
}

/// Shortens up to `take` items and joins them with `; `
pub fn shorten_list(values: &[String], item_max: usize, take: usize) -> String {
    if values.is_empty() {
        return "Not provided".to_string();
    }
    values
        .iter()
        .take(take)
        .map(|value| shorten(Some(value), item_max))
        .collect::<Vec<_>>()
        .join("; ")
}
