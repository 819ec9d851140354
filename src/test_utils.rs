//! Test utilities for Crisis Coach
//!
//! This module provides a scripted [`CompletionClient`] that replays canned
//! completions and errors while recording every request, plus small transcript
//! and config helpers.

use crate::config::ModelConfig;
use crate::error::{CoachError, Result};
use crate::providers::{CompletionClient, CompletionRequest, CompletionResult};
use crate::transcript::Message;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Mutex;
use tempfile::TempDir;

type Reply = Box<dyn FnOnce() -> Result<CompletionResult> + Send>;
type RepeatReply = Box<dyn Fn() -> Result<CompletionResult> + Send + Sync>;

/// Completion client that replays a fixed script
///
/// Queued replies are consumed in order; once the queue is empty the repeat
/// reply (if any) answers every further call. Without one, extra calls fail
/// with a non-retryable error.
///
/// # Examples
///
/// ```ignore
/// let client = ScriptedClient::new()
///     .with_error(CoachError::EmptyContent { finish_reason: "length".into() })
///     .with_text("I can't sleep.", "stop");
/// ```
pub struct ScriptedClient {
    queue: Mutex<VecDeque<Reply>>,
    repeat: Option<RepeatReply>,
    requests: Mutex<Vec<CompletionRequest>>,
    configured: bool,
}

impl Default for ScriptedClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedClient {
    /// Creates an empty, configured script
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            repeat: None,
            requests: Mutex::new(Vec::new()),
            configured: true,
        }
    }

    /// Queues one successful completion
    pub fn with_text(self, text: &str, finish_reason: &str) -> Self {
        let result = CompletionResult::new(text, finish_reason);
        self.push(Box::new(move || Ok(result)))
    }

    /// Queues one failure
    pub fn with_error(self, error: CoachError) -> Self {
        self.push(Box::new(move || Err(error.into())))
    }

    /// Answers every call past the queue with this completion
    pub fn repeat_text(mut self, text: &str, finish_reason: &str) -> Self {
        let result = CompletionResult::new(text, finish_reason);
        self.repeat = Some(Box::new(move || Ok(result.clone())));
        self
    }

    /// Answers every call past the queue with a fresh error
    pub fn repeat_error(mut self, make: fn() -> CoachError) -> Self {
        self.repeat = Some(Box::new(move || Err(make().into())));
        self
    }

    /// Reports no credential, like a client built without an API key
    pub fn unconfigured(mut self) -> Self {
        self.configured = false;
        self
    }

    /// Number of `complete` calls so far
    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }

    /// Copies of every request received, in order
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    fn push(self, reply: Reply) -> Self {
        if let Ok(mut queue) = self.queue.lock() {
            queue.push_back(reply);
        }
        self
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResult> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        let next = self.queue.lock().ok().and_then(|mut q| q.pop_front());
        match (next, &self.repeat) {
            (Some(reply), _) => reply(),
            (None, Some(repeat)) => repeat(),
            (None, None) => Err(anyhow::anyhow!("ScriptedClient script exhausted")),
        }
    }

    fn model_name(&self) -> String {
        "scripted-model".to_string()
    }

    fn endpoint(&self) -> String {
        "http://scripted.test/api/paas/v4/chat/completions".to_string()
    }

    fn is_configured(&self) -> bool {
        self.configured
    }
}

/// Alternating transcript of `turns` counselor/client pairs, opening with the
/// client
pub fn sample_transcript(turns: usize) -> Vec<Message> {
    let mut messages = vec![Message::client("I don't really know why I'm here.")];
    for turn in 1..=turns {
        messages.push(Message::counselor(format!("Counselor turn {}", turn)));
        messages.push(Message::client(format!("Client reply {}", turn)));
    }
    messages
}

/// Model config pointing at `base_url` with a test key
pub fn test_model_config(base_url: &str) -> ModelConfig {
    ModelConfig {
        api_key: Some("test-key".to_string()),
        base_url: base_url.to_string(),
        ..Default::default()
    }
}

/// Writes `contents` to `config.yaml` in a fresh temporary directory
///
/// # Panics
///
/// Panics if the directory or file cannot be created
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("Failed to create temporary directory");
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, contents).expect("Failed to write config file");
    (dir, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ChatMessage;

    fn request() -> CompletionRequest {
        CompletionRequest {
            messages: vec![ChatMessage::user("x")],
            temperature: 0.1,
            max_tokens: 5,
        }
    }

    #[tokio::test]
    async fn test_script_order_then_repeat() {
        let client = ScriptedClient::new()
            .with_error(CoachError::Parse("bad".to_string()))
            .with_text("one", "stop")
            .repeat_text("again", "length");

        assert!(client.complete(&request()).await.is_err());
        assert_eq!(client.complete(&request()).await.unwrap().text, "one");
        assert_eq!(client.complete(&request()).await.unwrap().text, "again");
        assert_eq!(client.complete(&request()).await.unwrap().text, "again");
        assert_eq!(client.call_count(), 4);
    }

    #[tokio::test]
    async fn test_exhausted_script_errors() {
        let client = ScriptedClient::new();
        assert!(client.complete(&request()).await.is_err());
        assert!(client.is_configured());
        assert!(!ScriptedClient::new().unconfigured().is_configured());
    }

    #[test]
    fn test_sample_transcript_shape() {
        let messages = sample_transcript(2);
        assert_eq!(messages.len(), 5);
        assert_eq!(crate::transcript::counselor_turns(&messages), 2);
    }
}
