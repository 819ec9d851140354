//! Base completion client trait and common types for Crisis Coach
//!
//! This module defines the [`CompletionClient`] trait every chat-completions
//! backend implements, along with the prompt message, request and result
//! types that flow between the task pipelines and the remote model.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Role of a prompt message sent to the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// Instructions for the model
    System,
    /// Input from the caller side of the conversation
    User,
    /// Prior model output
    Assistant,
}

/// Prompt message structure
///
/// Represents one role-tagged entry in the prompt sent to the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender
    pub role: ChatRole,
    /// Content of the message
    pub content: String,
}

impl ChatMessage {
    /// Creates a new system message
    ///
    /// # Examples
    ///
    /// ```
    /// use crisis_coach::providers::{ChatMessage, ChatRole};
    ///
    /// let msg = ChatMessage::system("You are a crisis-simulation client.");
    /// assert_eq!(msg.role, ChatRole::System);
    /// ```
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    /// Creates a new user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    /// Creates a new assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// One stateless completion call
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Ordered prompt messages
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature
    pub temperature: f32,
    /// Output token budget
    pub max_tokens: u32,
}

/// Text returned by a completion call together with its finish reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionResult {
    /// Extracted, trimmed model text (never empty)
    pub text: String,
    /// Provider finish reason (`stop`, `length`, ... or `unknown`)
    pub finish_reason: String,
}

impl CompletionResult {
    /// Create a new CompletionResult
    ///
    /// # Examples
    ///
    /// ```
    /// use crisis_coach::providers::CompletionResult;
    ///
    /// let result = CompletionResult::new("I can't sleep anymore.", "stop");
    /// assert_eq!(result.finish_reason, "stop");
    /// ```
    pub fn new(text: impl Into<String>, finish_reason: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            finish_reason: finish_reason.into(),
        }
    }
}

/// Chat-completions backend
///
/// Implementations perform exactly one remote call per `complete` and keep
/// no state between calls beyond connection pooling.
///
/// # Errors
///
/// Implementations must report failures as [`crate::error::CoachError`]
/// variants so the retry controller can classify them:
/// `Configuration` for a missing credential (raised before any network
/// traffic), `Provider` for non-success responses, and `EmptyContent` when
/// the provider succeeded without usable text.
///
/// # Examples
///
/// ```no_run
/// use crisis_coach::providers::{CompletionClient, CompletionRequest, CompletionResult};
/// use crisis_coach::error::Result;
/// use async_trait::async_trait;
///
/// struct EchoClient;
///
/// #[async_trait]
/// impl CompletionClient for EchoClient {
///     async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResult> {
///         let last = request.messages.last().map(|m| m.content.clone()).unwrap_or_default();
///         Ok(CompletionResult::new(last, "stop"))
///     }
/// }
/// ```
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Performs one completion call
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResult>;

    /// Identifier of the model requests are sent to
    fn model_name(&self) -> String {
        "unknown".to_string()
    }

    /// Endpoint requests are sent to, for response metadata
    fn endpoint(&self) -> String {
        String::new()
    }

    /// Whether a credential is available; task endpoints refuse to run
    /// without one
    fn is_configured(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_message_constructors() {
        assert_eq!(ChatMessage::system("a").role, ChatRole::System);
        assert_eq!(ChatMessage::user("b").role, ChatRole::User);
        assert_eq!(ChatMessage::assistant("c").role, ChatRole::Assistant);
    }

    #[test]
    fn test_chat_message_serializes_lowercase_role() {
        let json = serde_json::to_value(ChatMessage::system("rules")).unwrap();
        assert_eq!(json["role"], "system");
        assert_eq!(json["content"], "rules");
    }

    #[tokio::test]
    async fn test_default_trait_methods() {
        struct MockClient;

        #[async_trait]
        impl CompletionClient for MockClient {
            async fn complete(&self, _request: &CompletionRequest) -> Result<CompletionResult> {
                Ok(CompletionResult::new("test", "stop"))
            }
        }

        let client = MockClient;
        assert!(client.is_configured());
        assert_eq!(client.model_name(), "unknown");
        assert!(client.endpoint().is_empty());

        let request = CompletionRequest {
            messages: vec![ChatMessage::user("hi")],
            temperature: 0.2,
            max_tokens: 10,
        };
        let result = client.complete(&request).await.unwrap();
        assert_eq!(result.text, "test");
    }
}
