//! BigModel chat-completions client for Crisis Coach
//!
//! This module implements [`CompletionClient`] against an OpenAI-style
//! `/api/paas/v4/chat/completions` endpoint. Response bodies are read as
//! loosely typed JSON because providers disagree on the content shape:
//! plain strings, lists of content parts, refusals, and streaming deltas are
//! all accepted.

use crate::config::ModelConfig;
use crate::error::{CoachError, Result};
use crate::providers::{ChatMessage, CompletionClient, CompletionRequest, CompletionResult};

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// Message shown when no API key is configured
pub const MISSING_API_KEY_MESSAGE: &str =
    "Missing BIGMODEL_API_KEY (or OPENAI_API_KEY). Configure the environment and restart.";

/// BigModel chat-completions client
///
/// # Examples
///
/// ```no_run
/// use crisis_coach::config::ModelConfig;
/// use crisis_coach::providers::{BigModelClient, ChatMessage, CompletionClient, CompletionRequest};
///
/// # async fn example() -> crisis_coach::error::Result<()> {
/// let config = ModelConfig {
///     api_key: Some("sk-...".to_string()),
///     ..Default::default()
/// };
/// let client = BigModelClient::new(config)?;
/// let request = CompletionRequest {
///     messages: vec![ChatMessage::user("Hello")],
///     temperature: 0.5,
///     max_tokens: 200,
/// };
/// let result = client.complete(&request).await?;
/// println!("{} ({})", result.text, result.finish_reason);
/// # Ok(())
/// # }
/// ```
pub struct BigModelClient {
    client: Client,
    config: ModelConfig,
}

/// Request body for the chat-completions endpoint
#[derive(Debug, Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

impl BigModelClient {
    /// Create a new client from model configuration
    ///
    /// A missing API key is accepted here; it is reported by
    /// [`CompletionClient::complete`] before any request is sent.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: ModelConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("crisis-coach/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CoachError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(
            "Initialized BigModel client: endpoint={}, model={}, credential={}",
            config.completions_endpoint(),
            config.name,
            if config.api_key().is_some() { "present" } else { "missing" }
        );

        Ok(Self { client, config })
    }
}

#[async_trait]
impl CompletionClient for BigModelClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResult> {
        let api_key = self
            .config
            .api_key()
            .ok_or_else(|| CoachError::Configuration(MISSING_API_KEY_MESSAGE.to_string()))?;

        let url = self.config.completions_endpoint();
        let body = ChatCompletionBody {
            model: &self.config.name,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        tracing::debug!(
            "Sending completion request: {} messages, temperature={}, max_tokens={}",
            request.messages.len(),
            request.temperature,
            request.max_tokens
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Completion request failed: {}", e);
                CoachError::Http(e)
            })?;

        let status = response.status();
        // Non-JSON bodies degrade to an empty object, like an error page would
        let payload: Value = response
            .json()
            .await
            .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

        if !status.is_success() {
            let message = extract_provider_error(status.as_u16(), &payload);
            tracing::error!("Model API returned {}: {}", status, message);
            return Err(CoachError::Provider {
                status: Some(status.as_u16()),
                message,
            }
            .into());
        }

        let text = extract_model_text(&payload);
        let finish_reason = extract_finish_reason(&payload);
        if text.is_empty() {
            tracing::warn!(finish_reason = %finish_reason, "Model returned empty content");
            return Err(CoachError::EmptyContent { finish_reason }.into());
        }

        tracing::debug!(
            finish_reason = %finish_reason,
            chars = text.chars().count(),
            "Completion succeeded"
        );
        Ok(CompletionResult {
            text,
            finish_reason,
        })
    }

    fn model_name(&self) -> String {
        self.config.name.clone()
    }

    fn endpoint(&self) -> String {
        self.config.completions_endpoint()
    }

    fn is_configured(&self) -> bool {
        self.config.api_key().is_some()
    }
}

/// First choice of a chat-completions payload, if any
fn first_choice(payload: &Value) -> Option<&Value> {
    payload
        .get("choices")?
        .as_array()?
        .first()
        .filter(|choice| choice.is_object())
}

/// Flatten string or list-of-parts content into trimmed text
fn join_content_parts(content: Option<&Value>) -> String {
    match content {
        Some(Value::String(text)) => text.trim().to_string(),
        Some(Value::Array(parts)) => parts
            .iter()
            .map(|part| match part {
                Value::String(text) => text.as_str(),
                Value::Object(node) => node
                    .get("text")
                    .and_then(Value::as_str)
                    .or_else(|| node.get("content").and_then(Value::as_str))
                    .unwrap_or(""),
                _ => "",
            })
            .collect::<String>()
            .trim()
            .to_string(),
        _ => String::new(),
    }
}

/// Extract usable text from a chat-completions payload
///
/// Checks message content, then a refusal (reported as
/// `Model refusal: ...`), then a streaming delta. Returns an empty string
/// when none of them carry text.
pub(crate) fn extract_model_text(payload: &Value) -> String {
    let Some(choice) = first_choice(payload) else {
        return String::new();
    };

    let message = choice.get("message");
    let content = join_content_parts(message.and_then(|m| m.get("content")));
    if !content.is_empty() {
        return content;
    }

    if let Some(refusal) = message
        .and_then(|m| m.get("refusal"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|r| !r.is_empty())
    {
        return format!("Model refusal: {}", refusal);
    }

    choice
        .get("delta")
        .and_then(|d| d.get("content"))
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or("")
        .to_string()
}

/// Finish reason of the first choice, or `unknown`
pub(crate) fn extract_finish_reason(payload: &Value) -> String {
    first_choice(payload)
        .and_then(|choice| choice.get("finish_reason"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|reason| !reason.is_empty())
        .unwrap_or("unknown")
        .to_string()
}

/// Human-readable provider error for a non-success response
pub(crate) fn extract_provider_error(status: u16, payload: &Value) -> String {
    let candidates = [
        payload.get("error").and_then(|e| e.get("message")),
        payload.get("message"),
        payload.get("msg"),
    ];

    candidates
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|message| !message.is_empty())
        .map(|message| format!("Model API error: {}", message))
        .unwrap_or_else(|| format!("Model API request failed (HTTP {})", status))
}
