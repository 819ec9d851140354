//! Simulated-client reply task

use super::ensure;
use crate::cases::CaseProfile;
use crate::error::Result;
use crate::pipeline::{run_tiered, AttemptPlan, RetryPolicy};
use crate::prompts::roleplay_prompt::build_roleplay_messages;
use crate::prompts::PromptTier;
use crate::providers::CompletionClient;
use crate::transcript::{select_recent, Message};
use serde::{Deserialize, Serialize};

/// Request body for a client reply
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleplayRequest {
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub case_profile: CaseProfile,
}

/// Reply metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyMeta {
    /// Always `model`
    pub source: &'static str,
    pub called_api: bool,
    pub model: String,
    pub endpoint: String,
    pub finish_reason: String,
    pub retried: bool,
    pub attempt: usize,
}

/// Client reply with metadata
#[derive(Debug, Clone, Serialize)]
pub struct RoleplayResponse {
    pub reply: String,
    pub meta: ReplyMeta,
}

/// Attempt ladder: windows 14/10/6 over standard/compact/strict prompts
pub fn attempt_plans(messages: &[Message], profile: &CaseProfile) -> Vec<AttemptPlan> {
    [
        (14, PromptTier::Standard, 0.5, 1200),
        (10, PromptTier::Compact, 0.4, 2200),
        (6, PromptTier::Strict, 0.3, 3200),
    ]
    .into_iter()
    .map(|(window, tier, temperature, max_tokens)| {
        AttemptPlan::new(
            build_roleplay_messages(select_recent(messages, window), profile, tier),
            temperature,
            max_tokens,
        )
    })
    .collect()
}

/// Generates the simulated client's next reply
///
/// # Errors
///
/// Returns `InvalidRequest` for an empty transcript, otherwise any error
/// the tiered engine propagates.
pub async fn client_reply(
    client: &dyn CompletionClient,
    request: &RoleplayRequest,
) -> Result<RoleplayResponse> {
    ensure(!request.messages.is_empty(), "messages cannot be empty")?;

    let plans = attempt_plans(&request.messages, &request.case_profile);
    let outcome = run_tiered(client, &plans, RetryPolicy::TruncationOnly, |result| {
        Ok(result.text)
    })
    .await?;

    tracing::info!(
        attempt = outcome.attempt,
        finish_reason = %outcome.finish_reason,
        "Generated client reply"
    );

    Ok(RoleplayResponse {
        meta: ReplyMeta {
            source: "model",
            called_api: true,
            model: client.model_name(),
            endpoint: client.endpoint(),
            finish_reason: outcome.finish_reason,
            retried: outcome.retried,
            attempt: outcome.attempt,
        },
        reply: outcome.value,
    })
}
