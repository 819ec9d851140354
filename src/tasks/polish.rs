//! Counselor draft polishing task

use super::{ensure, AttemptMeta};
use crate::cases::CaseProfile;
use crate::error::{CoachError, Result};
use crate::pipeline::sanitize::normalize_reply;
use crate::pipeline::{run_tiered, AttemptPlan, RetryPolicy};
use crate::prompts::polish_prompt::build_polish_messages;
use crate::prompts::{windowed_transcript, PromptTier};
use crate::providers::CompletionClient;
use crate::transcript::Message;
use serde::{Deserialize, Serialize};

/// Request body for polishing a draft
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolishRequest {
    #[serde(default)]
    pub draft: String,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub case_profile: CaseProfile,
}

/// Polished draft with metadata
#[derive(Debug, Clone, Serialize)]
pub struct PolishResponse {
    pub polished: String,
    pub meta: AttemptMeta,
}

/// Attempt ladder: windows 14 and 8, then the draft alone
pub fn attempt_plans(messages: &[Message], profile: &CaseProfile, draft: &str) -> Vec<AttemptPlan> {
    vec![
        AttemptPlan::new(
            build_polish_messages(
                PromptTier::Standard,
                profile,
                &windowed_transcript(messages, 14),
                draft,
            ),
            0.2,
            700,
        ),
        AttemptPlan::new(
            build_polish_messages(
                PromptTier::Compact,
                profile,
                &windowed_transcript(messages, 8),
                draft,
            ),
            0.2,
            1200,
        ),
        AttemptPlan::new(
            build_polish_messages(PromptTier::Strict, profile, "", draft),
            0.2,
            1800,
        ),
    ]
}

/// Rewrites a counselor draft
///
/// A completion that normalizes to nothing counts as empty content with the
/// completion's finish reason, so it is retried only when that was `length`.
///
/// # Errors
///
/// Returns `InvalidRequest` for a blank draft, otherwise any error the
/// tiered engine propagates.
pub async fn polish_draft(
    client: &dyn CompletionClient,
    request: &PolishRequest,
) -> Result<PolishResponse> {
    let draft = request.draft.trim();
    ensure(!draft.is_empty(), "draft cannot be empty")?;

    let plans = attempt_plans(&request.messages, &request.case_profile, draft);
    let outcome = run_tiered(client, &plans, RetryPolicy::TruncationOnly, |result| {
        let polished = normalize_reply(&result.text);
        if polished.is_empty() {
            return Err(CoachError::EmptyContent {
                finish_reason: result.finish_reason,
            }
            .into());
        }
        Ok(polished)
    })
    .await?;

    tracing::debug!(attempt = outcome.attempt, "Polished counselor draft");

    Ok(PolishResponse {
        meta: AttemptMeta::from(&outcome),
        polished: outcome.value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{sample_transcript, ScriptedClient};

    fn request(draft: &str) -> PolishRequest {
        PolishRequest {
            draft: draft.to_string(),
            messages: sample_transcript(1),
            case_profile: CaseProfile::default(),
        }
    }

    #[tokio::test]
    async fn test_polish_strips_wrapping() {
        let client =
            ScriptedClient::new().with_text("\"I hear you.\n\n\nAre you safe right now?\"", "stop");
        let response = polish_draft(&client, &request("  u ok?  ")).await.unwrap();
        assert_eq!(response.polished, "I hear you.\nAre you safe right now?");
        assert_eq!(response.meta.attempt, 1);
        assert!(client.requests()[0].messages[1]
            .content
            .ends_with("Counselor draft to polish:\nu ok?"));
    }

    #[tokio::test]
    async fn test_quotes_only_with_length_is_retried() {
        let client = ScriptedClient::new()
            .with_text("\"\"", "length")
            .with_text("Can you tell me more?", "stop");
        let response = polish_draft(&client, &request("tell me")).await.unwrap();
        assert_eq!(response.polished, "Can you tell me more?");
        assert_eq!(response.meta.attempt, 2);
        assert!(response.meta.retried);
    }

    #[tokio::test]
    async fn test_quotes_only_with_stop_fails() {
        let client = ScriptedClient::new().with_text("``", "stop");
        let err = polish_draft(&client, &request("tell me")).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Model returned empty content (finish_reason: stop)"
        );
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn test_blank_draft_rejected() {
        let client = ScriptedClient::new();
        let err = polish_draft(&client, &request("   ")).await.unwrap_err();
        assert_eq!(err.to_string(), "draft cannot be empty");
        assert_eq!(client.call_count(), 0);
    }

    #[test]
    fn test_strict_plan_sends_only_draft() {
        let plans = attempt_plans(&sample_transcript(3), &CaseProfile::default(), "draft");
        assert_eq!(plans[2].messages[1].content, "draft");
        assert_eq!(
            plans.iter().map(|p| p.max_tokens).collect::<Vec<_>>(),
            vec![700, 1200, 1800]
        );
    }
}
