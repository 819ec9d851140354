//! Quick mid-session feedback task

use super::{ensure, AttemptMeta};
use crate::cases::CaseProfile;
use crate::error::Result;
use crate::pipeline::format::{
    format_quick_feedback, limit_length, FEEDBACK_MAX_CHARS, FEEDBACK_TRUNCATION_MARKER,
};
use crate::pipeline::sanitize::sanitize_quick_feedback;
use crate::pipeline::{extract_json, run_tiered, AttemptPlan, RetryPolicy};
use crate::prompts::feedback_prompt::build_feedback_messages;
use crate::prompts::{windowed_transcript, PromptTier};
use crate::providers::CompletionClient;
use crate::transcript::Message;
use serde::{Deserialize, Serialize};

/// Fewest messages (two full rounds) quick feedback accepts
pub const MIN_MESSAGES: usize = 4;

/// Request body for quick feedback
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub case_profile: CaseProfile,
}

/// Formatted feedback with metadata
#[derive(Debug, Clone, Serialize)]
pub struct FeedbackResponse {
    pub feedback: String,
    pub meta: AttemptMeta,
}

/// Attempt ladder: standard over 10 messages, then the compact prompt over 6
/// twice with a larger budget
pub fn attempt_plans(messages: &[Message], profile: &CaseProfile) -> Vec<AttemptPlan> {
    let transcript = windowed_transcript(messages, 10);
    let compact = build_feedback_messages(
        PromptTier::Compact,
        profile,
        &windowed_transcript(messages, 6),
    );
    vec![
        AttemptPlan::new(
            build_feedback_messages(PromptTier::Standard, profile, &transcript),
            0.1,
            1200,
        ),
        AttemptPlan::new(compact.clone(), 0.1, 1800),
        AttemptPlan::new(compact, 0.1, 2600),
    ]
}

/// Produces formatted quick feedback, capped at 900 characters
///
/// # Errors
///
/// Returns `InvalidRequest` for fewer than four messages, otherwise any
/// error the tiered engine propagates (including parse failures, which are
/// not retried here).
pub async fn quick_feedback(
    client: &dyn CompletionClient,
    request: &FeedbackRequest,
) -> Result<FeedbackResponse> {
    ensure(
        request.messages.len() >= MIN_MESSAGES,
        "Conversation too short. Complete at least 2 rounds (4 total messages).",
    )?;

    let plans = attempt_plans(&request.messages, &request.case_profile);
    let outcome = run_tiered(client, &plans, RetryPolicy::TruncationOnly, |result| {
        Ok(sanitize_quick_feedback(&extract_json(&result.text, "feedback")?))
    })
    .await?;

    Ok(FeedbackResponse {
        feedback: limit_length(
            &format_quick_feedback(&outcome.value),
            FEEDBACK_MAX_CHARS,
            FEEDBACK_TRUNCATION_MARKER,
        ),
        meta: AttemptMeta::from(&outcome),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::is_parse_failure;
    use crate::test_utils::{sample_transcript, ScriptedClient};

    fn request(turns: usize) -> FeedbackRequest {
        FeedbackRequest {
            messages: sample_transcript(turns),
            case_profile: CaseProfile::default(),
        }
    }

    #[tokio::test]
    async fn test_feedback_is_formatted() {
        let client = ScriptedClient::new().with_text(
            r#"{"client_current_emotion": "ashamed", "client_current_crisis_level": "medium",
                "counselor_script_options": ["One.", "Two.", "Three."]}"#,
            "stop",
        );
        let response = quick_feedback(&client, &request(2)).await.unwrap();
        assert_eq!(
            response.feedback,
            "## Client Current Emotion\n- ashamed\n\n## Client Current Crisis Level\n- Medium\n\n## Two Suggested Counselor Responses\n1. One.\n2. Two."
        );
        assert_eq!(response.meta.finish_reason, "stop");
    }

    #[tokio::test]
    async fn test_long_feedback_is_capped() {
        let long = "word ".repeat(300);
        let body = serde_json::json!({
            "counselor_script_options": [long.clone(), long]
        })
        .to_string();
        let client = ScriptedClient::new().with_text(&body, "stop");
        let response = quick_feedback(&client, &request(2)).await.unwrap();
        assert!(response.feedback.chars().count() <= 903);
        assert!(response.feedback.ends_with("..."));
    }

    #[tokio::test]
    async fn test_parse_failure_is_not_retried() {
        let client = ScriptedClient::new().repeat_text("not json", "stop");
        let err = quick_feedback(&client, &request(2)).await.unwrap_err();
        assert!(is_parse_failure(&err));
        assert_eq!(err.to_string(), "Model returned non-JSON content for feedback.");
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn test_three_messages_rejected() {
        let client = ScriptedClient::new();
        let short = request(1);
        assert_eq!(short.messages.len(), 3);
        let err = quick_feedback(&client, &short).await.unwrap_err();
        assert!(err.to_string().starts_with("Conversation too short."));
    }

    #[test]
    fn test_compact_plans_share_prompt() {
        let plans = attempt_plans(&sample_transcript(6), &CaseProfile::default());
        assert_eq!(plans[1].messages, plans[2].messages);
        assert_eq!(plans[2].max_tokens, 2600);
    }
}
