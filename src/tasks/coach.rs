//! Per-round coaching task
//!
//! Unlike the other tasks, coaching also retries on unparseable JSON and
//! never fails on exhaustion: the local fallback coach is returned instead.

use super::ensure;
use super::fallback::synthesize_round_coach;
use crate::cases::CaseProfile;
use crate::error::Result;
use crate::pipeline::sanitize::sanitize_round_coach;
use crate::pipeline::{extract_json, run_tiered_with_fallback, AttemptPlan, RetryPolicy};
use crate::prompts::coach_prompt::build_coach_messages;
use crate::prompts::{windowed_transcript, PromptTier};
use crate::providers::CompletionClient;
use crate::schema::RoundCoach;
use crate::transcript::Message;
use serde::{Deserialize, Serialize};

/// Previous-feedback text used for the first round
pub const SESSION_START_FEEDBACK: &str = "N/A - session start";

fn default_previous_feedback() -> String {
    SESSION_START_FEEDBACK.to_string()
}

/// Request body for round coaching
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoachRequest {
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub case_profile: CaseProfile,
    #[serde(default = "default_previous_feedback")]
    pub previous_feedback: String,
}

/// Coaching metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoachMeta {
    pub called_api: bool,
    pub finish_reason: String,
    pub retried: bool,
    pub json_retried: bool,
    pub fallback_used: bool,
    pub last_retriable_error: String,
}

/// Round coach with metadata
#[derive(Debug, Clone, Serialize)]
pub struct CoachResponse {
    pub coach: RoundCoach,
    pub meta: CoachMeta,
}

/// Attempt ladder: standard over 12 messages, then compact and strict over 8
pub fn attempt_plans(
    messages: &[Message],
    profile: &CaseProfile,
    previous_feedback: &str,
) -> Vec<AttemptPlan> {
    let transcript = windowed_transcript(messages, 12);
    let compact_transcript = windowed_transcript(messages, 8);
    vec![
        AttemptPlan::new(
            build_coach_messages(PromptTier::Standard, profile, previous_feedback, &transcript),
            0.2,
            2200,
        ),
        AttemptPlan::new(
            build_coach_messages(PromptTier::Compact, profile, previous_feedback, &compact_transcript),
            0.1,
            3200,
        ),
        AttemptPlan::new(
            build_coach_messages(PromptTier::Strict, profile, previous_feedback, &compact_transcript),
            0.1,
            3600,
        ),
    ]
}

/// Coaches the latest round
///
/// # Errors
///
/// Returns `InvalidRequest` for fewer than two messages, and provider or
/// configuration errors. Truncation and parse failures never surface.
pub async fn coach_round(
    client: &dyn CompletionClient,
    request: &CoachRequest,
) -> Result<CoachResponse> {
    ensure(
        request.messages.len() >= 2,
        "Need at least one full dialogue turn.",
    )?;

    let plans = attempt_plans(
        &request.messages,
        &request.case_profile,
        &request.previous_feedback,
    );
    let outcome = run_tiered_with_fallback(
        client,
        &plans,
        RetryPolicy::TruncationOrParse,
        |result| Ok(sanitize_round_coach(&extract_json(&result.text, "round feedback")?)),
        || synthesize_round_coach(&request.messages, &request.previous_feedback),
    )
    .await?;

    tracing::info!(
        attempt = outcome.attempt,
        json_retried = outcome.json_retried,
        fallback_used = outcome.fallback_used,
        technique = %outcome.value.technique_used,
        "Generated round coach"
    );

    Ok(CoachResponse {
        meta: CoachMeta {
            called_api: true,
            finish_reason: outcome.finish_reason,
            retried: outcome.retried,
            json_retried: outcome.json_retried,
            fallback_used: outcome.fallback_used,
            last_retriable_error: outcome.last_retriable_error,
        },
        coach: outcome.value,
    })
}
