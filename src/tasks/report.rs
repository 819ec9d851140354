//! End-of-session report task

use super::{ensure, AttemptMeta};
use crate::cases::CaseProfile;
use crate::error::Result;
use crate::pipeline::format::{
    format_report, limit_length, REPORT_MAX_CHARS, REPORT_TRUNCATION_MARKER,
};
use crate::pipeline::sanitize::sanitize_report;
use crate::pipeline::{extract_json, run_tiered, AttemptPlan, RetryPolicy};
use crate::prompts::report_prompt::build_report_messages;
use crate::prompts::{windowed_transcript, PromptTier};
use crate::providers::CompletionClient;
use crate::transcript::Message;
use serde::{Deserialize, Serialize};

/// Request body for a session report
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub case_profile: CaseProfile,
    /// Latest coaching note, usually `summary | suggestion`
    #[serde(default)]
    pub quick_feedback: String,
}

/// Formatted report with metadata
#[derive(Debug, Clone, Serialize)]
pub struct ReportResponse {
    pub report: String,
    pub meta: AttemptMeta,
}

/// Attempt ladder: windows 24/14/10 over standard/compact/strict prompts
pub fn attempt_plans(
    messages: &[Message],
    profile: &CaseProfile,
    quick_feedback: &str,
) -> Vec<AttemptPlan> {
    [
        (24, PromptTier::Standard, 2600),
        (14, PromptTier::Compact, 3600),
        (10, PromptTier::Strict, 4600),
    ]
    .into_iter()
    .map(|(window, tier, max_tokens)| {
        AttemptPlan::new(
            build_report_messages(
                tier,
                profile,
                quick_feedback,
                &windowed_transcript(messages, window),
            ),
            0.1,
            max_tokens,
        )
    })
    .collect()
}

/// Produces the formatted session report, capped at 3800 characters
///
/// # Errors
///
/// Returns `InvalidRequest` for fewer than two messages, otherwise any error
/// the tiered engine propagates.
pub async fn session_report(
    client: &dyn CompletionClient,
    request: &ReportRequest,
) -> Result<ReportResponse> {
    ensure(
        request.messages.len() >= 2,
        "At least one full dialogue turn is required to generate a full report.",
    )?;

    let plans = attempt_plans(
        &request.messages,
        &request.case_profile,
        &request.quick_feedback,
    );
    let outcome = run_tiered(client, &plans, RetryPolicy::TruncationOnly, |result| {
        Ok(sanitize_report(&extract_json(&result.text, "report")?))
    })
    .await?;

    tracing::info!(
        attempt = outcome.attempt,
        messages = request.messages.len(),
        "Generated session report"
    );

    Ok(ReportResponse {
        report: limit_length(
            &format_report(&outcome.value),
            REPORT_MAX_CHARS,
            REPORT_TRUNCATION_MARKER,
        ),
        meta: AttemptMeta::from(&outcome),
    })
}
