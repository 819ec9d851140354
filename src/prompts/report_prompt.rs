//! End-of-session report prompts

use super::{case_header, PromptTier};
use crate::cases::CaseProfile;
use crate::providers::ChatMessage;

/// Builds the report prompt for a tier
///
/// # Arguments
///
/// * `tier` - Prompt tier
/// * `profile` - Case profile (title and risk hint only)
/// * `quick_feedback` - Latest coaching note, standard tier only; blank is
///   sent as `Not provided`
/// * `transcript` - Rendered transcript window
pub fn build_report_messages(
    tier: PromptTier,
    profile: &CaseProfile,
    quick_feedback: &str,
    transcript: &str,
) -> Vec<ChatMessage> {
    match tier {
        PromptTier::Standard => {
            let quick_feedback = if quick_feedback.trim().is_empty() {
                "Not provided"
            } else {
                quick_feedback
            };
            vec![
                ChatMessage::system(
                    r#"Return ONLY valid JSON using this schema:
{
  "session_snapshot": ["bullet 1", "bullet 2"],
  "what_the_counselor_did_well": ["bullet 1", "bullet 2"],
  "missed_or_weak_risk_steps": ["bullet 1", "bullet 2"],
  "better_response_options": ["copy-ready script 1", "copy-ready script 2"],
  "action_plan_for_next_practice": ["bullet 1", "bullet 2"]
}
Rules:
- English only.
- Keep bullets concise and actionable.
- Focus on counselor performance, not demographics/background details.
- better_response_options must be directly usable counselor scripts.
- No markdown, no extra keys, no commentary text."#,
                ),
                ChatMessage::user(format!(
                    "{}\nQuick feedback: {}\nTranscript:\n{}",
                    case_header(profile),
                    quick_feedback,
                    transcript
                )),
            ]
        }
        PromptTier::Compact => vec![
            ChatMessage::system(
                r#"JSON only. Same keys only:
session_snapshot, what_the_counselor_did_well, missed_or_weak_risk_steps, better_response_options, action_plan_for_next_practice.
Two short bullets per key max."#,
            ),
            ChatMessage::user(format!(
                "Case: {} / {}\n{}",
                profile.title_or_default(),
                profile.risk_or_default(),
                transcript
            )),
        ],
        PromptTier::Strict => vec![
            ChatMessage::system("Return strict JSON with the same 5 keys only. Very short bullets."),
            ChatMessage::user(transcript),
        ],
    }
}
