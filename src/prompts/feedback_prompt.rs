//! Quick mid-session feedback prompts

use super::{case_header, PromptTier};
use crate::cases::CaseProfile;
use crate::providers::ChatMessage;

/// Builds the quick-feedback prompt for a tier
///
/// The compact and strict tiers share one terse prompt over the bare
/// transcript.
pub fn build_feedback_messages(
    tier: PromptTier,
    profile: &CaseProfile,
    transcript: &str,
) -> Vec<ChatMessage> {
    match tier {
        PromptTier::Standard => vec![
            ChatMessage::system(
                r#"Return ONLY valid JSON:
{
  "client_current_emotion": "short phrase, <=8 words",
  "client_current_crisis_level": "Low | Medium | High | Imminent",
  "counselor_script_options": [
    "copy-ready counselor script 1, <=22 words",
    "copy-ready counselor script 2, <=22 words"
  ]
}
Rules:
- English only.
- No markdown, no extra keys, no explanation text."#,
            ),
            ChatMessage::user(format!("{}\nTranscript:\n{}", case_header(profile), transcript)),
        ],
        PromptTier::Compact | PromptTier::Strict => vec![
            ChatMessage::system(
                r#"JSON only. Keys:
client_current_emotion, client_current_crisis_level, counselor_script_options.
Two scripts only. Very short."#,
            ),
            ChatMessage::user(transcript),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_feedback_prompt() {
        let messages =
            build_feedback_messages(PromptTier::Standard, &CaseProfile::default(), "1. Client: x");
        assert!(messages[0].content.contains("counselor_script_options"));
        assert!(messages[1].content.ends_with("Transcript:\n1. Client: x"));
    }

    #[test]
    fn test_compact_and_strict_match() {
        let profile = CaseProfile::default();
        assert_eq!(
            build_feedback_messages(PromptTier::Compact, &profile, "t"),
            build_feedback_messages(PromptTier::Strict, &profile, "t")
        );
    }
}
