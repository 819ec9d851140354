//! Draft-polishing prompts

use super::{case_header, PromptTier};
use crate::cases::CaseProfile;
use crate::providers::ChatMessage;

/// Builds the polish prompt for a tier
///
/// An empty transcript is sent as `N/A`. The strict tier sends only the
/// draft.
///
/// # Examples
///
/// ```
/// use crisis_coach::cases::CaseProfile;
/// use crisis_coach::prompts::{polish_prompt::build_polish_messages, PromptTier};
///
/// let messages = build_polish_messages(PromptTier::Strict, &CaseProfile::default(), "", "are u ok");
/// assert_eq!(messages[1].content, "are u ok");
/// ```
pub fn build_polish_messages(
    tier: PromptTier,
    profile: &CaseProfile,
    transcript: &str,
    draft: &str,
) -> Vec<ChatMessage> {
    let transcript = if transcript.is_empty() { "N/A" } else { transcript };
    match tier {
        PromptTier::Standard => vec![
            ChatMessage::system(
                r#"You are an assistant that edits counselor drafts for crisis-intervention roleplay.
Return ONLY the polished counselor response text.
Rules:
- Keep the original intent, but improve empathy, clarity, and safety focus.
- 1-3 sentences, <=70 words.
- Natural conversational English.
- No bullet points, no markdown, no analysis, no explanation.
- If risk language is present in context, include one clear, direct safety check question."#,
            ),
            ChatMessage::user(format!(
                "{}\nRecent transcript:\n{}\n\nCounselor draft to polish:\n{}",
                case_header(profile),
                transcript,
                draft
            )),
        ],
        PromptTier::Compact => vec![
            ChatMessage::system(
                r#"Rewrite the counselor draft.
Return one short polished response only.
1-2 sentences, <=55 words, English only.
No markdown, no explanation."#,
            ),
            ChatMessage::user(format!(
                "Risk hint: {}\nRecent transcript:\n{}\nDraft:\n{}",
                profile.risk_or_default(),
                transcript,
                draft
            )),
        ],
        PromptTier::Strict => vec![
            ChatMessage::system("Output only one polished counselor response sentence in English."),
            ChatMessage::user(draft),
        ],
    }
}
