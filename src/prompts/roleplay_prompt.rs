//! Simulated-client prompts
//!
//! The model speaks as the client: the counselor's turns are sent as `user`
//! messages and earlier client lines as `assistant` messages.

use super::PromptTier;
use crate::cases::CaseProfile;
use crate::providers::ChatMessage;
use crate::transcript::{shorten, shorten_list, Message};

/// Generates the client system prompt for a tier
///
/// Only the standard tier embeds the case setup; it is cut to fixed field
/// widths so a long profile cannot crowd out the transcript.
///
/// # Examples
///
/// ```
/// use crisis_coach::cases::CaseProfile;
/// use crisis_coach::prompts::{roleplay_prompt::generate_roleplay_prompt, PromptTier};
///
/// let prompt = generate_roleplay_prompt(PromptTier::Standard, &CaseProfile::default());
/// assert!(prompt.contains("- Theme: Not provided"));
/// assert!(!generate_roleplay_prompt(PromptTier::Strict, &CaseProfile::default()).contains("Theme"));
/// ```
pub fn generate_roleplay_prompt(tier: PromptTier, profile: &CaseProfile) -> String {
    match tier {
        PromptTier::Standard => format!(
            r#"You are role-playing a counseling client in a crisis-intervention training simulation.
Only speak as the client.

Rules:
1) Use first-person natural language, 1-3 sentences, max 80 words.
2) Do not switch roles, do not provide supervisor commentary.
3) Do not provide self-harm implementation details (method, tools, location, steps).
4) If asked about risk, answer realistically based on the case profile.

Case setup:
- Theme: {}
- Risk level: {}
- Background: {}
- Training goals: {}
- Red flags: {}"#,
            shorten(profile.title.as_deref(), 80),
            shorten(profile.risk_level.as_deref(), 40),
            shorten(profile.background.as_deref(), 260),
            shorten_list(&profile.goals, 60, 3),
            shorten_list(&profile.red_flags, 60, 4),
        ),
        PromptTier::Compact => r#"You are a crisis-simulation client.
Output only the client's reply.
Rules:
- 1-2 sentences, under 60 words.
- First person, natural, emotionally consistent.
- No role switch, no analysis, no lists.
- No self-harm method/tool/location/step details."#
            .to_string(),
        PromptTier::Strict => r#"Client reply only.
Exactly 1 sentence, under 40 words.
No lists, no markdown, no explanations."#
            .to_string(),
    }
}

/// System prompt followed by the windowed transcript
pub fn build_roleplay_messages(
    window: &[Message],
    profile: &CaseProfile,
    tier: PromptTier,
) -> Vec<ChatMessage> {
    std::iter::once(ChatMessage::system(generate_roleplay_prompt(tier, profile)))
        .chain(window.iter().map(Message::to_chat_message))
        .collect()
}
