//! Per-round coaching prompts

use super::{case_header, PromptTier};
use crate::cases::CaseProfile;
use crate::providers::ChatMessage;

const STANDARD_SYSTEM: &str = r#"You are a crisis counseling training coach.
Analyze the current round and return ONLY valid JSON.

JSON schema:
{
  "summary": "string, one concise sentence only",
  "suggestion": "string, one concrete coaching sentence only",
  "recommended_options": [
    "direct copy-ready counselor script 1 (full sentence, <=22 words)",
    "direct copy-ready counselor script 2 (full sentence, <=22 words)"
  ],
  "emotion": "string, <=8 words",
  "crisis_level": "Low | Medium | High | Imminent",
  "technique_used": "A. Fostering Engagement / Rapport | B. Collaborative Problem-Solving | C. Suicide Risk Assessment | D. Establishing Safety / Mitigating Risk | E. Resources, Referrals, and Treatment Promotion",
  "current_turn_feedback": {
    "did_well": "string, what counselor did well THIS turn (<=20 words)",
    "needs_improvement": "string, what counselor should improve THIS turn (<=20 words)"
  },
  "skill_scores": {
    "empathy": 0,
    "active_listening": 0,
    "risk_assessment": 0,
    "safety_planning": 0,
    "problem_solving": 0
  }
}

Scoring rule:
- Scores are 0-100 integers.
- Risk assessment and safety planning should stay low unless explicitly asked in dialogue.
- "recommended_options" must be directly usable counselor utterances (not meta advice).
- "current_turn_feedback" must evaluate only counselor performance in THIS turn.
- Classify technique_used using these definitions:
  A. Fostering Engagement / Rapport:
    - welcoming nonjudgmental tone; validates/normalizes feelings; empathy/compassion;
      affirms strengths; encourages continued engagement.
  B. Collaborative Problem-Solving:
    - asks what was tried and what helped; explores options collaboratively;
      offers suggestions while preserving choice; identifies concrete next steps;
      summarizes/checks agreement on action plan.
  C. Suicide Risk Assessment:
    - assesses current/past suicidal thoughts; prior attempts/self-harm;
      plan details (method/timing/specificity); access to means; attempt in progress;
      and suicidal intent.
  D. Establishing Safety / Mitigating Risk:
    - develops safety plan; means safety; immediate escalation when needed;
      switch to phone; emergency services/ED; commitment to immediate safety.
  E. Resources, Referrals, and Treatment Promotion:
    - explores treatment attitudes/experience; psychoeducation; offers referrals;
      practical access steps; self-help and follow-up options.
- Keep content clinically cautious, training-focused, and practical.
- No markdown, no extra keys, no explanation text outside JSON."#;

const COMPACT_SYSTEM: &str = r#"You are a crisis counseling training coach.
Return ONLY valid JSON with keys:
summary, suggestion, recommended_options, emotion, crisis_level, technique_used, current_turn_feedback, skill_scores.
recommended_options must be 2 direct copy-ready counselor scripts.
current_turn_feedback must be an object with did_well and needs_improvement for THIS turn.
No markdown. No extra keys."#;

const STRICT_SYSTEM: &str = r#"STRICT JSON ONLY. Do not output markdown, explanation, or code fences.
Output one JSON object with keys:
summary, suggestion, recommended_options, emotion, crisis_level, technique_used, current_turn_feedback, skill_scores.
recommended_options must contain exactly 2 short counselor scripts.
current_turn_feedback must be object: { did_well, needs_improvement }."#;

/// Builds the coaching prompt for a tier
///
/// # Arguments
///
/// * `tier` - Prompt tier
/// * `profile` - Case profile (title and risk hint only)
/// * `previous_feedback` - Summary of the previous round, standard tier only
/// * `transcript` - Rendered transcript window
pub fn build_coach_messages(
    tier: PromptTier,
    profile: &CaseProfile,
    previous_feedback: &str,
    transcript: &str,
) -> Vec<ChatMessage> {
    match tier {
        PromptTier::Standard => vec![
            ChatMessage::system(STANDARD_SYSTEM),
            ChatMessage::user(format!(
                "{}\nPrevious round feedback: {}\n\nRecent transcript:\n{}",
                case_header(profile),
                previous_feedback,
                transcript
            )),
        ],
        PromptTier::Compact => vec![
            ChatMessage::system(COMPACT_SYSTEM),
            ChatMessage::user(format!(
                "{}\nRecent transcript:\n{}",
                case_header(profile),
                transcript
            )),
        ],
        PromptTier::Strict => vec![
            ChatMessage::system(STRICT_SYSTEM),
            ChatMessage::user(transcript),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Technique;

    #[test]
    fn test_standard_prompt_lists_every_technique() {
        for technique in Technique::ALL {
            assert!(STANDARD_SYSTEM.contains(technique.label()));
        }
    }

    #[test]
    fn test_standard_user_content() {
        let messages = build_coach_messages(
            PromptTier::Standard,
            &CaseProfile::default(),
            "N/A - session start",
            "1. Counselor: hi",
        );
        assert_eq!(
            messages[1].content,
            "Case theme: Not provided\nRisk hint: Not provided\nPrevious round feedback: N/A - session start\n\nRecent transcript:\n1. Counselor: hi"
        );
    }

    #[test]
    fn test_strict_prompt_sends_bare_transcript() {
        let messages = build_coach_messages(
            PromptTier::Strict,
            &CaseProfile::default(),
            "ignored",
            "1. Client: hello",
        );
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].content, "1. Client: hello");
        assert!(messages[0].content.starts_with("STRICT JSON ONLY"));
    }
}
