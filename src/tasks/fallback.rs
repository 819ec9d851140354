//! Deterministic round coach used when the model cannot produce one
//!
//! The technique is guessed from keywords in the counselor's most recent
//! message; every other field is fixed text.

use crate::schema::{CrisisLevel, RoundCoach, SkillScores, Technique, TurnFeedback};
use crate::transcript::{last_counselor_message, Message};
use regex::Regex;
use std::sync::OnceLock;

/// Keyword patterns checked in order against the lowercased counselor turn
const TECHNIQUE_PATTERNS: &[(&str, Technique)] = &[
    (r"suicide|harm|kill|plan|means|intent", Technique::RiskAssessment),
    (r"safe|safety|stay safe|emergency|911|hospital", Technique::Safety),
    (r"try|step|option|plan|what can", Technique::ProblemSolving),
    (r"therap|referr|resource|service|doctor|psychiat", Technique::Resources),
];

fn technique_patterns() -> &'static [(Regex, Technique)] {
    static COMPILED: OnceLock<Vec<(Regex, Technique)>> = OnceLock::new();
    COMPILED.get_or_init(|| {
        TECHNIQUE_PATTERNS
            .iter()
            .map(|(pattern, technique)| {
                (
                    Regex::new(pattern).expect("valid technique pattern"),
                    *technique,
                )
            })
            .collect()
    })
}

/// Guesses the technique behind a counselor turn; engagement when nothing
/// matches
///
/// # Examples
///
/// ```
/// use crisis_coach::schema::Technique;
/// use crisis_coach::tasks::fallback::infer_technique;
///
/// assert_eq!(infer_technique("Have you thought about suicide?"), Technique::RiskAssessment);
/// assert_eq!(infer_technique("That sounds exhausting."), Technique::Engagement);
/// ```
pub fn infer_technique(counselor_turn: &str) -> Technique {
    let lowered = counselor_turn.to_lowercase();
    technique_patterns()
        .iter()
        .find(|(pattern, _)| pattern.is_match(&lowered))
        .map(|(_, technique)| *technique)
        .unwrap_or(Technique::Engagement)
}

/// Builds the fallback coach for a transcript
///
/// Never fails; the result already satisfies the sanitized schema.
pub fn synthesize_round_coach(messages: &[Message], previous_feedback: &str) -> RoundCoach {
    let technique = infer_technique(last_counselor_message(messages).unwrap_or(""));
    let summary: String = format!(
        "Round coach generated from fallback due temporary model formatting issue. Previous note: {}",
        previous_feedback
    )
    .chars()
    .take(180)
    .collect();

    RoundCoach {
        summary: summary.trim_end().to_string(),
        suggestion: "Keep one empathic reflection plus one clear safety question in your next reply."
            .to_string(),
        recommended_options: vec![
            "I hear how heavy this feels right now. Can you tell me what is hardest at this moment?"
                .to_string(),
            "To support your safety, are thoughts of harming yourself present right now?"
                .to_string(),
        ],
        emotion: "Distressed / overwhelmed".to_string(),
        crisis_level: CrisisLevel::Medium,
        technique_used: technique,
        current_turn_feedback: TurnFeedback {
            did_well: "You stayed engaged and kept the dialogue moving in this turn.".to_string(),
            needs_improvement: "Make your next turn more specific with one direct risk question."
                .to_string(),
        },
        skill_scores: SkillScores {
            empathy: 60,
            active_listening: 58,
            risk_assessment: 45,
            safety_planning: 35,
            problem_solving: 50,
        },
    }
}
