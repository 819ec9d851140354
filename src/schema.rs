//! Structured payloads produced by the coaching pipelines
//!
//! Every type here is the *sanitized* form: values built by
//! [`crate::pipeline::sanitize`] always satisfy the field limits documented
//! below, whatever the model returned.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length of the per-turn feedback strings
pub const TURN_FEEDBACK_MAX_CHARS: usize = 180;
/// Maximum number of recommended counselor scripts
pub const MAX_RECOMMENDED_OPTIONS: usize = 2;
/// Maximum length of the quick-feedback emotion label
pub const EMOTION_MAX_CHARS: usize = 80;

/// Assessed client crisis level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrisisLevel {
    Low,
    Medium,
    High,
    Imminent,
}

/// Substring table for [`CrisisLevel::classify`], checked in order
const CRISIS_LEVEL_TABLE: &[(&str, CrisisLevel)] = &[
    ("imminent", CrisisLevel::Imminent),
    ("high", CrisisLevel::High),
    ("medium", CrisisLevel::Medium),
];

impl CrisisLevel {
    /// Maps free text onto a level by case-insensitive substring
    ///
    /// The most severe match wins; anything unrecognized is `Low`.
    ///
    /// # Examples
    ///
    /// ```
    /// use crisis_coach::schema::CrisisLevel;
    ///
    /// assert_eq!(CrisisLevel::classify("possibly medium-high"), CrisisLevel::High);
    /// assert_eq!(CrisisLevel::classify("IMMINENT danger"), CrisisLevel::Imminent);
    /// assert_eq!(CrisisLevel::classify("unclear"), CrisisLevel::Low);
    /// ```
    pub fn classify(text: &str) -> Self {
        let lowered = text.to_lowercase();
        CRISIS_LEVEL_TABLE
            .iter()
            .find(|(needle, _)| lowered.contains(needle))
            .map(|(_, level)| *level)
            .unwrap_or(Self::Low)
    }

    /// Display label
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Imminent => "Imminent",
        }
    }
}

impl fmt::Display for CrisisLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Intervention technique the counselor used in a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Technique {
    #[serde(rename = "A. Fostering Engagement / Rapport")]
    Engagement,
    #[serde(rename = "B. Collaborative Problem-Solving")]
    ProblemSolving,
    #[serde(rename = "C. Suicide Risk Assessment")]
    RiskAssessment,
    #[serde(rename = "D. Establishing Safety / Mitigating Risk")]
    Safety,
    #[serde(rename = "E. Resources, Referrals, and Treatment Promotion")]
    Resources,
}

/// Keyword table for [`Technique::classify`], checked in order
const TECHNIQUE_TABLE: &[(&[&str], Technique)] = &[
    (&["rapport", "engagement"], Technique::Engagement),
    (&["problem"], Technique::ProblemSolving),
    (&["risk"], Technique::RiskAssessment),
    (&["safety", "mitigating"], Technique::Safety),
];

impl Technique {
    /// All techniques in label order
    pub const ALL: [Technique; 5] = [
        Self::Engagement,
        Self::ProblemSolving,
        Self::RiskAssessment,
        Self::Safety,
        Self::Resources,
    ];

    /// Maps a model-provided label onto a technique
    ///
    /// An exact label (ignoring case and surrounding whitespace) maps to
    /// itself. Anything else goes through the keyword table in order, so free
    /// text such as "risk and safety" lands on risk assessment.
    ///
    /// # Examples
    ///
    /// ```
    /// use crisis_coach::schema::Technique;
    ///
    /// assert_eq!(Technique::classify("Building rapport"), Technique::Engagement);
    /// assert_eq!(Technique::classify("safety plan"), Technique::Safety);
    /// assert_eq!(Technique::classify(""), Technique::Resources);
    /// ```
    pub fn classify(text: &str) -> Self {
        let lowered = text.trim().to_lowercase();
        if let Some(exact) = Self::ALL
            .iter()
            .find(|technique| technique.label().to_lowercase() == lowered)
        {
            return *exact;
        }
        TECHNIQUE_TABLE
            .iter()
            .find(|(needles, _)| needles.iter().any(|needle| lowered.contains(needle)))
            .map(|(_, technique)| *technique)
            .unwrap_or(Self::Resources)
    }

    /// Full display label, e.g. `C. Suicide Risk Assessment`
    pub fn label(&self) -> &'static str {
        match self {
            Self::Engagement => "A. Fostering Engagement / Rapport",
            Self::ProblemSolving => "B. Collaborative Problem-Solving",
            Self::RiskAssessment => "C. Suicide Risk Assessment",
            Self::Safety => "D. Establishing Safety / Mitigating Risk",
            Self::Resources => "E. Resources, Referrals, and Treatment Promotion",
        }
    }
}

impl fmt::Display for Technique {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Evaluation of the counselor's most recent turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnFeedback {
    /// At most 180 characters
    pub did_well: String,
    /// At most 180 characters
    pub needs_improvement: String,
}

/// Five skill scores, each an integer in `0..=100`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillScores {
    pub empathy: u8,
    pub active_listening: u8,
    pub risk_assessment: u8,
    pub safety_planning: u8,
    pub problem_solving: u8,
}

/// Per-round coaching result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundCoach {
    pub summary: String,
    pub suggestion: String,
    /// One or two copy-ready counselor scripts
    pub recommended_options: Vec<String>,
    pub emotion: String,
    pub crisis_level: CrisisLevel,
    pub technique_used: Technique,
    pub current_turn_feedback: TurnFeedback,
    pub skill_scores: SkillScores,
}

impl RoundCoach {
    /// Placeholder shown before the first round has been coached
    pub fn session_start() -> Self {
        Self {
            summary: "Waiting for first round...".to_string(),
            suggestion: "Start with empathy, then ask one clear open-ended question.".to_string(),
            recommended_options: vec![
                "I'm glad you reached out. Can you tell me what feels hardest right now?"
                    .to_string(),
                "I want to understand your safety. Have thoughts of hurting yourself come up today?"
                    .to_string(),
                "Who is one person we can involve with you tonight for support?".to_string(),
            ],
            emotion: "Not enough data yet".to_string(),
            crisis_level: CrisisLevel::Low,
            technique_used: Technique::Engagement,
            current_turn_feedback: TurnFeedback {
                did_well: "N/A - session start".to_string(),
                needs_improvement: "N/A - session start".to_string(),
            },
            skill_scores: SkillScores::default(),
        }
    }

    /// `summary | suggestion`, the note attached to a session report request
    pub fn headline(&self) -> String {
        format!("{} | {}", self.summary, self.suggestion)
    }
}

/// Short structured mid-session feedback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickFeedback {
    /// At most 80 characters
    pub client_current_emotion: String,
    pub client_current_crisis_level: CrisisLevel,
    /// One or two copy-ready counselor scripts
    pub counselor_script_options: Vec<String>,
}

/// End-of-session report, one list per section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionReport {
    pub session_snapshot: Vec<String>,
    pub what_the_counselor_did_well: Vec<String>,
    pub missed_or_weak_risk_steps: Vec<String>,
    pub better_response_options: Vec<String>,
    pub action_plan_for_next_practice: Vec<String>,
}
