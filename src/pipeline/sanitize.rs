//! Schema coercion for model-produced payloads
//!
//! Sanitizers never fail. Missing or malformed fields are replaced with fixed
//! defaults, strings are trimmed and cut, lists are filtered and capped, and
//! scores are clamped. Running a sanitizer over its own serialized output
//! returns the same value.

use crate::schema::{
    CrisisLevel, QuickFeedback, RoundCoach, SessionReport, SkillScores, Technique, TurnFeedback,
    EMOTION_MAX_CHARS, MAX_RECOMMENDED_OPTIONS, TURN_FEEDBACK_MAX_CHARS,
};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Default script pair used when the model produced no usable quick-feedback
/// scripts
pub const DEFAULT_FEEDBACK_SCRIPTS: [&str; 2] = [
    "I hear you. Can you tell me what feels most overwhelming right now?",
    "To keep you safe, are you having thoughts of harming yourself right now?",
];

/// Default script pair for the session report
pub const DEFAULT_REPORT_SCRIPTS: [&str; 2] = [
    "I hear you. Can we slow down and focus on what feels most urgent right now?",
    "To keep you safe, are you having thoughts of harming yourself right now?",
];

/// Per-section item caps of [`SessionReport`], in section order
pub const REPORT_SECTION_CAPS: [usize; 5] = [3, 3, 3, 2, 3];

/// Text form of a scalar JSON value; containers and null have none
fn scalar_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

/// Cuts `text` to at most `max` characters
fn cut_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Coerces a field into trimmed text
///
/// Blank, missing, or non-scalar values become `default`. With `max_chars`
/// the result is cut to that many characters.
///
/// # Examples
///
/// ```
/// use crisis_coach::pipeline::sanitize::coerce_text;
/// use serde_json::json;
///
/// assert_eq!(coerce_text(Some(&json!("  calm ")), "Not clear", None), "calm");
/// assert_eq!(coerce_text(Some(&json!("")), "Not clear", None), "Not clear");
/// assert_eq!(coerce_text(None, "Not clear", None), "Not clear");
/// assert_eq!(coerce_text(Some(&json!("abcdef")), "x", Some(3)), "abc");
/// ```
pub fn coerce_text(value: Option<&Value>, default: &str, max_chars: Option<usize>) -> String {
    let text = scalar_text(value).unwrap_or_default();
    let trimmed = text.trim();
    let chosen = if trimmed.is_empty() { default } else { trimmed };
    match max_chars {
        Some(max) => cut_chars(chosen, max).trim_end().to_string(),
        None => chosen.to_string(),
    }
}

/// Coerces a field into a list of non-empty trimmed strings, at most
/// `max_items` long
///
/// Anything other than an array yields an empty list.
pub fn coerce_list(value: Option<&Value>, max_items: usize) -> Vec<String> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| scalar_text(Some(item)))
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .take(max_items)
        .collect()
}

/// Like [`coerce_list`] but substitutes `defaults` for an empty result
pub fn coerce_list_or(value: Option<&Value>, max_items: usize, defaults: &[&str]) -> Vec<String> {
    let items = coerce_list(value, max_items);
    if items.is_empty() {
        defaults.iter().map(|item| item.to_string()).collect()
    } else {
        items
    }
}

/// Coerces a score into an integer in `0..=100`
///
/// Numbers and numeric strings are accepted; anything else, including
/// non-finite values, is 0.
///
/// # Examples
///
/// ```
/// use crisis_coach::pipeline::sanitize::coerce_score;
/// use serde_json::json;
///
/// assert_eq!(coerce_score(Some(&json!(72.6))), 73);
/// assert_eq!(coerce_score(Some(&json!("140"))), 100);
/// assert_eq!(coerce_score(Some(&json!(-5))), 0);
/// assert_eq!(coerce_score(Some(&json!("n/a"))), 0);
/// assert_eq!(coerce_score(None), 0);
/// ```
pub fn coerce_score(value: Option<&Value>) -> u8 {
    let number = match value {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    match number {
        Some(n) if n.is_finite() => n.clamp(0.0, 100.0).round() as u8,
        _ => 0,
    }
}

fn coerce_level(value: Option<&Value>) -> CrisisLevel {
    CrisisLevel::classify(&scalar_text(value).unwrap_or_default())
}

fn coerce_technique(value: Option<&Value>) -> Technique {
    Technique::classify(&scalar_text(value).unwrap_or_default())
}

/// Coerces arbitrary JSON into a [`RoundCoach`]
pub fn sanitize_round_coach(payload: &Value) -> RoundCoach {
    let feedback = payload.get("current_turn_feedback");
    let scores = payload.get("skill_scores");
    let score = |key: &str| coerce_score(scores.and_then(|s| s.get(key)));

    RoundCoach {
        summary: coerce_text(payload.get("summary"), "No summary generated.", None),
        suggestion: coerce_text(payload.get("suggestion"), "No suggestion generated.", None),
        recommended_options: coerce_list_or(
            payload.get("recommended_options"),
            MAX_RECOMMENDED_OPTIONS,
            &["Could not generate response options this turn."],
        ),
        emotion: coerce_text(payload.get("emotion"), "Not clear", None),
        crisis_level: coerce_level(payload.get("crisis_level")),
        technique_used: coerce_technique(payload.get("technique_used")),
        current_turn_feedback: TurnFeedback {
            did_well: coerce_text(
                feedback.and_then(|f| f.get("did_well")),
                "N/A",
                Some(TURN_FEEDBACK_MAX_CHARS),
            ),
            needs_improvement: coerce_text(
                feedback.and_then(|f| f.get("needs_improvement")),
                "N/A",
                Some(TURN_FEEDBACK_MAX_CHARS),
            ),
        },
        skill_scores: SkillScores {
            empathy: score("empathy"),
            active_listening: score("active_listening"),
            risk_assessment: score("risk_assessment"),
            safety_planning: score("safety_planning"),
            problem_solving: score("problem_solving"),
        },
    }
}

/// Coerces arbitrary JSON into a [`QuickFeedback`]
pub fn sanitize_quick_feedback(payload: &Value) -> QuickFeedback {
    QuickFeedback {
        client_current_emotion: coerce_text(
            payload.get("client_current_emotion"),
            "Not clear",
            Some(EMOTION_MAX_CHARS),
        ),
        client_current_crisis_level: coerce_level(payload.get("client_current_crisis_level")),
        counselor_script_options: coerce_list_or(
            payload.get("counselor_script_options"),
            MAX_RECOMMENDED_OPTIONS,
            &DEFAULT_FEEDBACK_SCRIPTS,
        ),
    }
}

/// Coerces arbitrary JSON into a [`SessionReport`]
pub fn sanitize_report(payload: &Value) -> SessionReport {
    let [snapshot_cap, did_well_cap, missed_cap, options_cap, plan_cap] = REPORT_SECTION_CAPS;
    SessionReport {
        session_snapshot: coerce_list_or(
            payload.get("session_snapshot"),
            snapshot_cap,
            &["Session summary unavailable."],
        ),
        what_the_counselor_did_well: coerce_list_or(
            payload.get("what_the_counselor_did_well"),
            did_well_cap,
            &["Strengths not identified clearly in this run."],
        ),
        missed_or_weak_risk_steps: coerce_list_or(
            payload.get("missed_or_weak_risk_steps"),
            missed_cap,
            &["No clear risk-assessment gaps identified."],
        ),
        better_response_options: coerce_list_or(
            payload.get("better_response_options"),
            options_cap,
            &DEFAULT_REPORT_SCRIPTS,
        ),
        action_plan_for_next_practice: coerce_list_or(
            payload.get("action_plan_for_next_practice"),
            plan_cap,
            &["Practice one empathic reflection followed by one direct safety question."],
        ),
    }
}

fn blank_lines() -> &'static Regex {
    static BLANK_LINES: OnceLock<Regex> = OnceLock::new();
    BLANK_LINES.get_or_init(|| Regex::new(r"\n{2,}").expect("valid blank-line pattern"))
}

/// Cleans a free-text reply: strips surrounding quotes, backticks and
/// whitespace, and collapses runs of blank lines into one newline
///
/// # Examples
///
/// ```
/// use crisis_coach::pipeline::sanitize::normalize_reply;
///
/// assert_eq!(normalize_reply("  \"I hear you.\n\n\nWhat happened?\"  "), "I hear you.\nWhat happened?");
/// assert_eq!(normalize_reply("``` ```"), "");
/// ```
pub fn normalize_reply(text: &str) -> String {
    let stripped = text.trim_matches(|c: char| matches!(c, '"' | '\'' | '`') || c.is_whitespace());
    blank_lines().replace_all(stripped, "\n").trim().to_string()
}
