//! Markdown rendering and length capping for text payloads

use crate::schema::{QuickFeedback, SessionReport};
use regex::Regex;
use std::sync::OnceLock;

/// Character budget for quick feedback
pub const FEEDBACK_MAX_CHARS: usize = 900;
/// Appended when quick feedback is cut
pub const FEEDBACK_TRUNCATION_MARKER: &str = "...";
/// Character budget for the session report
pub const REPORT_MAX_CHARS: usize = 3800;
/// Appended when the session report is cut
pub const REPORT_TRUNCATION_MARKER: &str = "\n\n[Truncated to fit report length]";

/// Report section titles, in rendering order
pub const REPORT_SECTION_TITLES: [&str; 5] = [
    "Session Snapshot",
    "What The Counselor Did Well",
    "Missed Or Weak Risk Steps",
    "Better Response Options (2)",
    "Action Plan For Next Practice",
];

/// Collapses internal whitespace runs so an item renders on one line
fn single_line(item: &str) -> String {
    item.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Renders quick feedback as three markdown sections
///
/// # Examples
///
/// ```
/// use crisis_coach::pipeline::format::format_quick_feedback;
/// use crisis_coach::schema::{CrisisLevel, QuickFeedback};
///
/// let text = format_quick_feedback(&QuickFeedback {
///     client_current_emotion: "Hopeless".to_string(),
///     client_current_crisis_level: CrisisLevel::High,
///     counselor_script_options: vec!["Script one.".to_string()],
/// });
/// assert!(text.starts_with("## Client Current Emotion\n- Hopeless"));
/// assert!(text.ends_with("1. Script one.\n2. N/A"));
/// ```
pub fn format_quick_feedback(feedback: &QuickFeedback) -> String {
    let script = |idx: usize| {
        feedback
            .counselor_script_options
            .get(idx)
            .map(|s| single_line(s))
            .unwrap_or_else(|| "N/A".to_string())
    };
    format!(
        "## Client Current Emotion\n- {}\n\n## Client Current Crisis Level\n- {}\n\n## Two Suggested Counselor Responses\n1. {}\n2. {}",
        single_line(&feedback.client_current_emotion),
        feedback.client_current_crisis_level,
        script(0),
        script(1)
    )
}

/// Renders the session report as five `## Title` sections of `- ` bullets
pub fn format_report(report: &SessionReport) -> String {
    let sections: [&[String]; 5] = [
        &report.session_snapshot,
        &report.what_the_counselor_did_well,
        &report.missed_or_weak_risk_steps,
        &report.better_response_options,
        &report.action_plan_for_next_practice,
    ];

    REPORT_SECTION_TITLES
        .iter()
        .zip(sections)
        .map(|(title, items)| {
            let bullets = items
                .iter()
                .map(|item| format!("- {}", single_line(item)))
                .collect::<Vec<_>>()
                .join("\n");
            format!("## {}\n{}", title, bullets)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn excess_newlines() -> &'static Regex {
    static EXCESS: OnceLock<Regex> = OnceLock::new();
    EXCESS.get_or_init(|| Regex::new(r"\n{3,}").expect("valid newline pattern"))
}

/// Compacts `text` and caps it at `max_chars`
///
/// Runs of three or more newlines become two and the result is trimmed. When
/// still over budget the text is cut, trimmed again, and `marker` appended,
/// so the output never exceeds `max_chars + marker` characters.
///
/// # Examples
///
/// ```
/// use crisis_coach::pipeline::format::limit_length;
///
/// assert_eq!(limit_length("a\n\n\n\nb", 10, "..."), "a\n\nb");
/// assert_eq!(limit_length("abcdef", 3, "..."), "abc...");
/// ```
pub fn limit_length(text: &str, max_chars: usize, marker: &str) -> String {
    let compact = excess_newlines().replace_all(text, "\n\n");
    let compact = compact.trim();
    if compact.chars().count() <= max_chars {
        return compact.to_string();
    }
    let cut: String = compact.chars().take(max_chars).collect();
    format!("{}{}", cut.trim(), marker)
}

/// Recovers `(title, item_count)` pairs from formatted feedback or report
/// text
///
/// Items are `- ` bullets or `N. ` numbered lines under a `## ` heading.
pub fn parse_sections(text: &str) -> Vec<(String, usize)> {
    let mut sections: Vec<(String, usize)> = Vec::new();
    for line in text.lines() {
        if let Some(title) = line.strip_prefix("## ") {
            sections.push((title.trim().to_string(), 0));
            continue;
        }
        let is_item = line.starts_with("- ")
            || line
                .split_once(". ")
                .is_some_and(|(n, _)| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()));
        if is_item {
            if let Some((_, count)) = sections.last_mut() {
                *count += 1;
            }
        }
    }
    sections
}
