//! Prompt builders for every task pipeline
//!
//! Each task degrades through up to three prompt tiers. The standard tier
//! carries full instructions and the widest transcript window; the compact
//! and strict tiers shrink both so a truncated answer has room to finish.

pub mod coach_prompt;
pub mod feedback_prompt;
pub mod polish_prompt;
pub mod report_prompt;
pub mod roleplay_prompt;

use crate::cases::CaseProfile;
use crate::transcript::{render_transcript, select_recent, Message};

/// Prompt verbosity tier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptTier {
    /// Full instructions and context
    Standard,
    /// Shortened instructions
    Compact,
    /// Minimal instructions, output format only
    Strict,
}

/// Renders the last `window` messages as a numbered transcript
///
/// # Examples
///
/// ```
/// use crisis_coach::prompts::windowed_transcript;
/// use crisis_coach::transcript::Message;
///
/// let messages = vec![Message::client("a"), Message::counselor("b"), Message::client("c")];
/// assert_eq!(windowed_transcript(&messages, 2), "1. Counselor: b\n2. Client: c");
/// ```
pub fn windowed_transcript(messages: &[Message], window: usize) -> String {
    render_transcript(select_recent(messages, window))
}

/// `Case theme:` and `Risk hint:` lines shared by the analysis prompts
///
/// # Examples
///
/// ```
/// use crisis_coach::cases::CaseProfile;
/// use crisis_coach::prompts::case_header;
///
/// let header = case_header(&CaseProfile::default());
/// assert_eq!(header, "Case theme: Not provided\nRisk hint: Not provided");
/// ```
pub fn case_header(profile: &CaseProfile) -> String {
    format!(
        "Case theme: {}\nRisk hint: {}",
        profile.title_or_default(),
        profile.risk_or_default()
    )
}
