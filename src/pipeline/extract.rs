//! Lenient JSON extraction from model text
//!
//! Models wrap JSON in code fences, prepend chatter, or append commentary.
//! [`extract_json`] peels those layers in a fixed order before giving up
//! with a typed [`CoachError::Parse`].

use crate::error::{CoachError, Result};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

fn fence_pattern() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| Regex::new(r"(?is)```(?:json)?\s*(.*?)\s*```").expect("valid fence pattern"))
}

/// Parses the JSON object carried by `text`
///
/// Tries, in order: the body of the first fenced block (or the trimmed text
/// when there is none), then the span from the first `{` to the last `}` of
/// that body.
///
/// # Arguments
///
/// * `text` - Raw model output
/// * `label` - Payload name used in the error message
///
/// # Errors
///
/// Returns [`CoachError::Parse`] with
/// `Model returned non-JSON content for <label>.` when no candidate parses.
///
/// # Examples
///
/// ```
/// use crisis_coach::pipeline::extract::extract_json;
///
/// let value = extract_json("Sure!\n```json\n{\"emotion\": \"numb\"}\n```", "feedback").unwrap();
/// assert_eq!(value["emotion"], "numb");
///
/// let err = extract_json("no json here", "report").unwrap_err();
/// assert_eq!(err.to_string(), "Model returned non-JSON content for report.");
/// ```
pub fn extract_json(text: &str, label: &str) -> Result<Value> {
    let trimmed = text.trim();
    let raw = fence_pattern()
        .captures(trimmed)
        .and_then(|caps| caps.get(1))
        .map(|body| body.as_str().trim())
        .unwrap_or(trimmed);

    if let Ok(value) = serde_json::from_str::<Value>(raw) {
        return Ok(value);
    }

    if let (Some(start), Some(end)) = (raw.find('{'), raw.rfind('}')) {
        if end > start {
            if let Ok(value) = serde_json::from_str::<Value>(&raw[start..=end]) {
                return Ok(value);
            }
        }
    }

    tracing::debug!(label, chars = text.chars().count(), "No parseable JSON in model output");
    Err(CoachError::Parse(format!("Model returned non-JSON content for {}.", label)).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::is_parse_failure;

    #[test]
    fn test_plain_json() {
        let value = extract_json(r#"  {"a": 1}  "#, "x").unwrap();
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn test_fenced_block_without_language() {
        let value = extract_json("```\n{\"a\": [1, 2]}\n```", "x").unwrap();
        assert_eq!(value["a"][1], 2);
    }

    #[test]
    fn test_fence_is_case_insensitive() {
        let value = extract_json("```JSON\n{\"ok\": true}\n```", "x").unwrap();
        assert_eq!(value["ok"], true);
    }

    #[test]
    fn test_braces_inside_chatter() {
        let text = "Here you go: {\"summary\": \"fine\"} Hope this helps!";
        let value = extract_json(text, "round feedback").unwrap();
        assert_eq!(value["summary"], "fine");
    }

    #[test]
    fn test_failure_is_typed_parse_error() {
        let err = extract_json("{ not json at all }", "round feedback").unwrap_err();
        assert!(is_parse_failure(&err));
        assert_eq!(
            err.to_string(),
            "Model returned non-JSON content for round feedback."
        );
    }

    #[test]
    fn test_reversed_braces_fail() {
        assert!(extract_json("} oops {", "x").is_err());
    }
}
