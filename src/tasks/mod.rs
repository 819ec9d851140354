//! Task pipelines
//!
//! Each task validates its request, builds an attempt ladder from the
//! prompt tiers, runs it through the tiered engine, and shapes the result
//! for callers:
//!
//! - `roleplay`: next simulated-client reply
//! - `coach`: per-round structured coaching, with `fallback` on exhaustion
//! - `polish`: rewritten counselor draft
//! - `feedback`: short formatted mid-session feedback
//! - `report`: formatted end-of-session report

pub mod coach;
pub mod fallback;
pub mod feedback;
pub mod polish;
pub mod report;
pub mod roleplay;

pub use coach::{coach_round, CoachMeta, CoachRequest, CoachResponse};
pub use feedback::{quick_feedback, FeedbackRequest, FeedbackResponse};
pub use polish::{polish_draft, PolishRequest, PolishResponse};
pub use report::{session_report, ReportRequest, ReportResponse};
pub use roleplay::{client_reply, ReplyMeta, RoleplayRequest, RoleplayResponse};

use crate::error::{CoachError, Result};
use crate::pipeline::TieredOutcome;
use serde::Serialize;

/// Attempt metadata returned by the polish, feedback and report tasks
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptMeta {
    /// Always true: a response means the model was called
    pub called_api: bool,
    pub finish_reason: String,
    pub retried: bool,
    /// 1-based index of the plan that produced the result
    pub attempt: usize,
}

impl<T> From<&TieredOutcome<T>> for AttemptMeta {
    fn from(outcome: &TieredOutcome<T>) -> Self {
        Self {
            called_api: true,
            finish_reason: outcome.finish_reason.clone(),
            retried: outcome.retried,
            attempt: outcome.attempt,
        }
    }
}

/// Fails with [`CoachError::InvalidRequest`] unless `condition` holds
pub(crate) fn ensure(condition: bool, message: &str) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(CoachError::InvalidRequest(message.to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure() {
        assert!(ensure(true, "unused").is_ok());
        let err = ensure(false, "draft cannot be empty").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CoachError>(),
            Some(CoachError::InvalidRequest(_))
        ));
        assert_eq!(err.to_string(), "draft cannot be empty");
    }

    #[test]
    fn test_attempt_meta_serializes_camel_case() {
        let outcome = TieredOutcome {
            value: (),
            finish_reason: "stop".to_string(),
            attempt: 2,
            retried: true,
            json_retried: false,
            fallback_used: false,
            last_retriable_error: String::new(),
        };
        let json = serde_json::to_value(AttemptMeta::from(&outcome)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"calledApi": true, "finishReason": "stop", "retried": true, "attempt": 2})
        );
    }
}
