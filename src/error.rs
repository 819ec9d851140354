//! Error types for Crisis Coach
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling. The display strings of the
//! provider-facing variants are the messages surfaced to callers verbatim.

use thiserror::Error;

/// Main error type for Crisis Coach operations
///
/// The retry controller classifies failures by variant: only
/// [`CoachError::EmptyContent`] with a `length` finish reason is a truncation,
/// and [`CoachError::Parse`] is retryable for the coaching task alone.
#[derive(Error, Debug)]
pub enum CoachError {
    /// Missing or invalid configuration (no API key, bad base URL, ...)
    #[error("{0}")]
    Configuration(String),

    /// Remote API answered with a non-success status
    #[error("{message}")]
    Provider {
        /// HTTP status returned by the provider, when one was received
        status: Option<u16>,
        /// Upstream error text, already prefixed for display
        message: String,
    },

    /// The provider answered successfully but no usable text came back
    #[error("Model returned empty content (finish_reason: {finish_reason})")]
    EmptyContent {
        /// Finish reason reported alongside the empty completion
        finish_reason: String,
    },

    /// Structured output could not be parsed as JSON
    #[error("{0}")]
    Parse(String),

    /// Caller supplied an unusable request (too few messages, empty draft)
    #[error("{0}")]
    InvalidRequest(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl CoachError {
    /// Finish reason that marks a completion cut off by its token budget
    pub const LENGTH_FINISH_REASON: &'static str = "length";

    /// Returns true when this error means the model ran out of output budget
    ///
    /// # Examples
    ///
    /// ```
    /// use crisis_coach::error::CoachError;
    ///
    /// let err = CoachError::EmptyContent { finish_reason: "length".to_string() };
    /// assert!(err.is_truncation());
    ///
    /// let err = CoachError::EmptyContent { finish_reason: "stop".to_string() };
    /// assert!(!err.is_truncation());
    /// ```
    pub fn is_truncation(&self) -> bool {
        matches!(
            self,
            Self::EmptyContent { finish_reason } if finish_reason == Self::LENGTH_FINISH_REASON
        )
    }

    /// Returns true for structured-output parse failures
    pub fn is_parse_failure(&self) -> bool {
        matches!(self, Self::Parse(_))
    }
}

/// Result type alias for Crisis Coach operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;

/// Returns true when an `anyhow` error wraps a truncation-class [`CoachError`]
pub fn is_truncation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<CoachError>()
        .is_some_and(CoachError::is_truncation)
}

/// Returns true when an `anyhow` error wraps a [`CoachError::Parse`]
pub fn is_parse_failure(err: &anyhow::Error) -> bool {
    err.downcast_ref::<CoachError>()
        .is_some_and(CoachError::is_parse_failure)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_content_display_embeds_finish_reason() {
        let error = CoachError::EmptyContent {
            finish_reason: "length".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Model returned empty content (finish_reason: length)"
        );
    }

    #[test]
    fn test_provider_error_display_is_verbatim() {
        let error = CoachError::Provider {
            status: Some(429),
            message: "Model API error: rate limited".to_string(),
        };
        assert_eq!(error.to_string(), "Model API error: rate limited");
    }

    #[test]
    fn test_configuration_error_display() {
        let error = CoachError::Configuration("Missing key".to_string());
        assert_eq!(error.to_string(), "Missing key");
    }

    #[test]
    fn test_only_length_empty_content_is_truncation() {
        assert!(CoachError::EmptyContent {
            finish_reason: "length".to_string()
        }
        .is_truncation());
        assert!(!CoachError::EmptyContent {
            finish_reason: "content_filter".to_string()
        }
        .is_truncation());
        assert!(!CoachError::Parse("bad".to_string()).is_truncation());
        assert!(!CoachError::Provider {
            status: Some(500),
            message: "finish_reason: length".to_string()
        }
        .is_truncation());
    }

    #[test]
    fn test_parse_failure_is_not_matched_by_message_text() {
        let provider = CoachError::Provider {
            status: Some(400),
            message: "Model API error: invalid JSON body".to_string(),
        };
        assert!(!provider.is_parse_failure());
        assert!(CoachError::Parse("Model returned non-JSON content for report.".to_string())
            .is_parse_failure());
    }

    #[test]
    fn test_anyhow_classification_helpers() {
        let err: anyhow::Error = CoachError::EmptyContent {
            finish_reason: "length".to_string(),
        }
        .into();
        assert!(is_truncation(&err));
        assert!(!is_parse_failure(&err));

        let err: anyhow::Error = CoachError::Parse("oops".to_string()).into();
        assert!(is_parse_failure(&err));

        let err = anyhow::anyhow!("finish_reason: length");
        assert!(!is_truncation(&err));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{invalid json}").unwrap_err();
        let error: CoachError = json_error.into();
        assert!(matches!(error, CoachError::Serialization(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CoachError>();
    }
}
