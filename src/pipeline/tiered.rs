//! Tiered retry engine shared by every task pipeline
//!
//! A task describes its degradation ladder as a list of [`AttemptPlan`]s,
//! ordered from the richest prompt to the tersest one with non-decreasing
//! token budgets. [`run_tiered`] walks that ladder sequentially: the first
//! plan whose completion validates wins, a retryable failure moves on to the
//! next plan, and anything else propagates immediately.

use crate::error::{is_parse_failure, is_truncation, CoachError, Result};
use crate::providers::{ChatMessage, CompletionClient, CompletionRequest, CompletionResult};

/// One rung of a retry ladder
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptPlan {
    /// Complete prompt for this attempt
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature
    pub temperature: f32,
    /// Output token budget
    pub max_tokens: u32,
}

impl AttemptPlan {
    /// Creates a plan
    pub fn new(messages: Vec<ChatMessage>, temperature: f32, max_tokens: u32) -> Self {
        Self {
            messages,
            temperature,
            max_tokens,
        }
    }

    /// Completion request for this plan
    pub fn to_request(&self) -> CompletionRequest {
        CompletionRequest {
            messages: self.messages.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

/// Which failures move the engine on to the next plan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Only truncation (empty content with a `length` finish reason)
    TruncationOnly,
    /// Truncation, or structured output that would not parse
    TruncationOrParse,
}

impl RetryPolicy {
    /// Returns true when `err` should move on to the next plan
    pub fn is_retryable(&self, err: &anyhow::Error) -> bool {
        match self {
            Self::TruncationOnly => is_truncation(err),
            Self::TruncationOrParse => is_truncation(err) || is_parse_failure(err),
        }
    }
}

/// Value produced by a tiered run plus how it was obtained
#[derive(Debug, Clone, PartialEq)]
pub struct TieredOutcome<T> {
    /// Validated value, or the fallback value
    pub value: T,
    /// Finish reason of the last completion that returned text, or `unknown`
    pub finish_reason: String,
    /// 1-based index of the plan that produced `value`
    pub attempt: usize,
    /// True when any plan past the first ran
    pub retried: bool,
    /// True when at least one attempt failed to parse
    pub json_retried: bool,
    /// True when `value` came from the fallback
    pub fallback_used: bool,
    /// Message of the most recent retryable failure, empty when none
    pub last_retriable_error: String,
}

/// Runs `plans` in order until one validates
///
/// `validate` turns a completion into the task's value; its errors are
/// classified by `policy` exactly like transport errors.
///
/// # Errors
///
/// Returns the first non-retryable error, or the retryable error raised by
/// the last plan.
///
/// # Examples
///
/// ```no_run
/// use crisis_coach::pipeline::tiered::{run_tiered, AttemptPlan, RetryPolicy};
/// use crisis_coach::providers::{ChatMessage, CompletionClient};
///
/// # async fn example(client: &dyn CompletionClient) -> crisis_coach::error::Result<()> {
/// let plans = vec![
///     AttemptPlan::new(vec![ChatMessage::user("Hello")], 0.5, 1200),
///     AttemptPlan::new(vec![ChatMessage::user("Hi")], 0.3, 3200),
/// ];
/// let outcome = run_tiered(client, &plans, RetryPolicy::TruncationOnly, |result| Ok(result.text)).await?;
/// println!("attempt {}: {}", outcome.attempt, outcome.value);
/// # Ok(())
/// # }
/// ```
pub async fn run_tiered<T, V>(
    client: &dyn CompletionClient,
    plans: &[AttemptPlan],
    policy: RetryPolicy,
    validate: V,
) -> Result<TieredOutcome<T>>
where
    T: Send,
    V: FnMut(CompletionResult) -> Result<T> + Send,
{
    run_ladder(client, plans, policy, validate, None::<fn() -> T>).await
}

/// Like [`run_tiered`], but a retryable failure on the last plan is replaced
/// by `fallback()` with `fallback_used` set
///
/// # Errors
///
/// Returns the first non-retryable error.
pub async fn run_tiered_with_fallback<T, V, F>(
    client: &dyn CompletionClient,
    plans: &[AttemptPlan],
    policy: RetryPolicy,
    validate: V,
    fallback: F,
) -> Result<TieredOutcome<T>>
where
    T: Send,
    V: FnMut(CompletionResult) -> Result<T> + Send,
    F: FnOnce() -> T + Send,
{
    run_ladder(client, plans, policy, validate, Some(fallback)).await
}

async fn run_ladder<T, V, F>(
    client: &dyn CompletionClient,
    plans: &[AttemptPlan],
    policy: RetryPolicy,
    mut validate: V,
    fallback: Option<F>,
) -> Result<TieredOutcome<T>>
where
    T: Send,
    V: FnMut(CompletionResult) -> Result<T> + Send,
    F: FnOnce() -> T + Send,
{
    if plans.is_empty() {
        return Err(CoachError::Configuration("No attempt plans configured".to_string()).into());
    }

    let mut finish_reason = "unknown".to_string();
    let mut json_retried = false;
    let mut last_retriable_error = String::new();

    for (idx, plan) in plans.iter().enumerate() {
        let attempt = idx + 1;
        let is_last = attempt == plans.len();
        tracing::debug!(
            "Attempt {}/{}: {} prompt messages, temperature={}, max_tokens={}",
            attempt,
            plans.len(),
            plan.messages.len(),
            plan.temperature,
            plan.max_tokens
        );

        let outcome = match client.complete(&plan.to_request()).await {
            Ok(result) => {
                finish_reason = result.finish_reason.clone();
                validate(result)
            }
            Err(err) => Err(err),
        };

        let err = match outcome {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!("Attempt {} succeeded after retry", attempt);
                }
                return Ok(TieredOutcome {
                    value,
                    finish_reason,
                    attempt,
                    retried: attempt > 1,
                    json_retried,
                    fallback_used: false,
                    last_retriable_error,
                });
            }
            Err(err) => err,
        };

        if !policy.is_retryable(&err) {
            tracing::warn!("Attempt {} failed with non-retryable error: {}", attempt, err);
            return Err(err);
        }
        if is_parse_failure(&err) {
            json_retried = true;
        }
        last_retriable_error = err.to_string();

        if is_last {
            return match fallback {
                Some(fallback) => {
                    tracing::warn!(
                        "All {} attempts failed ({}); using local fallback",
                        plans.len(),
                        last_retriable_error
                    );
                    Ok(TieredOutcome {
                        value: fallback(),
                        finish_reason,
                        attempt,
                        retried: attempt > 1,
                        json_retried,
                        fallback_used: true,
                        last_retriable_error,
                    })
                }
                None => {
                    tracing::warn!("All {} attempts exhausted: {}", plans.len(), err);
                    Err(err)
                }
            };
        }

        tracing::warn!(
            "Attempt {} failed ({}); escalating to plan {}",
            attempt,
            last_retriable_error,
            attempt + 1
        );
    }

    // Every path through the final plan returns above
    Err(CoachError::Configuration("Retry ladder ended without a result".to_string()).into())
}
