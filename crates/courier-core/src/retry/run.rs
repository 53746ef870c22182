//! Retry loop: run an async operation until success or the policy says stop.

use super::classify;
use super::error::{ErrorContext, ErrorDetails, Failure, MailError};
use super::policy::{RetryDecision, RetryPolicy};
use super::sink::{RetryLogger, TracingLogger};
use serde_json::{json, Value};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Per-call bookkeeping; created fresh for every `execute` and never shared.
#[derive(Debug, Default)]
struct AttemptState {
    attempt_number: u32,
    accumulated_delay: Duration,
    failure_history: Vec<Failure>,
}

impl AttemptState {
    /// Final error once retrying stops.
    ///
    /// A classified failure is rebuilt with the same category, an attempt summary
    /// message, the original as cause, and attempt/caller context merged under the
    /// original's own context. Unclassified failures pass through untouched.
    fn into_final_error(self, last: Failure, caller: &ErrorContext) -> Failure {
        let original = match last {
            Failure::Classified(original) => original,
            other => return other,
        };

        let all_errors: Vec<Value> = self
            .failure_history
            .iter()
            .map(|f| Value::String(f.message()))
            .chain(std::iter::once(Value::String(original.message().to_string())))
            .collect();

        let mut context = ErrorContext::new();
        context.insert("attempts".into(), json!(self.attempt_number));
        context.insert("allErrors".into(), Value::Array(all_errors));
        context.extend(caller.iter().map(|(k, v)| (k.clone(), v.clone())));
        context.extend(original.context().iter().map(|(k, v)| (k.clone(), v.clone())));

        let details = ErrorDetails {
            message: format!(
                "Operation failed after {} attempts: {}",
                self.attempt_number,
                original.message()
            ),
            cause: None,
            context,
        };
        let category = original.category();
        Failure::Classified(MailError::from_details(category, details).with_cause(original))
    }
}

/// Caller context overlaid with per-line fields.
fn log_fields<const N: usize>(context: &ErrorContext, extra: [(&str, Value); N]) -> ErrorContext {
    let mut fields = context.clone();
    fields.extend(extra.into_iter().map(|(k, v)| (k.to_string(), v)));
    fields
}

fn millis(d: Duration) -> Value {
    json!(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

/// Runs operations under a [`RetryPolicy`], logging through an injected sink.
#[derive(Clone)]
pub struct RetryExecutor {
    logger: Arc<dyn RetryLogger>,
}

impl Default for RetryExecutor {
    fn default() -> Self {
        Self::new(Arc::new(TracingLogger))
    }
}

impl std::fmt::Debug for RetryExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryExecutor").finish_non_exhaustive()
    }
}

impl RetryExecutor {
    pub fn new(logger: Arc<dyn RetryLogger>) -> Self {
        Self { logger }
    }

    pub fn logger(&self) -> &dyn RetryLogger {
        self.logger.as_ref()
    }

    /// Run `operation` with no caller context.
    pub async fn execute<T, E, F, Fut>(&self, policy: &RetryPolicy, operation: F) -> Result<T, Failure>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<Failure>,
    {
        self.execute_with_context(policy, ErrorContext::new(), operation)
            .await
    }

    /// Run `operation` up to `policy.max_attempts` times (at least once).
    ///
    /// `context` is merged into every log line and into the final error. Attempts
    /// run strictly in sequence; the only suspension besides the operation itself
    /// is the backoff sleep.
    pub async fn execute_with_context<T, E, F, Fut>(
        &self,
        policy: &RetryPolicy,
        context: ErrorContext,
        mut operation: F,
    ) -> Result<T, Failure>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<Failure>,
    {
        let max_attempts = policy.max_attempts.max(1);
        let mut state = AttemptState::default();

        loop {
            state.attempt_number += 1;
            let attempt = state.attempt_number;

            let failure: Failure = match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        self.logger.info(
                            "operation succeeded after retry",
                            &log_fields(
                                &context,
                                [
                                    ("attempt", json!(attempt)),
                                    ("totalDelayMs", millis(state.accumulated_delay)),
                                ],
                            ),
                        );
                    }
                    return Ok(value);
                }
                Err(err) => err.into(),
            };

            let retryable = classify::is_retryable(&failure);
            let decision = policy.decide(attempt, retryable);
            let will_retry = matches!(decision, RetryDecision::RetryAfter(_));

            self.logger.warn(
                "operation attempt failed",
                &log_fields(
                    &context,
                    [
                        ("attempt", json!(attempt)),
                        ("maxAttempts", json!(max_attempts)),
                        ("willRetry", json!(will_retry)),
                        ("error", Value::String(failure.message())),
                    ],
                ),
                Some(&failure as &(dyn std::error::Error + 'static)),
            );

            match decision {
                RetryDecision::NoRetry => return Err(state.into_final_error(failure, &context)),
                RetryDecision::RetryAfter(delay) => {
                    state.failure_history.push(failure);
                    state.accumulated_delay += delay;
                    self.logger.debug(
                        "waiting before retry",
                        &log_fields(
                            &context,
                            [
                                ("delayMs", millis(delay)),
                                ("nextAttempt", json!(attempt + 1)),
                            ],
                        ),
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::sink::NoopLogger;
    use crate::retry::ErrorCategory;
    use std::error::Error as _;

    fn state_with(history: &[&str], attempts: u32) -> AttemptState {
        AttemptState {
            attempt_number: attempts,
            accumulated_delay: Duration::ZERO,
            failure_history: history.iter().map(|m| Failure::raw(*m)).collect(),
        }
    }

    #[test]
    fn final_error_rewraps_classified_with_same_category() {
        let mut own = ErrorContext::new();
        own.insert("host".into(), json!("smtp.example.com"));
        let last = Failure::from(MailError::connectivity("reset").with_context(own));

        let mut caller = ErrorContext::new();
        caller.insert("host".into(), json!("from-caller"));
        caller.insert("recipient".into(), json!("a@example.com"));
        caller.insert("attempts".into(), json!("caller"));

        let err = state_with(&["first", "second"], 3).into_final_error(last, &caller);
        let err = err.as_classified().expect("classified");
        assert_eq!(err.category(), ErrorCategory::Connectivity);
        assert_eq!(err.message(), "Operation failed after 3 attempts: reset");
        assert_eq!(err.context()["host"], json!("smtp.example.com"));
        assert_eq!(err.context()["recipient"], json!("a@example.com"));
        assert_eq!(err.context()["attempts"], json!("caller"));
        assert_eq!(err.context()["allErrors"], json!(["first", "second", "reset"]));
        assert_eq!(err.source().unwrap().to_string(), "reset");
    }

    #[test]
    fn final_error_passes_raw_through() {
        let err = state_with(&[], 1).into_final_error(Failure::raw("boom"), &ErrorContext::new());
        assert!(matches!(err, Failure::Raw(_)));
        assert_eq!(err.to_string(), "boom");
    }

    #[tokio::test]
    async fn zero_max_attempts_still_runs_once() {
        let executor = RetryExecutor::new(Arc::new(NoopLogger));
        let policy = RetryPolicy {
            max_attempts: 0,
            ..RetryPolicy::template_render()
        };
        let mut calls = 0u32;
        let out = executor
            .execute(&policy, || {
                calls += 1;
                async { Ok::<_, Failure>("sent") }
            })
            .await;
        assert_eq!(out.unwrap(), "sent");
        assert_eq!(calls, 1);
    }
}
