//! Write-only logger sink used by the retry executor.
//!
//! The executor receives its sink at construction instead of reaching for a
//! process-wide logger; the composition root picks [`TracingLogger`] or
//! [`NoopLogger`].

use crate::retry::error::ErrorContext;
use std::error::Error as StdError;

/// Tracing target for events emitted through [`TracingLogger`].
pub const RETRY_TARGET: &str = "courier::retry";

/// Severity-levelled sink. Must tolerate calls from concurrent executions.
pub trait RetryLogger: Send + Sync {
    fn debug(&self, message: &str, fields: &ErrorContext);
    fn info(&self, message: &str, fields: &ErrorContext);
    fn warn(&self, message: &str, fields: &ErrorContext, cause: Option<&(dyn StdError + 'static)>);
    fn error(&self, message: &str, fields: &ErrorContext, cause: Option<&(dyn StdError + 'static)>);
}

/// Forwards to `tracing` events; fields are rendered as one JSON object.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

fn render_fields(fields: &ErrorContext) -> String {
    serde_json::to_string(fields).unwrap_or_default()
}

impl RetryLogger for TracingLogger {
    fn debug(&self, message: &str, fields: &ErrorContext) {
        tracing::debug!(target: RETRY_TARGET, fields = %render_fields(fields), "{}", message);
    }

    fn info(&self, message: &str, fields: &ErrorContext) {
        tracing::info!(target: RETRY_TARGET, fields = %render_fields(fields), "{}", message);
    }

    fn warn(&self, message: &str, fields: &ErrorContext, cause: Option<&(dyn StdError + 'static)>) {
        match cause {
            Some(cause) => tracing::warn!(
                target: RETRY_TARGET,
                fields = %render_fields(fields),
                cause = %cause,
                "{}",
                message
            ),
            None => tracing::warn!(target: RETRY_TARGET, fields = %render_fields(fields), "{}", message),
        }
    }

    fn error(&self, message: &str, fields: &ErrorContext, cause: Option<&(dyn StdError + 'static)>) {
        match cause {
            Some(cause) => tracing::error!(
                target: RETRY_TARGET,
                fields = %render_fields(fields),
                cause = %cause,
                "{}",
                message
            ),
            None => tracing::error!(target: RETRY_TARGET, fields = %render_fields(fields), "{}", message),
        }
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLogger;

impl RetryLogger for NoopLogger {
    fn debug(&self, _message: &str, _fields: &ErrorContext) {}
    fn info(&self, _message: &str, _fields: &ErrorContext) {}
    fn warn(&self, _message: &str, _fields: &ErrorContext, _cause: Option<&(dyn StdError + 'static)>) {}
    fn error(&self, _message: &str, _fields: &ErrorContext, _cause: Option<&(dyn StdError + 'static)>) {}
}
