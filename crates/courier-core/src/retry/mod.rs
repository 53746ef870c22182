//! Retry and backoff execution.
//!
//! This module encapsulates error classification (configuration, credentials,
//! connectivity, send failures) and exponential backoff so that callers wrapping
//! a mail transport or a template renderer share one consistent policy.

mod classify;
mod error;
mod policy;
mod run;
mod sink;

pub use classify::{category_for_message, category_of, classify, has_transient_signature, is_retryable};
pub use error::{BoxError, ErrorCategory, ErrorContext, ErrorDetails, Failure, MailError};
pub use policy::{compute_delay, compute_delay_with, RetryDecision, RetryPolicy};
pub use run::RetryExecutor;
pub use sink::{NoopLogger, RetryLogger, TracingLogger, RETRY_TARGET};
