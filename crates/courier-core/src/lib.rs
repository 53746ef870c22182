//! Courier core: retry-with-backoff execution for mail sends and template
//! renders, plus the configuration and logging plumbing around it.

pub mod config;
pub mod logging;
pub mod retry;

pub use retry::{Failure, MailError, RetryExecutor, RetryPolicy};
