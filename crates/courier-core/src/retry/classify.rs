//! Map arbitrary failures onto error categories and decide retryability.
//!
//! Both functions here are pure: they never log and never mutate their input.

use crate::retry::error::{render_value, ErrorCategory, ErrorContext, Failure, MailError};
use std::sync::Arc;

/// Substrings marking a credentials problem.
const AUTH_MARKERS: &[&str] = &["auth", "login", "password"];

/// Substrings marking a network-level problem.
const CONNECTIVITY_MARKERS: &[&str] = &["connect", "timeout", "enotfound", "econnrefused"];

/// Transient signatures that make an unclassified failure retryable.
const TRANSIENT_SIGNATURES: &[&str] = &[
    "etimedout",
    "econnreset",
    "enotfound",
    "econnrefused",
    "timeout",
    "network",
];

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// Category a raw error message falls into.
pub fn category_for_message(message: &str) -> ErrorCategory {
    let lower = message.to_lowercase();
    if contains_any(&lower, AUTH_MARKERS) {
        ErrorCategory::Authentication
    } else if contains_any(&lower, CONNECTIVITY_MARKERS) {
        ErrorCategory::Connectivity
    } else {
        ErrorCategory::SendFailure
    }
}

/// True when the message carries a known transient signature (case-insensitive).
pub fn has_transient_signature(message: &str) -> bool {
    contains_any(&message.to_lowercase(), TRANSIENT_SIGNATURES)
}

/// Category of a failure without taking ownership of it.
pub fn category_of(failure: &Failure) -> ErrorCategory {
    match failure {
        Failure::Classified(e) => e.category(),
        Failure::Raw(e) => category_for_message(&e.to_string()),
        Failure::Value(_) => ErrorCategory::Unknown,
    }
}

/// Classify a failure.
///
/// An already-classified error is returned unchanged. A raw error becomes
/// Authentication, Connectivity or SendFailure by message sniffing and keeps the
/// original as its cause. A non-error value becomes Unknown with no cause.
/// `context`, when given, is attached to newly built errors only.
pub fn classify(failure: Failure, context: Option<&ErrorContext>) -> MailError {
    let err = match failure {
        Failure::Classified(e) => return e,
        Failure::Raw(raw) => {
            let message = raw.to_string();
            let err = match category_for_message(&message) {
                ErrorCategory::SendFailure => {
                    MailError::send_failure(format!("Email operation failed: {}", message))
                }
                category => MailError::new(category, message),
            };
            err.with_shared_cause(Arc::from(raw))
        }
        Failure::Value(value) => {
            MailError::unknown(format!("Unknown error occurred: {}", render_value(&value)))
        }
    };
    match context {
        Some(ctx) => err.with_context(ctx.clone()),
        None => err,
    }
}

/// Whether the executor should try again after this failure.
///
/// Classified errors use their category flag. Anything else is retryable when its
/// message carries a transient signature; raw errors are also retryable when
/// their sniffed category is.
pub fn is_retryable(failure: &Failure) -> bool {
    match failure {
        Failure::Classified(e) => e.is_retryable(),
        Failure::Raw(e) => {
            let message = e.to_string();
            has_transient_signature(&message) || category_for_message(&message).is_retryable()
        }
        Failure::Value(v) => has_transient_signature(&render_value(v)),
    }
}
