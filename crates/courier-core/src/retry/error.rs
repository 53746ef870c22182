//! Classified mail errors and the failure values an operation may produce.

use serde_json::Value;
use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

/// Free-form diagnostic context attached to errors and log lines.
pub type ErrorContext = BTreeMap<String, Value>;

/// Boxed error accepted as a raw (unclassified) failure.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

type SharedCause = Arc<dyn StdError + Send + Sync + 'static>;

/// Semantic category of a mail error. Each category has a fixed retryability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Invalid settings; retrying cannot help.
    Configuration,
    /// Credentials rejected by the transport.
    Authentication,
    /// Network-level failure (DNS, refused, reset, timed out).
    Connectivity,
    /// The transport accepted the connection but the send failed.
    SendFailure,
    /// Failure value that was not an error at all.
    Unknown,
}

impl ErrorCategory {
    pub fn is_retryable(self) -> bool {
        matches!(self, ErrorCategory::Connectivity | ErrorCategory::SendFailure)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCategory::Configuration => "configuration",
            ErrorCategory::Authentication => "authentication",
            ErrorCategory::Connectivity => "connectivity",
            ErrorCategory::SendFailure => "send-failure",
            ErrorCategory::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Payload shared by every [`MailError`] variant.
#[derive(Debug, Clone, Default)]
pub struct ErrorDetails {
    pub message: String,
    pub cause: Option<SharedCause>,
    pub context: ErrorContext,
}

impl ErrorDetails {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cause: None,
            context: ErrorContext::new(),
        }
    }
}

/// An error tagged with a semantic category.
///
/// Re-wrapping keeps the variant tag: see [`MailError::from_details`].
#[derive(Debug, Clone)]
pub enum MailError {
    Configuration(ErrorDetails),
    Authentication(ErrorDetails),
    Connectivity(ErrorDetails),
    SendFailure(ErrorDetails),
    Unknown(ErrorDetails),
}

impl MailError {
    /// Build an error of the given category from prepared details.
    pub fn from_details(category: ErrorCategory, details: ErrorDetails) -> Self {
        match category {
            ErrorCategory::Configuration => MailError::Configuration(details),
            ErrorCategory::Authentication => MailError::Authentication(details),
            ErrorCategory::Connectivity => MailError::Connectivity(details),
            ErrorCategory::SendFailure => MailError::SendFailure(details),
            ErrorCategory::Unknown => MailError::Unknown(details),
        }
    }

    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self::from_details(category, ErrorDetails::new(message))
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Configuration, message)
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Authentication, message)
    }

    pub fn connectivity(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Connectivity, message)
    }

    pub fn send_failure(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::SendFailure, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Unknown, message)
    }

    /// Attach the underlying failure.
    pub fn with_cause<E>(mut self, cause: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        self.details_mut().cause = Some(Arc::new(cause));
        self
    }

    pub(crate) fn with_shared_cause(mut self, cause: SharedCause) -> Self {
        self.details_mut().cause = Some(cause);
        self
    }

    /// Merge diagnostic context; later keys overwrite earlier ones.
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.details_mut().context.extend(context);
        self
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            MailError::Configuration(_) => ErrorCategory::Configuration,
            MailError::Authentication(_) => ErrorCategory::Authentication,
            MailError::Connectivity(_) => ErrorCategory::Connectivity,
            MailError::SendFailure(_) => ErrorCategory::SendFailure,
            MailError::Unknown(_) => ErrorCategory::Unknown,
        }
    }

    pub fn details(&self) -> &ErrorDetails {
        match self {
            MailError::Configuration(d)
            | MailError::Authentication(d)
            | MailError::Connectivity(d)
            | MailError::SendFailure(d)
            | MailError::Unknown(d) => d,
        }
    }

    fn details_mut(&mut self) -> &mut ErrorDetails {
        match self {
            MailError::Configuration(d)
            | MailError::Authentication(d)
            | MailError::Connectivity(d)
            | MailError::SendFailure(d)
            | MailError::Unknown(d) => d,
        }
    }

    pub fn message(&self) -> &str {
        &self.details().message
    }

    pub fn context(&self) -> &ErrorContext {
        &self.details().context
    }

    pub fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }
}

impl fmt::Display for MailError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl StdError for MailError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.details().cause.as_ref().map(|cause| {
            let cause: &(dyn StdError + 'static) = &**cause;
            cause
        })
    }
}

/// What an operation handed to the retry executor may fail with.
#[derive(Debug, thiserror::Error)]
pub enum Failure {
    /// Already carries a category.
    #[error(transparent)]
    Classified(#[from] MailError),
    /// A generic error with a message but no category.
    #[error(transparent)]
    Raw(BoxError),
    /// A value that is not error-shaped (string, number, object, null).
    #[error("{}", render_value(.0))]
    Value(Value),
}

impl Failure {
    pub fn raw<E: Into<BoxError>>(err: E) -> Self {
        Failure::Raw(err.into())
    }

    pub fn value(value: impl Into<Value>) -> Self {
        Failure::Value(value.into())
    }

    pub fn as_classified(&self) -> Option<&MailError> {
        match self {
            Failure::Classified(e) => Some(e),
            Failure::Raw(_) | Failure::Value(_) => None,
        }
    }

    /// Human-readable message used in logs and attempt history.
    pub fn message(&self) -> String {
        match self {
            Failure::Classified(e) => e.message().to_string(),
            Failure::Raw(e) => e.to_string(),
            Failure::Value(v) => render_value(v),
        }
    }
}

/// Strings render bare; everything else renders as JSON.
pub(crate) fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
