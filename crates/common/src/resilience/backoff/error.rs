// Error types for backoff module
use thiserror::Error;

use crate::error::{CommonError, ErrorSeverity};
use crate::impl_error_classification;

/// Errors that can occur while configuring or driving a backoff controller
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BackoffError {
    #[error(transparent)]
    Common(#[from] CommonError),

    /// A wait is already armed; callers may join it and try again once it ends.
    #[error("{0}")]
    InvalidState(String),

    #[error("Unsupported backoff event: {0}")]
    UnsupportedEvent(String),
}

impl BackoffError {
    /// Whether this error was raised by strategy parameter validation.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Common(CommonError::Config { .. }))
    }
}

impl_error_classification!(BackoffError, Common,
    Self::InvalidState(_) => {
        retryable: true,
        severity: ErrorSeverity::Info,
        critical: false,
    },
    Self::UnsupportedEvent(_) => {
        retryable: false,
        severity: ErrorSeverity::Error,
        critical: false,
    }
);

/// Result type for backoff operations
pub type BackoffResult<T> = Result<T, BackoffError>;
