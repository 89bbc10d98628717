//! Integration tests for `gifscout_common::error`.
//!
//! These suites validate classification and module error delegation through
//! the `impl_error_classification!` macro.

use std::time::Duration;

use gifscout_common::error::{CommonError, ErrorClassification, ErrorSeverity};
use gifscout_common::impl_error_classification;
use thiserror::Error;

#[derive(Debug, Error)]
enum UploadError {
    #[error("upload rejected: {0}")]
    Rejected(String),

    #[error("upload throttled")]
    Throttled,

    #[error(transparent)]
    Common(#[from] CommonError),
}

impl_error_classification!(UploadError, Common,
    Self::Rejected(_) => {
        retryable: false,
        severity: ErrorSeverity::Warning,
        critical: false,
    },
    Self::Throttled => {
        retryable: true,
        severity: ErrorSeverity::Info,
        critical: false,
        retry_after: Some(Duration::from_secs(30)),
    }
);

/// Validates that module errors delegate classification to `CommonError`.
///
/// Assertions:
/// - Confirms a wrapped configuration error is final with `Error` severity.
/// - Confirms a wrapped internal error is critical.
/// - Confirms module variants use their declared classification.
#[test]
fn module_errors_delegate_classification() {
    let config = UploadError::from(CommonError::config_field("chunk_size", "must be positive"));
    assert!(!config.is_retryable());
    assert_eq!(config.severity(), ErrorSeverity::Error);
    assert_eq!(config.retry_after(), None);
    assert_eq!(config.to_string(), "Configuration error in field 'chunk_size': must be positive");

    let internal = UploadError::from(CommonError::internal_with_context("bad state", "upload"));
    assert!(internal.is_critical());

    let rejected = UploadError::Rejected("too large".into());
    assert!(!rejected.is_retryable());
    assert_eq!(rejected.severity(), ErrorSeverity::Warning);
    assert_eq!(rejected.retry_after(), None);
}

#[test]
fn declared_retry_after_is_reported() {
    let throttled = UploadError::Throttled;
    assert!(throttled.is_retryable());
    assert_eq!(throttled.severity(), ErrorSeverity::Info);
    assert_eq!(throttled.retry_after(), Some(Duration::from_secs(30)));
}
