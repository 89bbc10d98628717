//! Error types used throughout the application

pub mod connection;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use connection::{ConnectionError, ConnectionErrorKind};

/// Main error type for GifScout
///
/// Cloneable so a single outcome can be delivered to every waiter of a
/// transaction, and serializable so it can be stored in a transaction record.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum GifScoutError {
    #[error(transparent)]
    Connection(ConnectionError),

    #[error("Request cancelled")]
    Cancelled,

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl GifScoutError {
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Whether a transaction with `retry` set should run again after this error.
    ///
    /// Connection errors are already retried inside the executor, so they
    /// are not retried a second time at the transaction level.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Storage(_) | Self::Auth(_) | Self::Internal(_))
    }

    /// Text suitable for showing to an end user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Connection(err) => err.message().to_string(),
            other => other.to_string(),
        }
    }
}

impl From<ConnectionError> for GifScoutError {
    fn from(err: ConnectionError) -> Self {
        Self::Connection(err)
    }
}

impl From<serde_json::Error> for GifScoutError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type alias for GifScout operations
pub type Result<T> = std::result::Result<T, GifScoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag() {
        let err = GifScoutError::Storage("disk full".into());
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "Storage", "message": "disk full" }));

        let cancelled = serde_json::to_value(GifScoutError::Cancelled).unwrap();
        assert_eq!(cancelled, serde_json::json!({ "type": "Cancelled" }));
    }

    #[test]
    fn connection_errors_survive_serde() {
        let err = GifScoutError::from(ConnectionError::from_status(
            429,
            Some(serde_json::json!({ "code": "RATE_LIMIT" })),
        ));
        let json = serde_json::to_string(&err).unwrap();
        let restored: GifScoutError = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, err);
        assert_eq!(restored.user_message(), "Too many requests");
    }

    #[test]
    fn retry_classification() {
        assert!(GifScoutError::Network("reset".into()).is_retryable());
        assert!(!GifScoutError::Cancelled.is_retryable());
        assert!(!GifScoutError::Serialization("bad".into()).is_retryable());
        assert!(!GifScoutError::InvalidState("done".into()).is_retryable());
        assert!(!GifScoutError::from(ConnectionError::from_status(503, None)).is_retryable());
    }
}
