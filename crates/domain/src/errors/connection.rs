//! Typed failures for transport and HTTP-level problems

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::constants::UNKNOWN_ERROR_CODE;

/// Connection error categories, derived from the HTTP status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionErrorKind {
    InvalidRequest,
    LoginFailed,
    AccessDenied,
    NotFound,
    TooManyRequests,
    NetworkIssue,
    Default,
}

impl ConnectionErrorKind {
    /// Total mapping from HTTP status to kind.
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => Self::InvalidRequest,
            401 => Self::LoginFailed,
            403 => Self::AccessDenied,
            404 => Self::NotFound,
            429 => Self::TooManyRequests,
            503 => Self::NetworkIssue,
            _ => Self::Default,
        }
    }

    /// User-facing message for this kind.
    pub fn message(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "Invalid request",
            Self::LoginFailed => "Login failed",
            Self::AccessDenied => "Access denied",
            Self::NotFound => "Not found",
            Self::TooManyRequests => "Too many requests",
            Self::NetworkIssue => "Network issue",
            Self::Default => "Hmmm...",
        }
    }

    /// Whether the server rejected the credentials.
    pub fn requires_reauthentication(&self) -> bool {
        matches!(self, Self::LoginFailed | Self::AccessDenied)
    }
}

/// Failure returned by the remote API or the transport underneath it
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{}", .kind.message())]
pub struct ConnectionError {
    kind: ConnectionErrorKind,
    http_status: Option<u16>,
    payload: Option<Value>,
}

impl ConnectionError {
    pub fn new(kind: ConnectionErrorKind, http_status: Option<u16>, payload: Option<Value>) -> Self {
        Self { kind, http_status, payload }
    }

    /// Build an error from a non-success HTTP status and its decoded body.
    pub fn from_status(status: u16, payload: Option<Value>) -> Self {
        Self::new(ConnectionErrorKind::from_status(status), Some(status), payload)
    }

    /// Transport-level failure (connect refused, timeout) with no status.
    pub fn network_issue(payload: Option<Value>) -> Self {
        Self::new(ConnectionErrorKind::NetworkIssue, None, payload)
    }

    pub fn kind(&self) -> ConnectionErrorKind {
        self.kind
    }

    pub fn http_status(&self) -> Option<u16> {
        self.http_status
    }

    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }

    pub fn message(&self) -> &'static str {
        self.kind.message()
    }

    /// The `code` field of the response payload, or `"UNKNOWN"`.
    pub fn code(&self) -> &str {
        self.payload
            .as_ref()
            .and_then(|payload| payload.get("code"))
            .and_then(Value::as_str)
            .unwrap_or(UNKNOWN_ERROR_CODE)
    }
}
