// Typed events emitted by the backoff controller
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use super::error::BackoffError;

/// Names under which listeners can be registered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackoffEventKind {
    /// The pending wait elapsed.
    Ready,
    /// A wait was scheduled.
    Backoff,
    /// The retry budget is spent.
    Fail,
}

impl BackoffEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::Backoff => "backoff",
            Self::Fail => "fail",
        }
    }
}

impl fmt::Display for BackoffEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackoffEventKind {
    type Err = BackoffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ready" => Ok(Self::Ready),
            "backoff" => Ok(Self::Backoff),
            "fail" => Ok(Self::Fail),
            other => Err(BackoffError::UnsupportedEvent(other.to_string())),
        }
    }
}

/// Event payloads, parameterised over the error that triggered the retry
#[derive(Debug, Clone, PartialEq)]
pub enum BackoffEvent<E> {
    Ready { attempt: u32 },
    Backoff { attempt: u32, delay: Duration, error: Option<E> },
    Fail { error: Option<E> },
}

impl<E> BackoffEvent<E> {
    pub fn kind(&self) -> BackoffEventKind {
        match self {
            Self::Ready { .. } => BackoffEventKind::Ready,
            Self::Backoff { .. } => BackoffEventKind::Backoff,
            Self::Fail { .. } => BackoffEventKind::Fail,
        }
    }
}
