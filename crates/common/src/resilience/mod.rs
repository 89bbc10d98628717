//! Resilience patterns for transient failures
//!
//! - **Backoff**: an event-emitting exponential backoff controller shared by
//!   every request of a client. Only one wait is armed at a time; callers that
//!   fail while a wait is pending join it instead of scheduling their own.

pub mod backoff;

pub use backoff::{
    Backoff, BackoffError, BackoffEvent, BackoffEventKind, BackoffOptions, BackoffOutcome,
    BackoffResult, ExponentialBackoffStrategy,
};
