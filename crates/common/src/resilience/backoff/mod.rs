//! Exponential backoff with a shared, event-emitting controller
//!
//! [`ExponentialBackoffStrategy`] produces the delay sequence.
//! [`Backoff`] owns a strategy plus a retry counter and arms at most one
//! timer at a time, announcing progress through typed [`BackoffEvent`]s.

pub mod constants;
pub mod controller;
pub mod error;
pub mod events;
pub mod strategy;

pub use controller::{Backoff, BackoffOutcome};
pub use error::{BackoffError, BackoffResult};
pub use events::{BackoffEvent, BackoffEventKind};
pub use strategy::{BackoffOptions, ExponentialBackoffStrategy};
