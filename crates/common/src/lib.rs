//! Modular common utilities shared across GifScout crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: shared error types and classification
//! - `runtime`: async infrastructure (resilience)
//! - `observability`: tracing integration (pulled in by `runtime`)

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod error;

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod resilience;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "foundation")]
pub use error::{CommonError, ErrorClassification, ErrorSeverity};
#[cfg(feature = "runtime")]
pub use resilience::backoff::{
    Backoff, BackoffError, BackoffEvent, BackoffEventKind, BackoffOptions, BackoffOutcome,
    BackoffResult, ExponentialBackoffStrategy,
};
