//! Observability infrastructure
//!
//! Structured logging through `tracing`, with the subscriber installed by
//! [`logging::init`].

pub mod logging;

pub use logging::{init, LogFormat};
