//! Shared test helpers for `gifscout-core` integration tests.

pub mod executors;
