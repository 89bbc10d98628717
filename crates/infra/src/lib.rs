//! # GifScout Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - The HTTP request executor with shared backoff and session refresh
//! - SQLite persistence for transaction records
//! - Configuration loading and logging bootstrap
//! - The GIF search client
//!
//! ## Architecture
//! - Implements traits defined in `gifscout-core`
//! - Depends on `gifscout-common` for the backoff controller
//! - Contains all "impure" code (network, disk)

pub mod config;
pub mod database;
pub mod errors;
pub mod http;
pub mod observability;
pub mod search;

// Re-export commonly used items
pub use database::{DbManager, SqliteTransactionRepository};
pub use errors::InfraError;
pub use http::{ApiClient, ApiClientConfig, RefreshFn, SessionRefresher};
pub use search::SearchGifClient;
