//! # GifScout Domain
//!
//! Domain types and models for GifScout.
//!
//! This crate contains:
//! - Domain error types and the connection error taxonomy
//! - Session, transaction record and search payload types
//! - Configuration structures
//! - The query-string codec and object id generator
//!
//! ## Architecture
//! - No dependencies on other GifScout crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
pub use utils::object_id::ObjectId;
pub use utils::query_string::{from_query_string, to_query_string, QueryObject, QueryValue};
