//! # GifScout Core
//!
//! Request lifecycle logic - no infrastructure dependencies.
//!
//! This crate contains:
//! - The live [`Transaction`] with its settle-once waiters
//! - The [`Transport`] queue that persists, runs and replays transactions
//! - Port interfaces for request execution and durable collections
//!
//! ## Architecture Principles
//! - Depends only on `gifscout-domain`
//! - No database or HTTP code
//! - All external dependencies via traits

pub mod collection;
pub mod transaction;
pub mod transport;

pub use collection::{InMemoryCollection, Persistable, PersistedCollection};
pub use transaction::{Payload, Transaction, TransactionResult};
pub use transport::ports::RequestExecutor;
pub use transport::Transport;
