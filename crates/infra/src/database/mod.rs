//! Database implementations

pub mod manager;
pub mod transaction_repository;

pub use manager::{DbManager, SqliteConnection};
pub use transaction_repository::SqliteTransactionRepository;
