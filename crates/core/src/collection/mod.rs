//! Durable key-value collections

pub mod memory;
pub mod ports;

pub use memory::InMemoryCollection;
pub use ports::{Persistable, PersistedCollection};
