//! Domain types and models

pub mod search;
pub mod session;
pub mod transaction;

pub use search::{Gif, Meta, Pagination, SearchQuery, SearchResponse};
pub use session::{AuthState, Session, SessionToken};
pub use transaction::{
    HttpMethod, HttpRequest, TransactionKind, TransactionOptions, TransactionOutcome,
    TransactionRecord, TransactionStatus,
};
