//! Domain utilities

pub mod object_id;
pub mod query_string;
