//! HTTP request execution

pub mod api_client;
pub mod auth;
pub mod client;
pub mod session;

pub use api_client::{ApiClient, ApiClientConfig};
pub use auth::{RefreshFn, SessionRefresher};
pub use client::{HttpClient, HttpClientBuilder};
pub use session::SessionContext;
