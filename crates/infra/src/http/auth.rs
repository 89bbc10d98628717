//! Session refresh hook

use std::future::Future;

use async_trait::async_trait;
use gifscout_domain::{Result, SessionToken};

/// Obtains a fresh token after the server rejected the current one
///
/// Returning a `GifScoutError::Connection` ends the session; any other error
/// keeps the client reauthenticating and schedules another attempt.
#[async_trait]
pub trait SessionRefresher: Send + Sync {
    async fn refresh(&self) -> Result<SessionToken>;
}

/// [`SessionRefresher`] backed by an async closure.
pub struct RefreshFn<F>(F);

impl<F, Fut> RefreshFn<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<SessionToken>> + Send,
{
    pub fn new(refresh: F) -> Self {
        Self(refresh)
    }
}

#[async_trait]
impl<F, Fut> SessionRefresher for RefreshFn<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<SessionToken>> + Send,
{
    async fn refresh(&self) -> Result<SessionToken> {
        (self.0)().await
    }
}
