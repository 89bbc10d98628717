//! Request execution port

use async_trait::async_trait;
use gifscout_domain::{HttpRequest, Result};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

/// Performs one HTTP request and returns the decoded JSON body
///
/// Implementations retry connection failures internally and return
/// `GifScoutError::Cancelled` once `cancel` trips.
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    async fn perform(&self, request: &HttpRequest, cancel: &CancellationToken) -> Result<Value>;
}
