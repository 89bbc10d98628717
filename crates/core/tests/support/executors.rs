use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use gifscout_core::RequestExecutor;
use gifscout_domain::{GifScoutError, HttpRequest, Result as DomainResult};
use parking_lot::Mutex;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

/// Replays a fixed list of outcomes, one per call, after `latency`.
///
/// Once the script runs out every call answers `Value::Null`.
#[derive(Clone, Default)]
pub struct ScriptedExecutor {
    script: Arc<Mutex<VecDeque<DomainResult<Value>>>>,
    calls: Arc<AtomicU32>,
    latency: Duration,
}

impl ScriptedExecutor {
    pub fn new(script: Vec<DomainResult<Value>>) -> Self {
        Self { script: Arc::new(Mutex::new(script.into())), ..Self::default() }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RequestExecutor for ScriptedExecutor {
    async fn perform(&self, _request: &HttpRequest, cancel: &CancellationToken) -> DomainResult<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::select! {
            _ = cancel.cancelled() => return Err(GifScoutError::Cancelled),
            _ = tokio::time::sleep(self.latency) => {}
        }
        self.script.lock().pop_front().unwrap_or(Ok(Value::Null))
    }
}

/// Never answers; only cancellation ends a call.
pub struct HangingExecutor;

#[async_trait]
impl RequestExecutor for HangingExecutor {
    async fn perform(&self, _request: &HttpRequest, cancel: &CancellationToken) -> DomainResult<Value> {
        cancel.cancelled().await;
        Err(GifScoutError::Cancelled)
    }
}
