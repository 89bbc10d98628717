//! Live transactions: one request, settled exactly once
//!
//! A [`Transaction`] owns the request description, its lifecycle status and
//! the list of callers waiting on its outcome. `fulfill` and `reject` are the
//! only ways to complete it; each waiter receives the outcome exactly once and
//! later callers of [`Transaction::promise`] get the stored outcome directly.

use std::future::Future;

use chrono::Utc;
use gifscout_domain::{
    GifScoutError, HttpRequest, ObjectId, TransactionKind, TransactionOptions,
    TransactionOutcome, TransactionRecord, TransactionStatus,
};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use crate::transport::ports::RequestExecutor;

/// Values a transaction can resolve to
pub trait Payload: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {}

impl<T> Payload for T where T: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {}

pub type TransactionResult<T> = Result<T, GifScoutError>;

type Waiter<T> = oneshot::Sender<TransactionResult<T>>;

pub struct Transaction<T> {
    id: String,
    created_at: i64,
    request: TransactionKind,
    options: TransactionOptions,
    cancel: CancellationToken,
    state: Mutex<TransactionState<T>>,
}

struct TransactionState<T> {
    status: TransactionStatus,
    outcome: Option<TransactionResult<T>>,
    waiters: Vec<Waiter<T>>,
}

impl<T: Clone> TransactionState<T> {
    fn outcome(&self) -> Option<TransactionResult<T>> {
        if !self.status.is_completed() {
            return None;
        }
        Some(self.outcome.clone().unwrap_or_else(|| {
            Err(GifScoutError::InvalidState("completed without an outcome".into()))
        }))
    }
}

impl<T> std::fmt::Debug for Transaction<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transaction")
            .field("id", &self.id)
            .field("type", &self.request.type_name())
            .field("status", &self.state.lock().status)
            .field("created_at", &self.created_at)
            .finish()
    }
}

impl<T: Payload> Transaction<T> {
    pub fn new(request: TransactionKind, options: TransactionOptions) -> Self {
        Self {
            id: ObjectId::new().to_string(),
            created_at: Utc::now().timestamp_millis(),
            request,
            options,
            cancel: CancellationToken::new(),
            state: Mutex::new(TransactionState {
                status: TransactionStatus::Queued,
                outcome: None,
                waiters: Vec::new(),
            }),
        }
    }

    /// HTTP transaction with default options.
    pub fn http(request: HttpRequest) -> Self {
        Self::new(TransactionKind::Http(request), TransactionOptions::default())
    }

    pub fn with_options(mut self, options: TransactionOptions) -> Self {
        self.options = options;
        self
    }

    /// Tie the transaction to an external cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    pub fn request(&self) -> &TransactionKind {
        &self.request
    }

    pub fn options(&self) -> &TransactionOptions {
        &self.options
    }

    pub fn status(&self) -> TransactionStatus {
        self.state.lock().status
    }

    /// Still waiting to be run.
    pub fn is_pending(&self) -> bool {
        self.status() == TransactionStatus::Queued
    }

    pub fn response(&self) -> Option<T> {
        self.state.lock().outcome.as_ref().and_then(|outcome| outcome.as_ref().ok().cloned())
    }

    pub fn error(&self) -> Option<GifScoutError> {
        self.state.lock().outcome.as_ref().and_then(|outcome| outcome.as_ref().err().cloned())
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Future resolving to the outcome. Does not borrow the transaction.
    pub fn promise(&self) -> impl Future<Output = TransactionResult<T>> + Send + 'static {
        let (tx, rx) = oneshot::channel();
        {
            let mut state = self.state.lock();
            match state.outcome() {
                Some(outcome) => {
                    let _ = tx.send(outcome);
                }
                None => state.waiters.push(tx),
            }
        }
        async move {
            rx.await.unwrap_or_else(|_| {
                Err(GifScoutError::Internal("transaction dropped before completion".into()))
            })
        }
    }

    /// Complete with `value`. Fails if already completed.
    pub fn fulfill(&self, value: T) -> TransactionResult<()> {
        self.settle(Ok(value))
    }

    /// Complete with `error`. Fails if already completed.
    pub fn reject(&self, error: GifScoutError) -> TransactionResult<()> {
        self.settle(Err(error))
    }

    fn settle(&self, outcome: TransactionResult<T>) -> TransactionResult<()> {
        let waiters = {
            let mut state = self.state.lock();
            if state.status.is_completed() {
                warn!(transaction_id = %self.id, "ignoring second settlement of completed transaction");
                return Err(GifScoutError::InvalidState(format!(
                    "transaction {} is already completed",
                    self.id
                )));
            }
            state.status = TransactionStatus::Completed;
            state.outcome = Some(outcome.clone());
            std::mem::take(&mut state.waiters)
        };

        debug!(
            transaction_id = %self.id,
            waiters = waiters.len(),
            ok = outcome.is_ok(),
            "transaction settled"
        );
        for waiter in waiters {
            let _ = waiter.send(outcome.clone());
        }
        Ok(())
    }

    /// Trip the cancellation token; an in-flight run rejects with `Cancelled`.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    fn begin(&self) -> TransactionResult<()> {
        let mut state = self.state.lock();
        if !state.status.can_transition_to(TransactionStatus::InProgress) {
            return Err(GifScoutError::InvalidState(format!(
                "transaction {} cannot run from status {}",
                self.id, state.status
            )));
        }
        state.status = TransactionStatus::InProgress;
        Ok(())
    }

    /// Execute the request and settle with its outcome.
    #[instrument(skip(self, executor), fields(transaction_id = %self.id, kind = self.request.type_name()))]
    pub async fn run(&self, executor: &dyn RequestExecutor) -> TransactionResult<T> {
        self.begin()?;

        let allowed_runs = if self.options.retry {
            self.options.retry_attempts.saturating_add(1)
        } else {
            1
        };
        let mut runs = 0_u32;

        let outcome = loop {
            runs += 1;
            let result = self.execute_once(executor).await;
            match result {
                Err(error)
                    if error.is_retryable()
                        && runs < allowed_runs
                        && !self.cancel.is_cancelled() =>
                {
                    warn!(run = runs, allowed_runs, error = %error, "transaction failed, running again");
                }
                other => break other,
            }
        };

        match outcome {
            Ok(value) => {
                self.fulfill(value.clone())?;
                Ok(value)
            }
            Err(error) => {
                self.reject(error.clone())?;
                Err(error)
            }
        }
    }

    async fn execute_once(&self, executor: &dyn RequestExecutor) -> TransactionResult<T> {
        if self.cancel.is_cancelled() {
            return Err(GifScoutError::Cancelled);
        }
        let value = match &self.request {
            TransactionKind::Http(request) => executor.perform(request, &self.cancel).await?,
        };
        serde_json::from_value(value)
            .map_err(|e| GifScoutError::Serialization(format!("Failed to decode response: {e}")))
    }

    /// Plain-data snapshot for persistence.
    pub fn to_record(&self) -> TransactionResult<TransactionRecord> {
        let state = self.state.lock();
        let outcome = match &state.outcome {
            Some(Ok(value)) => Some(TransactionOutcome::Response(serde_json::to_value(value)?)),
            Some(Err(error)) => Some(TransactionOutcome::Error(error.clone())),
            None => None,
        };
        Ok(TransactionRecord {
            id: self.id.clone(),
            status: state.status,
            request: self.request.clone(),
            options: self.options.clone(),
            outcome,
            created_at: self.created_at,
        })
    }

    /// Rebuild a transaction from a snapshot, with no waiters and a fresh token.
    pub fn from_record(record: TransactionRecord) -> TransactionResult<Self> {
        let outcome = match record.outcome {
            Some(TransactionOutcome::Response(value)) => {
                let response = serde_json::from_value::<T>(value).map_err(|e| {
                    GifScoutError::Serialization(format!("Invalid stored response: {e}"))
                })?;
                Some(Ok(response))
            }
            Some(TransactionOutcome::Error(error)) => Some(Err(error)),
            None => None,
        };
        Ok(Self {
            id: record.id,
            created_at: record.created_at,
            request: record.request,
            options: record.options,
            cancel: CancellationToken::new(),
            state: Mutex::new(TransactionState {
                status: record.status,
                outcome,
                waiters: Vec::new(),
            }),
        })
    }
}

/// Snapshot that replays as a fresh run: an interrupted `in-progress`
/// record goes back to `queued`.
pub fn requeue_record(mut record: TransactionRecord) -> TransactionRecord {
    if record.status == TransactionStatus::InProgress {
        record.status = TransactionStatus::Queued;
    }
    record
}
