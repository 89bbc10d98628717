//! Transaction queue
//!
//! [`Transport`] persists each queued transaction, runs it against the
//! request executor and writes the completed record back. Work is spawned
//! on a [`TaskTracker`] so [`Transport::shutdown`] can drain it.

pub mod ports;

use std::future::Future;
use std::sync::Arc;

use gifscout_domain::{GifScoutError, Result, TransactionRecord, TransactionStatus};
use serde_json::Value;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, instrument, warn};

use crate::collection::PersistedCollection;
use crate::transaction::{requeue_record, Payload, Transaction, TransactionResult};
use ports::RequestExecutor;

#[derive(Clone)]
pub struct Transport {
    executor: Arc<dyn RequestExecutor>,
    transactions: Arc<dyn PersistedCollection<TransactionRecord>>,
    tracker: TaskTracker,
}

impl Transport {
    pub fn new(
        executor: Arc<dyn RequestExecutor>,
        transactions: Arc<dyn PersistedCollection<TransactionRecord>>,
    ) -> Self {
        Self { executor, transactions, tracker: TaskTracker::new() }
    }

    pub fn executor(&self) -> &Arc<dyn RequestExecutor> {
        &self.executor
    }

    /// Schedule `transaction` and return its outcome future.
    ///
    /// Must be called from within a tokio runtime.
    pub fn queue<T: Payload>(
        &self,
        transaction: Arc<Transaction<T>>,
    ) -> impl Future<Output = TransactionResult<T>> + Send + 'static {
        let promise = transaction.promise();
        let transport = self.clone();
        self.tracker.spawn(async move {
            transport.drive(transaction).await;
        });
        promise
    }

    #[instrument(skip_all, fields(transaction_id = %transaction.id()))]
    async fn drive<T: Payload>(&self, transaction: Arc<Transaction<T>>) {
        if !transaction.is_pending() {
            warn!(status = %transaction.status(), "transaction is not queued, skipping");
            return;
        }

        if let Err(error) = self.persist(&transaction).await {
            warn!(error = %error, "failed to persist queued transaction");
            let _ = transaction.reject(GifScoutError::Storage(format!(
                "Failed to persist transaction: {error}"
            )));
            return;
        }

        match transaction.run(self.executor.as_ref()).await {
            Ok(_) => debug!("transaction fulfilled"),
            Err(error) => debug!(error = %error, "transaction rejected"),
        }

        if let Err(error) = self.persist(&transaction).await {
            warn!(error = %error, "failed to persist completed transaction");
        }
    }

    async fn persist<T: Payload>(&self, transaction: &Transaction<T>) -> Result<()> {
        let record = transaction.to_record()?;
        self.transactions.put(&record).await
    }

    /// Every stored record, oldest first.
    pub async fn list(&self) -> Result<Vec<TransactionRecord>> {
        self.transactions.all().await
    }

    /// Stored records that have not completed, oldest first.
    pub async fn pending(&self) -> Result<Vec<TransactionRecord>> {
        let records = self.transactions.all().await?;
        Ok(records.into_iter().filter(|record| !record.is_completed()).collect())
    }

    /// Queue every unfinished record again.
    ///
    /// Records interrupted mid-run are restarted from `queued`. Records that
    /// fail to restore are logged and skipped.
    pub async fn resume(&self) -> Result<Vec<Arc<Transaction<Value>>>> {
        let records = self.pending().await?;
        let mut resumed = Vec::with_capacity(records.len());

        for record in records {
            let id = record.id.clone();
            let transaction = match Transaction::<Value>::from_record(requeue_record(record)) {
                Ok(transaction) => Arc::new(transaction),
                Err(error) => {
                    warn!(transaction_id = %id, error = %error, "skipping unrestorable record");
                    continue;
                }
            };
            // The caller observes outcomes through the returned handles.
            drop(self.queue(Arc::clone(&transaction)));
            resumed.push(transaction);
        }

        if !resumed.is_empty() {
            info!(count = resumed.len(), "resumed unfinished transactions");
        }
        Ok(resumed)
    }

    /// Delete completed records. Returns how many were removed.
    pub async fn purge_completed(&self) -> Result<usize> {
        let completed: Vec<String> = self
            .transactions
            .all()
            .await?
            .into_iter()
            .filter(|record| record.status == TransactionStatus::Completed)
            .map(|record| record.id)
            .collect();

        if !completed.is_empty() {
            self.transactions.bulk_delete(&completed).await?;
            info!(count = completed.len(), "purged completed transactions");
        }
        Ok(completed.len())
    }

    /// Stop accepting tracked work and wait for in-flight transactions.
    pub async fn shutdown(&self) {
        self.tracker.close();
        self.tracker.wait().await;
    }
}
