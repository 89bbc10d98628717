#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use gifscout_common::{BackoffEventKind, BackoffOptions};
use gifscout_infra::database::{DbManager, SqliteTransactionRepository};
use gifscout_infra::http::{ApiClient, ApiClientConfig};
use tempfile::TempDir;

/// Temporary database wrapper that keeps the underlying file alive for the
/// duration of a test run.
pub struct TestDatabase {
    pub manager: Arc<DbManager>,
    _temp_dir: TempDir,
}

impl TestDatabase {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let manager =
            DbManager::new(temp_dir.path().join("test.db"), 4).expect("db manager should be created");
        manager.run_migrations().expect("migrations should run");

        Self { manager: Arc::new(manager), _temp_dir: temp_dir }
    }

    pub fn repository(&self) -> Arc<SqliteTransactionRepository> {
        Arc::new(SqliteTransactionRepository::new(Arc::clone(&self.manager)))
    }
}

/// Client with millisecond backoff so retry tests stay fast.
pub fn fast_client(max_retries: Option<u32>) -> ApiClient {
    let config = ApiClientConfig::default()
        .with_backoff(
            BackoffOptions::default()
                .with_initial_delay(Duration::from_millis(5))
                .with_max_delay(Duration::from_millis(40)),
        )
        .with_max_retries(max_retries);
    ApiClient::new(config).expect("client should build")
}

/// Counts backoff events emitted by a client's shared controller.
#[derive(Clone, Default)]
pub struct EventCounter {
    backoff: Arc<AtomicU32>,
    ready: Arc<AtomicU32>,
    fail: Arc<AtomicU32>,
}

impl EventCounter {
    pub fn attach(client: &ApiClient) -> Self {
        let counter = Self::default();
        for (kind, slot) in [
            (BackoffEventKind::Backoff, &counter.backoff),
            (BackoffEventKind::Ready, &counter.ready),
            (BackoffEventKind::Fail, &counter.fail),
        ] {
            let slot = Arc::clone(slot);
            client.backoff().on(kind, move |_| {
                slot.fetch_add(1, Ordering::SeqCst);
            });
        }
        counter
    }

    pub fn backoff(&self) -> u32 {
        self.backoff.load(Ordering::SeqCst)
    }

    pub fn ready(&self) -> u32 {
        self.ready.load(Ordering::SeqCst)
    }

    pub fn fail(&self) -> u32 {
        self.fail.load(Ordering::SeqCst)
    }
}
