//! Application context - dependency injection container

use std::sync::Arc;

use anyhow::Context as _;
use gifscout_core::Transport;
use gifscout_domain::Config;
use gifscout_infra::{ApiClient, DbManager, SearchGifClient, SqliteTransactionRepository};
use tracing::info;

/// Everything a command needs, wired from one [`Config`]
pub struct AppContext {
    pub config: Config,
    pub transport: Transport,
    pub search: SearchGifClient,
}

impl AppContext {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        config.validate().context("invalid configuration")?;

        let db = Arc::new(
            DbManager::from_config(&config.storage).context("failed to open transaction store")?,
        );
        db.health_check().context("transaction store health check failed")?;

        let client = ApiClient::from_config(&config).context("failed to build API client")?;
        let repository = Arc::new(SqliteTransactionRepository::new(Arc::clone(&db)));
        let transport = Transport::new(Arc::new(client), repository);
        let search = SearchGifClient::from_config(transport.clone(), &config.api);

        info!(db_path = %db.path().display(), "application context ready");
        Ok(Self { config, transport, search })
    }

    /// Requeue transactions left unfinished by a previous run.
    pub async fn resume(&self) -> anyhow::Result<usize> {
        let resumed = self.transport.resume().await.context("failed to resume transactions")?;
        Ok(resumed.len())
    }

    pub async fn shutdown(&self) {
        self.transport.shutdown().await;
    }
}
