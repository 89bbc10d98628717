//! SQLite-backed transaction store
//!
//! Each record is kept as JSON in `record_json`, with `created_at` and
//! `status` mirrored into columns for ordering and housekeeping.

use std::sync::Arc;

use async_trait::async_trait;
use gifscout_core::PersistedCollection;
use gifscout_domain::{GifScoutError, Result as DomainResult, TransactionRecord};
use rusqlite::{params, Connection, OptionalExtension};
use tokio::task;
use tracing::warn;

use super::manager::{map_sql_error, DbManager};

/// `PersistedCollection<TransactionRecord>` stored in the `transactions` table
pub struct SqliteTransactionRepository {
    db: Arc<DbManager>,
}

impl SqliteTransactionRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    async fn with_connection<R, F>(&self, work: F) -> DomainResult<R>
    where
        R: Send + 'static,
        F: FnOnce(&mut Connection) -> DomainResult<R> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        task::spawn_blocking(move || -> DomainResult<R> {
            let mut conn = db.get_connection()?;
            work(&mut conn)
        })
        .await
        .map_err(map_join_error)?
    }
}

#[async_trait]
impl PersistedCollection<TransactionRecord> for SqliteTransactionRepository {
    async fn get(&self, id: &str) -> DomainResult<Option<TransactionRecord>> {
        let id = id.to_string();
        self.with_connection(move |conn| select_one(conn, &id)).await
    }

    async fn put(&self, item: &TransactionRecord) -> DomainResult<()> {
        let item = item.clone();
        self.with_connection(move |conn| upsert(conn, &item)).await
    }

    async fn bulk_get(&self, ids: &[String]) -> DomainResult<Vec<Option<TransactionRecord>>> {
        let ids = ids.to_vec();
        self.with_connection(move |conn| {
            ids.iter().map(|id| select_one(conn, id)).collect::<DomainResult<Vec<_>>>()
        })
        .await
    }

    async fn bulk_put(&self, items: &[TransactionRecord]) -> DomainResult<()> {
        let items = items.to_vec();
        self.with_connection(move |conn| {
            let tx = conn.transaction().map_err(map_sql_error)?;
            for item in &items {
                upsert(&tx, item)?;
            }
            tx.commit().map_err(map_sql_error)
        })
        .await
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        let id = id.to_string();
        self.with_connection(move |conn| {
            conn.execute("DELETE FROM transactions WHERE id = ?1", params![id])
                .map(|_| ())
                .map_err(map_sql_error)
        })
        .await
    }

    async fn bulk_delete(&self, ids: &[String]) -> DomainResult<()> {
        let ids = ids.to_vec();
        self.with_connection(move |conn| {
            let tx = conn.transaction().map_err(map_sql_error)?;
            {
                let mut stmt = tx
                    .prepare("DELETE FROM transactions WHERE id = ?1")
                    .map_err(map_sql_error)?;
                for id in &ids {
                    stmt.execute(params![id]).map_err(map_sql_error)?;
                }
            }
            tx.commit().map_err(map_sql_error)
        })
        .await
    }

    async fn count(&self) -> DomainResult<usize> {
        self.with_connection(|conn| {
            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))
                .map_err(map_sql_error)?;
            usize::try_from(count)
                .map_err(|_| GifScoutError::Storage(format!("invalid row count: {count}")))
        })
        .await
    }

    /// Rows whose JSON no longer decodes are logged and left out; `get` still
    /// reports them as serialization errors.
    async fn all(&self) -> DomainResult<Vec<TransactionRecord>> {
        self.with_connection(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, record_json FROM transactions ORDER BY created_at ASC, id ASC",
                )
                .map_err(map_sql_error)?;
            let rows = stmt
                .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))
                .map_err(map_sql_error)?;

            let mut records = Vec::new();
            for row in rows {
                let (id, json) = row.map_err(map_sql_error)?;
                match decode_record(&json) {
                    Ok(record) => records.push(record),
                    Err(e) => warn!(id = %id, error = %e, "skipping unreadable transaction"),
                }
            }
            Ok(records)
        })
        .await
    }
}

fn select_one(conn: &Connection, id: &str) -> DomainResult<Option<TransactionRecord>> {
    let json: Option<String> = conn
        .query_row("SELECT record_json FROM transactions WHERE id = ?1", params![id], |row| {
            row.get(0)
        })
        .optional()
        .map_err(map_sql_error)?;
    json.as_deref().map(decode_record).transpose()
}

fn upsert(conn: &Connection, record: &TransactionRecord) -> DomainResult<()> {
    let json = serde_json::to_string(record)?;
    conn.execute(
        "INSERT INTO transactions (id, created_at, status, record_json)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(id) DO UPDATE SET
            created_at = excluded.created_at,
            status = excluded.status,
            record_json = excluded.record_json",
        params![record.id, record.created_at, record.status.as_str(), json],
    )
    .map_err(map_sql_error)?;
    Ok(())
}

fn decode_record(json: &str) -> DomainResult<TransactionRecord> {
    serde_json::from_str(json)
        .map_err(|e| GifScoutError::Serialization(format!("invalid stored transaction: {e}")))
}

fn map_join_error(err: task::JoinError) -> GifScoutError {
    GifScoutError::Internal(format!("Task join error: {err}"))
}
