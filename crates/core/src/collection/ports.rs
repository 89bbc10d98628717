//! Port interfaces for persisted collections

use std::cmp::Ordering;

use async_trait::async_trait;
use gifscout_domain::{Result, TransactionRecord};

/// Items that can live in a [`PersistedCollection`]
pub trait Persistable: Clone + Send + Sync + 'static {
    fn id(&self) -> &str;

    /// Milliseconds since the Unix epoch; the default ordering key.
    fn created_at(&self) -> i64;
}

impl Persistable for TransactionRecord {
    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> i64 {
        self.created_at
    }
}

/// Durable store keyed by item id
#[async_trait]
pub trait PersistedCollection<T: Persistable>: Send + Sync {
    async fn get(&self, id: &str) -> Result<Option<T>>;

    /// Insert or replace.
    async fn put(&self, item: &T) -> Result<()>;

    /// One slot per requested id, `None` where missing.
    async fn bulk_get(&self, ids: &[String]) -> Result<Vec<Option<T>>>;

    async fn bulk_put(&self, items: &[T]) -> Result<()>;

    /// Deleting a missing id is a no-op.
    async fn delete(&self, id: &str) -> Result<()>;

    async fn bulk_delete(&self, ids: &[String]) -> Result<()>;

    async fn count(&self) -> Result<usize>;

    /// Every item, sorted with [`PersistedCollection::compare`].
    async fn all(&self) -> Result<Vec<T>>;

    /// Orders by `created_at`, then id.
    fn compare(&self, a: &T, b: &T) -> Ordering {
        a.created_at().cmp(&b.created_at()).then_with(|| a.id().cmp(b.id()))
    }
}
