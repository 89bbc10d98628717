//! In-process [`PersistedCollection`] for tests and ephemeral runs

use std::collections::HashMap;

use async_trait::async_trait;
use gifscout_domain::Result;
use parking_lot::RwLock;

use super::ports::{Persistable, PersistedCollection};

pub struct InMemoryCollection<T> {
    items: RwLock<HashMap<String, T>>,
}

impl<T> Default for InMemoryCollection<T> {
    fn default() -> Self {
        Self { items: RwLock::new(HashMap::new()) }
    }
}

impl<T: Persistable> InMemoryCollection<T> {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl<T: Persistable> PersistedCollection<T> for InMemoryCollection<T> {
    async fn get(&self, id: &str) -> Result<Option<T>> {
        Ok(self.items.read().get(id).cloned())
    }

    async fn put(&self, item: &T) -> Result<()> {
        self.items.write().insert(item.id().to_string(), item.clone());
        Ok(())
    }

    async fn bulk_get(&self, ids: &[String]) -> Result<Vec<Option<T>>> {
        let items = self.items.read();
        Ok(ids.iter().map(|id| items.get(id).cloned()).collect())
    }

    async fn bulk_put(&self, items: &[T]) -> Result<()> {
        let mut stored = self.items.write();
        for item in items {
            stored.insert(item.id().to_string(), item.clone());
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.items.write().remove(id);
        Ok(())
    }

    async fn bulk_delete(&self, ids: &[String]) -> Result<()> {
        let mut stored = self.items.write();
        for id in ids {
            stored.remove(id);
        }
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.items.read().len())
    }

    async fn all(&self) -> Result<Vec<T>> {
        let mut items: Vec<T> = self.items.read().values().cloned().collect();
        items.sort_by(|a, b| self.compare(a, b));
        Ok(items)
    }
}
