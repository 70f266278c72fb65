//! Key-value store behind the listing, favorites and booking queries
//!
//! Values are JSON documents. `set` is last-write-wins per key; read-modify-write
//! goes through `update`, which holds the key for the whole change. There is no
//! cross-key transaction.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

/// Store failure
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Stored value under '{key}' is malformed: {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Change applied by `KvStore::update`. Receives the current value and returns
/// the value to store, or `None` to leave the key untouched.
pub type Apply<'a> =
    Box<dyn FnOnce(Option<Value>) -> Result<Option<Value>, StoreError> + Send + 'a>;

#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;

    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Read, change and write one key with no other writer in between
    async fn update(&self, key: &str, apply: Apply<'_>) -> Result<(), StoreError>;
}

/// Process-local store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn update(&self, key: &str, apply: Apply<'_>) -> Result<(), StoreError> {
        let mut entries = self.entries.write().await;
        if let Some(next) = apply(entries.get(key).cloned())? {
            entries.insert(key.to_string(), next);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_set_get_delete() {
        let store = MemoryStore::new();
        assert_eq!(store.get("missing").await.unwrap(), None);

        store.set("k", json!(["a"])).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(json!(["a"])));

        store.set("k", json!(["b"])).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(json!(["b"])));
        assert_eq!(store.len().await, 1);

        store.delete("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_update_keeps_or_replaces_value() {
        let store = MemoryStore::new();
        store.set("k", json!(1)).await.unwrap();

        store.update("k", Box::new(|_| Ok(None))).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(json!(1)));

        let increment = |current: Option<Value>| {
            Ok::<_, StoreError>(current.map(|v| json!(v.as_i64().unwrap_or(0) + 1)))
        };
        store.update("k", Box::new(increment)).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(json!(2)));

        let failed = store
            .update("k", Box::new(|_| Err(StoreError::Backend("rejected".to_string()))))
            .await;
        assert!(failed.is_err());
        assert_eq!(store.get("k").await.unwrap(), Some(json!(2)));
    }

    #[tokio::test]
    async fn test_concurrent_updates_are_not_lost() {
        let store = Arc::new(MemoryStore::new());
        let tasks: Vec<_> = (0..50)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    let append = move |current: Option<Value>| {
                        let mut items = match current {
                            Some(Value::Array(items)) => items,
                            _ => Vec::new(),
                        };
                        items.push(json!(i));
                        Ok::<_, StoreError>(Some(Value::Array(items)))
                    };
                    store.update("k", Box::new(append)).await.unwrap();
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        let value = store.get("k").await.unwrap().unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(50));
    }
}
