use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{into_object, DocumentStore, StoreError};

/// Process-local document store. Used by `STORAGE_BACKEND=memory` and tests.
#[derive(Default)]
pub struct MemoryDocumentStore {
    docs: RwLock<HashMap<(String, String), Value>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn slot(collection: &str, key: &str) -> (String, String) {
    (collection.to_string(), key.to_string())
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.docs.read().await.get(&slot(collection, key)).cloned())
    }

    async fn set(&self, collection: &str, key: &str, doc: Value) -> Result<(), StoreError> {
        let doc = Value::Object(into_object(doc)?);
        self.docs.write().await.insert(slot(collection, key), doc);
        Ok(())
    }

    async fn update(&self, collection: &str, key: &str, partial: Value) -> Result<(), StoreError> {
        let partial = into_object(partial)?;
        let mut docs = self.docs.write().await;
        let existing = docs
            .get_mut(&slot(collection, key))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                key: key.to_string(),
            })?;
        if let Value::Object(body) = existing {
            body.extend(partial);
        }
        Ok(())
    }

    async fn exists(&self, collection: &str, key: &str) -> Result<bool, StoreError> {
        Ok(self.docs.read().await.contains_key(&slot(collection, key)))
    }
}
