//! Keyed JSON document storage.
//!
//! Documents live under a `(collection, key)` pair. `update` is a shallow
//! top-level merge and refuses to create missing documents; callers that
//! want upsert semantics check `exists` first.

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::errors::TransportError;

mod memory;
mod postgres;

pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("document {collection}/{key} not found")]
    NotFound { collection: String, key: String },

    #[error("document body must be a JSON object")]
    NotAnObject,

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Transport(TransportError::Database(e))
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Value>, StoreError>;
    async fn set(&self, collection: &str, key: &str, doc: Value) -> Result<(), StoreError>;
    async fn update(&self, collection: &str, key: &str, partial: Value) -> Result<(), StoreError>;
    async fn exists(&self, collection: &str, key: &str) -> Result<bool, StoreError>;
}

pub(crate) fn into_object(value: Value) -> Result<Map<String, Value>, StoreError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(StoreError::NotAnObject),
    }
}
