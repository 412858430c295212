use async_trait::async_trait;
use serde_json::Value;
use sqlx::{types::Json, PgPool};

use super::{into_object, DocumentStore, StoreError};

/// Documents kept as JSONB rows in the `documents` table.
#[derive(Clone)]
pub struct PgDocumentStore {
    db: PgPool,
}

impl PgDocumentStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Value>, StoreError> {
        let row = sqlx::query_as::<_, (Json<Value>,)>(
            r#"
            SELECT body
            FROM documents
            WHERE collection = $1 AND key = $2
            "#,
        )
        .bind(collection)
        .bind(key)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(|(Json(body),)| body))
    }

    async fn set(&self, collection: &str, key: &str, doc: Value) -> Result<(), StoreError> {
        let doc = Value::Object(into_object(doc)?);
        sqlx::query(
            r#"
            INSERT INTO documents (collection, key, body)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, key)
            DO UPDATE SET body = EXCLUDED.body, updated_at = now()
            "#,
        )
        .bind(collection)
        .bind(key)
        .bind(Json(doc))
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn update(&self, collection: &str, key: &str, partial: Value) -> Result<(), StoreError> {
        let partial = Value::Object(into_object(partial)?);
        // jsonb || merges top-level keys, right side wins
        let res = sqlx::query(
            r#"
            UPDATE documents
               SET body = body || $3, updated_at = now()
             WHERE collection = $1 AND key = $2
            "#,
        )
        .bind(collection)
        .bind(key)
        .bind(Json(partial))
        .execute(&self.db)
        .await?;

        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                collection: collection.to_string(),
                key: key.to_string(),
            });
        }
        Ok(())
    }

    async fn exists(&self, collection: &str, key: &str) -> Result<bool, StoreError> {
        let (found,) = sqlx::query_as::<_, (bool,)>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM documents WHERE collection = $1 AND key = $2
            )
            "#,
        )
        .bind(collection)
        .bind(key)
        .fetch_one(&self.db)
        .await?;
        Ok(found)
    }
}
