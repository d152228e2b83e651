//! SQLite key-value store implementation.
//!
//! Implements `KvStore` from `rowhook-core` using sqlx with split read/write pools.
//! Values are stored as JSON text and deserialized on read.

use chrono::Utc;
use rowhook_core::repository::kv_store::KvStore;
use rowhook_types::error::RepositoryError;
use sqlx::Row;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `KvStore`.
pub struct SqliteKvStore {
    pool: DatabasePool,
}

impl SqliteKvStore {
    /// Create a new KV store backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

impl KvStore for SqliteKvStore {
    async fn get(
        &self,
        trigger: &str,
        key: &str,
    ) -> Result<Option<serde_json::Value>, RepositoryError> {
        let row = sqlx::query("SELECT value FROM trigger_kv_store WHERE trigger_name = ? AND key = ?")
            .bind(trigger)
            .bind(key)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(storage_error)?;

        match row {
            Some(row) => {
                let value_str: String = row
                    .try_get("value")
                    .map_err(storage_error)?;
                let value: serde_json::Value = serde_json::from_str(&value_str)
                    .map_err(|e| RepositoryError::Query(format!("invalid JSON value: {e}")))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    async fn set(
        &self,
        trigger: &str,
        key: &str,
        value: &serde_json::Value,
    ) -> Result<(), RepositoryError> {
        let now = Utc::now().to_rfc3339();
        let value_str = serde_json::to_string(value)
            .map_err(|e| RepositoryError::Query(format!("failed to serialize value: {e}")))?;

        sqlx::query(
            r#"INSERT INTO trigger_kv_store (trigger_name, key, value, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?)
               ON CONFLICT (trigger_name, key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at"#,
        )
        .bind(trigger)
        .bind(key)
        .bind(&value_str)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool.writer)
        .await
        .map_err(storage_error)?;

        Ok(())
    }

    async fn delete(&self, trigger: &str, key: &str) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM trigger_kv_store WHERE trigger_name = ? AND key = ?")
            .bind(trigger)
            .bind(key)
            .execute(&self.pool.writer)
            .await
            .map_err(storage_error)?;

        Ok(())
    }
}

/// Split sqlx failures into "database unreachable" and "query failed".
fn storage_error(e: sqlx::Error) -> RepositoryError {
    match e {
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_) => RepositoryError::Connection(e.to_string()),
        other => RepositoryError::Query(other.to_string()),
    }
}
