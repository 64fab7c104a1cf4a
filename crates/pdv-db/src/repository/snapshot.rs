//! # Snapshot Repository
//!
//! Keyed text blobs with timestamps. Knows nothing about what the payload
//! contains.

use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::error::DbResult;

/// A stored snapshot row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRecord {
    pub key: String,
    pub payload: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Repository for the `session_snapshots` table.
#[derive(Debug, Clone)]
pub struct SnapshotRepository {
    pool: SqlitePool,
}

impl SnapshotRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SnapshotRepository { pool }
    }

    /// Inserts or replaces the payload stored under `key`.
    ///
    /// `created_at` is kept from the first save; `updated_at` moves forward.
    pub async fn save(&self, key: &str, payload: &str) -> DbResult<()> {
        let now = Utc::now();

        debug!(key = %key, bytes = payload.len(), "Saving snapshot");

        sqlx::query(
            r#"
            INSERT INTO session_snapshots (key, payload, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?3)
            ON CONFLICT(key) DO UPDATE SET
                payload = excluded.payload,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(payload)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Returns the payload stored under `key`, if any.
    pub async fn load(&self, key: &str) -> DbResult<Option<String>> {
        let payload: Option<String> =
            sqlx::query_scalar("SELECT payload FROM session_snapshots WHERE key = ?1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        Ok(payload)
    }

    /// Returns the full row stored under `key`, if any.
    pub async fn get(&self, key: &str) -> DbResult<Option<SnapshotRecord>> {
        let row = sqlx::query(
            r#"
            SELECT key, payload, created_at, updated_at
            FROM session_snapshots
            WHERE key = ?1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        let record = match row {
            Some(row) => Some(SnapshotRecord {
                key: row.try_get("key")?,
                payload: row.try_get("payload")?,
                created_at: row.try_get("created_at")?,
                updated_at: row.try_get("updated_at")?,
            }),
            None => None,
        };

        Ok(record)
    }

    /// Deletes the snapshot under `key`. Returns whether a row was removed.
    pub async fn delete(&self, key: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM session_snapshots WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        debug!(key = %key, deleted = result.rows_affected(), "Snapshot deleted");
        Ok(result.rows_affected() > 0)
    }

    /// Lists stored keys in alphabetical order.
    pub async fn keys(&self) -> DbResult<Vec<String>> {
        let keys = sqlx::query_scalar("SELECT key FROM session_snapshots ORDER BY key")
            .fetch_all(&self.pool)
            .await?;

        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig};

    async fn repo() -> super::SnapshotRepository {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.snapshots()
    }

    #[tokio::test]
    async fn test_load_missing_key() {
        let repo = repo().await;
        assert_eq!(repo.load("pdv-store-v1").await.unwrap(), None);
        assert!(repo.get("pdv-store-v1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_then_overwrite() {
        let repo = repo().await;

        repo.save("pdv-store-v1", r#"{"offline":false}"#).await.unwrap();
        let first = repo.get("pdv-store-v1").await.unwrap().unwrap();

        repo.save("pdv-store-v1", r#"{"offline":true}"#).await.unwrap();
        let second = repo.get("pdv-store-v1").await.unwrap().unwrap();

        assert_eq!(second.payload, r#"{"offline":true}"#);
        assert_eq!(second.created_at, first.created_at);
        assert!(second.updated_at >= first.updated_at);
        assert_eq!(repo.keys().await.unwrap(), vec!["pdv-store-v1".to_string()]);
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = repo().await;
        repo.save("a", "{}").await.unwrap();

        assert!(repo.delete("a").await.unwrap());
        assert!(!repo.delete("a").await.unwrap());
        assert_eq!(repo.load("a").await.unwrap(), None);
    }
}
