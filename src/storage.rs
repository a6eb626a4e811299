use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use anyhow::Context;
use axum::async_trait;
use sqlx::PgPool;

/// Blob persistence capability: JSON-encoded strings under string keys.
/// Everything the tracker persists goes through this trait so tests can
/// swap in [`MemoryBlobStore`].
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;
    async fn remove(&self, key: &str) -> anyhow::Result<()>;
}

/// Postgres-backed store over a single `blobs` key/value table.
#[derive(Clone)]
pub struct PgBlobStore {
    db: PgPool,
}

impl PgBlobStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BlobStore for PgBlobStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let row: Option<(String,)> =
            sqlx::query_as(r#"SELECT value FROM blobs WHERE key = $1"#)
                .bind(key)
                .fetch_optional(&self.db)
                .await
                .context("blobs select")?;
        Ok(row.map(|(value,)| value))
    }

    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO blobs (key, value, updated_at)
            VALUES ($1, $2, now())
            ON CONFLICT (key) DO UPDATE SET value = $2, updated_at = now()
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.db)
        .await
        .context("blobs upsert")?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> anyhow::Result<()> {
        sqlx::query(r#"DELETE FROM blobs WHERE key = $1"#)
            .bind(key)
            .execute(&self.db)
            .await
            .context("blobs delete")?;
        Ok(())
    }
}

/// In-memory store backing `AppState::fake` and the unit tests.
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, String>>,
}

impl MemoryBlobStore {
    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.blobs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> anyhow::Result<()> {
        self.lock().remove(key);
        Ok(())
    }
}
