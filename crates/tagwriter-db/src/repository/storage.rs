//! # App Storage Repository
//!
//! Key/value access to the `app_storage` table. Values are opaque strings;
//! callers decide the encoding (the snapshot store writes JSON).
//!
//! ```text
//! ┌──────────────────┬───────────────────────────────┬──────────────────────┐
//! │ key (PK)         │ value                         │ updated_at           │
//! ├──────────────────┼───────────────────────────────┼──────────────────────┤
//! │ saved_nfc_tags   │ [{"id":"…","name":"Menu",…}]  │ 2026-10-16T09:12:03Z │
//! │ tier_state       │ {"is_premium":false,…}        │ 2026-10-16T09:12:03Z │
//! └──────────────────┴───────────────────────────────┴──────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;

const UPSERT: &str = r#"
    INSERT INTO app_storage (key, value, updated_at)
    VALUES (?1, ?2, ?3)
    ON CONFLICT(key) DO UPDATE SET
        value = excluded.value,
        updated_at = excluded.updated_at
"#;

#[derive(Debug, Clone)]
pub struct StorageRepository {
    pool: SqlitePool,
}

impl StorageRepository {
    pub fn new(pool: SqlitePool) -> Self {
        StorageRepository { pool }
    }

    /// Reads the value stored under `key`, if any.
    pub async fn get(&self, key: &str) -> DbResult<Option<String>> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM app_storage WHERE key = ?1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        Ok(value)
    }

    /// Writes several values in one transaction. Either all land or none do.
    pub async fn put_many(&self, entries: &[(&str, String)]) -> DbResult<()> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        for (key, value) in entries {
            debug!(key = %key, bytes = value.len(), "Writing storage key");
            sqlx::query(UPSERT)
                .bind(*key)
                .bind(value)
                .bind(now)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
