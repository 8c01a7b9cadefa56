//! # Key-Value Repository
//!
//! A string-keyed store of JSON values, each carrying a version number.
//!
//! ## Versioned Writes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Compare-and-Swap                                     │
//! │                                                                         │
//! │  Writer A                         Writer B                             │
//! │  get("orders") → v3               get("orders") → v3                   │
//! │       │                                │                                │
//! │       ▼                                │                                │
//! │  cas("orders", 3, …)                   │                                │
//! │  UPDATE … WHERE version = 3            │                                │
//! │  → 1 row, now v4 ✓                     ▼                                │
//! │                                   cas("orders", 3, …)                  │
//! │                                   UPDATE … WHERE version = 3           │
//! │                                   → 0 rows → VersionConflict ✗          │
//! │                                        │                                │
//! │                                        ▼                                │
//! │                                   reload (v4), re-apply, cas(4, …) ✓   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Version `0` means "key absent": a compare-and-swap against `0` only
//! succeeds if nobody has written the key yet.

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};

/// Version reported for a key that has never been written.
pub const ABSENT_VERSION: i64 = 0;

/// A stored value together with the version it was read at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versioned<T> {
    pub value: T,
    pub version: i64,
}

/// Repository over the `kv_store` table.
#[derive(Debug, Clone)]
pub struct KvRepository {
    pool: SqlitePool,
}

impl KvRepository {
    /// Creates a new KvRepository.
    pub fn new(pool: SqlitePool) -> Self {
        KvRepository { pool }
    }

    /// Reads the raw value and version for `key`.
    pub async fn get(&self, key: &str) -> DbResult<Option<Versioned<String>>> {
        let row = sqlx::query("SELECT value, version FROM kv_store WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| Versioned {
            value: row.get("value"),
            version: row.get("version"),
        }))
    }

    /// Writes `value` unconditionally and returns the new version.
    pub async fn put(&self, key: &str, value: &str) -> DbResult<i64> {
        let now = Utc::now().to_rfc3339();

        let version: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO kv_store (key, value, version, updated_at)
            VALUES (?1, ?2, 1, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                version = kv_store.version + 1,
                updated_at = excluded.updated_at
            RETURNING version
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(&now)
        .fetch_one(&self.pool)
        .await?;

        debug!(key = %key, version, "Stored value");
        Ok(version)
    }

    /// Writes `value` only if `key` is still at `expected_version`.
    ///
    /// ## Returns
    /// * `Ok(new_version)` - the write won
    /// * `Err(DbError::VersionConflict)` - someone else wrote (or deleted)
    ///   the key since it was read
    pub async fn compare_and_swap(
        &self,
        key: &str,
        expected_version: i64,
        value: &str,
    ) -> DbResult<i64> {
        let now = Utc::now().to_rfc3339();

        let result = if expected_version == ABSENT_VERSION {
            sqlx::query(
                r#"
                INSERT INTO kv_store (key, value, version, updated_at)
                VALUES (?1, ?2, 1, ?3)
                ON CONFLICT(key) DO NOTHING
                "#,
            )
            .bind(key)
            .bind(value)
            .bind(&now)
            .execute(&self.pool)
            .await?
        } else {
            sqlx::query(
                r#"
                UPDATE kv_store SET
                    value = ?2,
                    version = version + 1,
                    updated_at = ?3
                WHERE key = ?1 AND version = ?4
                "#,
            )
            .bind(key)
            .bind(value)
            .bind(&now)
            .bind(expected_version)
            .execute(&self.pool)
            .await?
        };

        if result.rows_affected() == 0 {
            debug!(key = %key, expected_version, "Compare-and-swap lost");
            return Err(DbError::conflict(key, expected_version));
        }

        let new_version = expected_version + 1;
        debug!(key = %key, version = new_version, "Compare-and-swap stored value");
        Ok(new_version)
    }

    /// Removes `key`. Returns whether a row was deleted.
    pub async fn delete(&self, key: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM kv_store WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        debug!(key = %key, deleted = result.rows_affected(), "Deleted key");
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // JSON helpers
    // =========================================================================

    /// Reads and decodes the JSON value stored under `key`.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> DbResult<Option<Versioned<T>>> {
        match self.get(key).await? {
            Some(raw) => Ok(Some(Versioned {
                value: serde_json::from_str(&raw.value)?,
                version: raw.version,
            })),
            None => Ok(None),
        }
    }

    /// Encodes `value` as JSON and writes it unconditionally.
    pub async fn put_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> DbResult<i64> {
        let json = serde_json::to_string(value)?;
        self.put(key, &json).await
    }

    /// Encodes `value` as JSON and writes it with [`Self::compare_and_swap`].
    pub async fn compare_and_swap_json<T: Serialize + ?Sized>(
        &self,
        key: &str,
        expected_version: i64,
        value: &T,
    ) -> DbResult<i64> {
        let json = serde_json::to_string(value)?;
        self.compare_and_swap(key, expected_version, &json).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
