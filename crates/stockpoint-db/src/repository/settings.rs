//! # Settings Repository
//!
//! Key/value settings: business identity for receipts and the register's
//! PIN state.
//!
//! ```text
//! settings
//! ┌──────────────────────┬──────────────────────────────┐
//! │ key                  │ value                        │
//! ├──────────────────────┼──────────────────────────────┤
//! │ business_name        │ Corner Shop                  │
//! │ business_address     │ 1 High St                    │
//! │ pin_hash             │ $argon2id$v=19$...           │
//! │ pin_failed_attempts  │ 2                            │
//! │ pin_locked_until     │ 2026-01-31T10:15:00Z         │
//! └──────────────────────┴──────────────────────────────┘
//! ```

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use stockpoint_core::{BusinessSnapshot, SettingsProvider, StoreResult};

/// Well-known setting keys.
pub mod keys {
    pub const BUSINESS_NAME: &str = "business_name";
    pub const BUSINESS_ADDRESS: &str = "business_address";
    pub const PIN_HASH: &str = "pin_hash";
    pub const PIN_FAILED_ATTEMPTS: &str = "pin_failed_attempts";
    pub const PIN_LOCKED_UNTIL: &str = "pin_locked_until";

    /// Keys an operator may change through `settings set`.
    pub const EDITABLE: &[&str] = &[BUSINESS_NAME, BUSINESS_ADDRESS];
}

/// Repository for the `settings` table.
///
/// Unset business fields fall back to `defaults`, normally taken from the
/// register's configuration.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
    defaults: BusinessSnapshot,
}

impl SettingsRepository {
    /// Creates a new SettingsRepository with empty business defaults.
    pub fn new(pool: SqlitePool) -> Self {
        SettingsRepository {
            pool,
            defaults: BusinessSnapshot::default(),
        }
    }

    /// Sets the snapshot used when a business field is not stored.
    pub fn with_business_defaults(mut self, defaults: BusinessSnapshot) -> Self {
        self.defaults = defaults;
        self
    }

    /// Reads a setting.
    pub async fn get(&self, key: &str) -> DbResult<Option<String>> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(value)
    }

    /// Reads an integer setting; missing means `None`.
    pub async fn get_i64(&self, key: &str) -> DbResult<Option<i64>> {
        match self.get(key).await? {
            Some(raw) => raw
                .parse::<i64>()
                .map(Some)
                .map_err(|e| DbError::Corrupt(format!("setting {key}: {e}"))),
            None => Ok(None),
        }
    }

    /// Inserts or replaces a setting.
    pub async fn set(&self, key: &str, value: &str) -> DbResult<()> {
        debug!(key = %key, "Writing setting");

        sqlx::query(
            r#"
            INSERT INTO settings (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Removes a setting. Removing a missing key is not an error.
    pub async fn remove(&self, key: &str) -> DbResult<()> {
        sqlx::query("DELETE FROM settings WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Atomically adds one to an integer setting and returns the new value.
    pub async fn increment_counter(&self, key: &str) -> DbResult<i64> {
        let value: String = sqlx::query_scalar(
            r#"
            INSERT INTO settings (key, value, updated_at)
            VALUES (?1, '1', ?2)
            ON CONFLICT (key) DO UPDATE SET
                value = CAST(CAST(value AS INTEGER) + 1 AS TEXT),
                updated_at = excluded.updated_at
            RETURNING value
            "#,
        )
        .bind(key)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        value
            .parse::<i64>()
            .map_err(|e| DbError::Corrupt(format!("setting {key}: {e}")))
    }

    /// All settings sorted by key. Secret keys are left out.
    pub async fn list_public(&self) -> DbResult<Vec<(String, String)>> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            "SELECT key, value FROM settings WHERE key NOT LIKE 'pin_%' ORDER BY key",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// The business identity to stamp on the next receipt.
    pub async fn business_snapshot(&self) -> DbResult<BusinessSnapshot> {
        let name = self.get(keys::BUSINESS_NAME).await?;
        let address = self.get(keys::BUSINESS_ADDRESS).await?;

        Ok(BusinessSnapshot {
            business_name: name.unwrap_or_else(|| self.defaults.business_name.clone()),
            business_address: address.unwrap_or_else(|| self.defaults.business_address.clone()),
        })
    }
}

#[async_trait]
impl SettingsProvider for SettingsRepository {
    async fn business_snapshot(&self) -> StoreResult<BusinessSnapshot> {
        Ok(SettingsRepository::business_snapshot(self).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    async fn repo() -> SettingsRepository {
        Database::new(DbConfig::in_memory()).await.unwrap().settings()
    }

    #[tokio::test]
    async fn test_set_get_overwrite() {
        let repo = repo().await;
        assert!(repo.get(keys::BUSINESS_NAME).await.unwrap().is_none());

        repo.set(keys::BUSINESS_NAME, "Corner Shop").await.unwrap();
        repo.set(keys::BUSINESS_NAME, "Corner Shop Ltd").await.unwrap();

        assert_eq!(
            repo.get(keys::BUSINESS_NAME).await.unwrap().as_deref(),
            Some("Corner Shop Ltd")
        );

        repo.remove(keys::BUSINESS_NAME).await.unwrap();
        assert!(repo.get(keys::BUSINESS_NAME).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_snapshot_falls_back_to_defaults() {
        let repo = repo()
            .await
            .with_business_defaults(BusinessSnapshot::new("Default Shop", "Nowhere"));

        repo.set(keys::BUSINESS_ADDRESS, "1 High St").await.unwrap();
        let snapshot = repo.business_snapshot().await.unwrap();

        assert_eq!(snapshot.business_name, "Default Shop");
        assert_eq!(snapshot.business_address, "1 High St");
    }

    #[tokio::test]
    async fn test_increment_counter() {
        let repo = repo().await;

        assert_eq!(repo.increment_counter(keys::PIN_FAILED_ATTEMPTS).await.unwrap(), 1);
        assert_eq!(repo.increment_counter(keys::PIN_FAILED_ATTEMPTS).await.unwrap(), 2);
        assert_eq!(repo.get_i64(keys::PIN_FAILED_ATTEMPTS).await.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn test_list_public_hides_pin_state() {
        let repo = repo().await;
        repo.set(keys::BUSINESS_NAME, "Corner Shop").await.unwrap();
        repo.set(keys::PIN_HASH, "$argon2id$secret").await.unwrap();

        let listed = repo.list_public().await.unwrap();
        assert_eq!(
            listed,
            vec![(keys::BUSINESS_NAME.to_string(), "Corner Shop".to_string())]
        );
    }
}
