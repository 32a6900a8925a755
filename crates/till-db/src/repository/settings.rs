//! # Settings Repository
//!
//! Key/value flags. Currently one key: `maintenance_mode`.
//!
//! The schema migration seeds the flag row as `false`, so a fresh database is
//! never in maintenance and reading the flag never writes.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;

pub const MAINTENANCE_KEY: &str = "maintenance_mode";

#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SettingsRepository { pool }
    }

    /// Reads the maintenance flag. A missing row reads as `false`.
    pub async fn maintenance_mode(&self) -> DbResult<bool> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM settings WHERE key = ?1")
                .bind(MAINTENANCE_KEY)
                .fetch_optional(&self.pool)
                .await?;

        let active = value.as_deref() == Some("true");
        debug!(active, "Read maintenance flag");
        Ok(active)
    }

    pub async fn set_maintenance_mode(&self, active: bool) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(MAINTENANCE_KEY)
        .bind(if active { "true" } else { "false" })
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        info!(active, "Maintenance flag updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};

    use super::MAINTENANCE_KEY;

    #[tokio::test]
    async fn test_flag_is_seeded_false() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let value: String = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?1")
            .bind(MAINTENANCE_KEY)
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(value, "false");
        assert!(!db.settings().maintenance_mode().await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_row_reads_false() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        sqlx::query("DELETE FROM settings")
            .execute(db.pool())
            .await
            .unwrap();

        assert!(!db.settings().maintenance_mode().await.unwrap());
    }

    #[tokio::test]
    async fn test_set_and_clear() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let settings = db.settings();

        settings.set_maintenance_mode(true).await.unwrap();
        assert!(settings.maintenance_mode().await.unwrap());

        settings.set_maintenance_mode(false).await.unwrap();
        assert!(!settings.maintenance_mode().await.unwrap());
    }
}
