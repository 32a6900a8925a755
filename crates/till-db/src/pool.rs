//! # Database Handle
//!
//! Opens the till's SQLite file and hands out repositories over one pool.
//!
//! ## Writers and Readers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SqlitePool (WAL)        up to max_connections                         │
//! │                                                                         │
//! │  Catalog read   ──► any connection, never blocked by a commit          │
//! │  Ledger stream  ──► any connection, sees the last committed snapshot   │
//! │  Commit batch   ──► one write transaction at a time                    │
//! │                     a second writer waits up to busy_timeout for the   │
//! │                     lock, then fails with SQLITE_BUSY                  │
//! │                                                                         │
//! │  CommitterConfig::store_timeout must outlast busy_timeout, see         │
//! │  CommitterConfig::covering_busy_timeout                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::good::GoodRepository;
use crate::repository::sale::SaleRepository;
use crate::repository::settings::SettingsRepository;

/// Default wait for the SQLite write lock.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(2);

// =============================================================================
// Configuration
// =============================================================================

#[derive(Debug, Clone)]
pub struct DbConfig {
    /// SQLite file, created if missing. `:memory:` for a private store.
    pub database_path: PathBuf,

    /// Default: 5. Readers share these with the single active writer.
    pub max_connections: u32,

    /// How long a writer waits for another till's write transaction.
    /// Also bounds how long a caller waits for a free pooled connection.
    /// Default: 2 seconds
    pub busy_timeout: Duration,

    /// Default: true
    pub run_migrations: bool,
}

impl DbConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
            run_migrations: true,
        }
    }

    /// Private in-memory store for tests.
    ///
    /// Each connection to `:memory:` is its own database, so the pool is
    /// pinned to one connection and concurrent commits queue on acquire.
    pub fn in_memory() -> Self {
        DbConfig {
            max_connections: 1,
            ..DbConfig::new(":memory:")
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }
}

// =============================================================================
// Database
// =============================================================================

/// Shared handle over the pool. Clones share it; the committer, the catalog
/// and the ledger each hold their own.
///
/// ## Example
/// ```rust,ignore
/// let db = Database::new(DbConfig::new("./till.db")).await?;
/// let goods = db.goods().list().await?;
/// let committer = TransactionCommitter::new(db.clone(), CommitterConfig::default());
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens (or creates) the store in WAL mode and applies migrations.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        let connect_url = format!("sqlite://{}?mode=rwc", config.database_path.display());

        let connect_options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(config.busy_timeout)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.busy_timeout)
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(
            path = %config.database_path.display(),
            max_connections = config.max_connections,
            busy_timeout_ms = config.busy_timeout.as_millis() as u64,
            "Database opened"
        );

        if config.run_migrations {
            migrations::run_migrations(&pool).await?;
        }

        Ok(Database { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn goods(&self) -> GoodRepository {
        GoodRepository::new(self.pool.clone())
    }

    pub fn sales(&self) -> SaleRepository {
        SaleRepository::new(self.pool.clone())
    }

    pub fn settings(&self) -> SettingsRepository {
        SettingsRepository::new(self.pool.clone())
    }

    /// Waits for checked-out connections to return, then closes the pool.
    /// Every later repository call fails with `ConnectionFailed`.
    pub async fn close(&self) {
        info!("Closing database");
        self.pool.close().await;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::committer::{CommitterConfig, TransactionCommitter};
    use std::path::Path;
    use till_core::{Cart, CoreError, GoodType, NewGood};

    /// Temporary database file, removed (with its WAL files) on drop.
    struct TempDb(PathBuf);

    impl TempDb {
        fn new() -> Self {
            TempDb(std::env::temp_dir().join(format!("till-{}.db", uuid::Uuid::new_v4())))
        }

        fn path(&self) -> &Path {
            &self.0
        }
    }

    impl Drop for TempDb {
        fn drop(&mut self) {
            for suffix in ["", "-wal", "-shm"] {
                let mut name = self.0.clone().into_os_string();
                name.push(suffix);
                let _ = std::fs::remove_file(name);
            }
        }
    }

    fn rice(stock: i64) -> NewGood {
        NewGood {
            product_id: "RICE-5KG".into(),
            name: "Rice 5kg".into(),
            price_cents: 4500,
            cost_cents: 3800,
            stock,
            quantity: 0,
            good_type: GoodType::Retail,
        }
    }

    #[tokio::test]
    async fn test_in_memory_database_is_migrated() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let (total, applied) = migrations::migration_status(db.pool()).await.unwrap();
        assert_eq!(total, applied);
    }

    #[tokio::test]
    async fn test_in_memory_databases_are_isolated() {
        let a = Database::new(DbConfig::in_memory()).await.unwrap();
        let b = Database::new(DbConfig::in_memory()).await.unwrap();

        a.goods().insert(&rice(5)).await.unwrap();

        assert_eq!(a.goods().count().await.unwrap(), 1);
        assert_eq!(b.goods().count().await.unwrap(), 0);
    }

    #[test]
    fn test_config_defaults() {
        let config = DbConfig::new("/tmp/till.db")
            .max_connections(8)
            .busy_timeout(Duration::from_millis(250))
            .run_migrations(false);

        assert_eq!(config.max_connections, 8);
        assert_eq!(config.busy_timeout, Duration::from_millis(250));
        assert!(!config.run_migrations);

        let memory = DbConfig::in_memory();
        assert_eq!(memory.max_connections, 1);
        assert_eq!(memory.busy_timeout, DEFAULT_BUSY_TIMEOUT);
    }

    #[tokio::test]
    async fn test_file_store_survives_reopen() {
        let file = TempDb::new();

        let db = Database::new(DbConfig::new(file.path())).await.unwrap();
        db.goods().insert(&rice(5)).await.unwrap();
        db.settings().set_maintenance_mode(true).await.unwrap();
        db.close().await;

        let db = Database::new(DbConfig::new(file.path())).await.unwrap();
        assert_eq!(db.goods().count().await.unwrap(), 1);
        assert!(db.settings().maintenance_mode().await.unwrap());
        db.close().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_commits_across_connections() {
        let file = TempDb::new();
        let db = Database::new(DbConfig::new(file.path()).max_connections(4))
            .await
            .unwrap();
        let good = db.goods().insert(&rice(5)).await.unwrap();

        let config = CommitterConfig::default().covering_busy_timeout(DEFAULT_BUSY_TIMEOUT);
        let mut handles = Vec::new();
        for seller in ["amy", "bob", "cy", "dee"] {
            let committer = TransactionCommitter::new(db.clone(), config.clone());
            let good = good.clone();
            handles.push(tokio::spawn(async move {
                let mut cart = Cart::new();
                cart.add(&good, 2).unwrap();
                committer.commit(&mut cart, seller, 9000).await
            }));
        }

        let mut ok = 0;
        let mut short = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => ok += 1,
                Err(CoreError::InsufficientStock { .. }) => short += 1,
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }

        assert_eq!((ok, short), (2, 2));
        let left = db.goods().get_by_id(&good.id).await.unwrap().unwrap().stock;
        assert_eq!(left, 1);
        assert_eq!(db.sales().count().await.unwrap(), 2);
        db.close().await;
    }

    #[tokio::test]
    async fn test_closed_database_rejects_queries() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.close().await;
        assert!(db.goods().count().await.is_err());
    }
}
