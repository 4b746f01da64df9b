//! # Database Handle
//!
//! One SQLite file per shop, shared by every register on it.
//!
//! ```text
//! register A ──► Database (pool) ──┐
//!                                  ├──► stockpoint.db (WAL)
//! register B ──► Database (pool) ──┘
//! ```
//!
//! SQLite serializes writers on the file itself, so a stock decrement is
//! atomic whether the competing write comes from this pool or another
//! process. A writer that finds the file busy waits up to `busy_timeout`
//! before the statement fails with `database is locked`.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::inventory::InventoryRepository;
use crate::repository::receipt::ReceiptRepository;
use crate::repository::sale::SaleRepository;
use crate::repository::settings::SettingsRepository;

const MEMORY_PATH: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// Where the shop database lives and how hard to wait for it.
///
/// ```rust
/// use std::time::Duration;
/// use stockpoint_db::DbConfig;
///
/// let config = DbConfig::new("/srv/shop/stockpoint.db")
///     .max_connections(8)
///     .busy_timeout(Duration::from_secs(10));
/// assert_eq!(config.max_connections, 8);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub database_path: PathBuf,

    /// Connections this handle may hold. A single register rarely needs
    /// more than a handful.
    pub max_connections: u32,

    /// How long a statement waits on another writer's lock.
    pub busy_timeout: Duration,

    /// How long a caller waits for a free pooled connection.
    pub acquire_timeout: Duration,
}

impl DbConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            busy_timeout: Duration::from_secs(5),
            acquire_timeout: Duration::from_secs(30),
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

    /// A fresh private database. Each SQLite connection to `:memory:` is
    /// its own database, so the pool is pinned to one connection.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(MEMORY_PATH),
            max_connections: 1,
            busy_timeout: Duration::from_secs(5),
            acquire_timeout: Duration::from_secs(5),
        }
    }

    fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == MEMORY_PATH
    }
}

// =============================================================================
// Database
// =============================================================================

/// Pool handle handing out repositories. Clones share the pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens (creating if needed) the database and applies migrations.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            max_connections = config.max_connections,
            "Opening shop database"
        );

        let connect_url = format!("sqlite://{}?mode=rwc", config.database_path.display());
        let mut options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(config.busy_timeout)
            .create_if_missing(true);

        if !config.is_in_memory() {
            options = options.journal_mode(SqliteJournalMode::Wal);
        }
        debug!(busy_timeout = ?config.busy_timeout, "Connection options configured");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(1)
            .acquire_timeout(config.acquire_timeout)
            .connect_with(options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        let db = Database { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    /// Applies pending migrations. Safe to call on an up-to-date database.
    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await?;
        debug!("Migrations applied");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn inventory(&self) -> InventoryRepository {
        InventoryRepository::new(self.pool.clone())
    }

    pub fn sales(&self) -> SaleRepository {
        SaleRepository::new(self.pool.clone())
    }

    pub fn receipts(&self) -> ReceiptRepository {
        ReceiptRepository::new(self.pool.clone())
    }

    pub fn settings(&self) -> SettingsRepository {
        SettingsRepository::new(self.pool.clone())
    }

    /// Waits for in-flight statements, then closes every connection.
    pub async fn close(&self) {
        info!("Closing shop database");
        self.pool.close().await;
    }

    /// Runs a trivial query. The register calls this once at startup so a
    /// broken file is reported before any command runs.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
