//! # Register State
//!
//! Everything a command needs, built once at startup.
//!
//! ```text
//! RegisterConfig ──► Database (SQLite, migrations) ──┬──► repositories
//!                                                    ├──► SaleTransactionEngine
//!                                                    └──► PinGate
//! ```

use std::sync::Arc;

use stockpoint_db::{Database, DbConfig, SettingsRepository};
use stockpoint_engine::SaleTransactionEngine;
use tracing::info;

use crate::auth::PinGate;
use crate::config::RegisterConfig;
use crate::error::{AppError, AppResult, ErrorCode};

/// Shared register state.
#[derive(Debug, Clone)]
pub struct AppState {
    db: Database,
    settings: SettingsRepository,
    engine: SaleTransactionEngine,
    pins: PinGate,
}

impl AppState {
    /// Opens the configured database and wires up the engine.
    pub async fn open(config: &RegisterConfig) -> AppResult<Self> {
        if let Some(parent) = config.database_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    AppError::internal(format!(
                        "Could not create data directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let db_config = DbConfig::new(&config.database_path).max_connections(config.max_connections);
        let db = Database::new(db_config).await?;
        if !db.health_check().await {
            return Err(AppError::new(
                ErrorCode::DatabaseError,
                format!("Database {} is not answering", config.database_path.display()),
            ));
        }
        info!(path = %config.database_path.display(), "Database ready");

        Ok(Self::with_database(db, config))
    }

    /// Builds state over an already-open database.
    pub fn with_database(db: Database, config: &RegisterConfig) -> Self {
        let settings = db.settings().with_business_defaults(config.business_defaults());

        let engine = SaleTransactionEngine::new(
            Arc::new(db.inventory()),
            Arc::new(db.sales()),
            Arc::new(db.receipts()),
            Arc::new(settings.clone()),
        );

        let pins = PinGate::new(settings.clone(), config.max_pin_attempts, config.lockout_secs);

        AppState {
            db,
            settings,
            engine,
            pins,
        }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    /// Settings with the configured business defaults applied.
    pub fn settings(&self) -> &SettingsRepository {
        &self.settings
    }

    pub fn engine(&self) -> &SaleTransactionEngine {
        &self.engine
    }

    pub fn pins(&self) -> &PinGate {
        &self.pins
    }
}
