//! # stockpoint-db: Database Layer for Stockpoint
//!
//! This crate provides the SQLite implementation of the store contracts in
//! `stockpoint-core`, using sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockpoint Data Flow                             │
//! │                                                                         │
//! │  SaleTransactionEngine (complete_sale)                                 │
//! │       │  Arc<dyn InventoryStore>, Arc<dyn SaleStore>, ...               │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  stockpoint-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐   ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │   │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                │   │  (embedded)  │  │   │
//! │  │   │               │    │ InventoryRepo  │   │              │  │   │
//! │  │   │ SqlitePool    │◄───│ SaleRepo       │   │ 001_init.sql │  │   │
//! │  │   │               │    │ ReceiptRepo    │   │              │  │   │
//! │  │   │               │    │ SettingsRepo   │   │              │  │   │
//! │  │   └───────────────┘    └────────────────┘   └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │   SQLite Database  (<data dir>/stockpoint.db)                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockpoint_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("stockpoint.db")).await?;
//! let items = db.inventory().list_all().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::inventory::InventoryRepository;
pub use repository::receipt::ReceiptRepository;
pub use repository::sale::SaleRepository;
pub use repository::settings::{keys as setting_keys, SettingsRepository};
