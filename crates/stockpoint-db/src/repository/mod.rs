//! # Repository Module
//!
//! SQLite implementations of the `stockpoint-core` store contracts.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Engine / CLI command                                                  │
//! │       │                                                                 │
//! │       │  db.inventory().conditional_decrement(id, 3)                   │
//! │       ▼                                                                 │
//! │  InventoryRepository                                                   │
//! │  ├── inherent methods  → DbResult<T>     (CLI, seed, tests)            │
//! │  └── impl InventoryStore → StoreResult<T> (engine, via Arc<dyn _>)     │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`inventory::InventoryRepository`] - Items and atomic stock deltas
//! - [`sale::SaleRepository`] - Append-only sales with their lines
//! - [`receipt::ReceiptRepository`] - Append-only receipts
//! - [`settings::SettingsRepository`] - Key/value settings, business snapshot

pub mod inventory;
pub mod receipt;
pub mod sale;
pub mod settings;

use uuid::Uuid;

/// Generates a new record ID (UUID v4).
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}
