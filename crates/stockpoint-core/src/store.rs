//! # Store Contracts
//!
//! Storage-agnostic traits the sale engine is written against.
//!
//! ```text
//! ┌──────────────────────┐        ┌──────────────────────────────────────┐
//! │  stockpoint-engine   │        │  stockpoint-db (SQLite)              │
//! │                      │        │                                      │
//! │  Arc<dyn Inventory-  │◄───────┤  InventoryRepository                 │
//! │      Store>          │        │  SaleRepository                      │
//! │  Arc<dyn SaleStore>  │◄───────┤  ReceiptRepository                   │
//! │  Arc<dyn Receipt-    │◄───────┤  SettingsRepository                  │
//! │      Store>          │        │                                      │
//! └──────────────────────┘        └──────────────────────────────────────┘
//! ```
//!
//! ## Atomicity Contract
//! `conditional_decrement` must read, check and write a single item as one
//! indivisible step. Two concurrent decrements on the same item can never
//! both observe enough stock if together they would drive it negative.

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::types::{
    BusinessSnapshot, InventoryItem, InventoryItemPatch, NewInventoryItem, NewReceipt, NewSale,
    Receipt, Sale,
};

/// Result of a conditional decrement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecrementOutcome {
    /// Stock was deducted. Carries the item as it is after the deduction.
    Decremented(InventoryItem),

    /// Stock was left untouched because fewer than the requested units exist.
    InsufficientStock { available: i64 },

    /// No item with that id.
    NotFound,
}

/// Inventory items and their stock levels.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    async fn get_by_id(&self, id: &str) -> StoreResult<Option<InventoryItem>>;

    /// All items, ordered by name.
    async fn list_all(&self) -> StoreResult<Vec<InventoryItem>>;

    /// Items whose quantity is at or below their low-stock threshold.
    async fn list_low_stock(&self) -> StoreResult<Vec<InventoryItem>>;

    async fn create(&self, item: NewInventoryItem) -> StoreResult<InventoryItem>;

    async fn update(&self, id: &str, patch: InventoryItemPatch) -> StoreResult<InventoryItem>;

    /// Hard delete. Past sales keep their own snapshot of the item.
    async fn delete(&self, id: &str) -> StoreResult<()>;

    /// Atomically deducts `amount` if at least that much is in stock.
    async fn conditional_decrement(&self, id: &str, amount: i64) -> StoreResult<DecrementOutcome>;

    /// Adds `amount` back. Used to compensate a decrement.
    async fn increment(&self, id: &str, amount: i64) -> StoreResult<InventoryItem>;
}

/// Append-only sales log.
#[async_trait]
pub trait SaleStore: Send + Sync {
    /// Stores the sale and all of its lines, or nothing.
    async fn add(&self, sale: NewSale) -> StoreResult<Sale>;

    async fn get_by_id(&self, id: &str) -> StoreResult<Option<Sale>>;

    /// Most recent first.
    async fn list_all(&self) -> StoreResult<Vec<Sale>>;
}

/// Append-only receipt log.
#[async_trait]
pub trait ReceiptStore: Send + Sync {
    async fn add(&self, receipt: NewReceipt) -> StoreResult<Receipt>;

    async fn get_by_id(&self, id: &str) -> StoreResult<Option<Receipt>>;

    /// The receipt issued for `sale_id`, if any.
    async fn get_by_sale_id(&self, sale_id: &str) -> StoreResult<Option<Receipt>>;

    /// Most recent first.
    async fn list_all(&self) -> StoreResult<Vec<Receipt>>;
}

/// Source of the business identity stamped on receipts.
#[async_trait]
pub trait SettingsProvider: Send + Sync {
    async fn business_snapshot(&self) -> StoreResult<BusinessSnapshot>;
}
