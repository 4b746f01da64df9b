//! # Inventory Repository
//!
//! Database operations for inventory items.
//!
//! ## Stock Updates Are Deltas
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Stock Update Strategy                                │
//! │                                                                         │
//! │  ❌ WRONG: read, check in Rust, write absolute value                   │
//! │     SELECT quantity ...;  UPDATE ... SET quantity = 2                  │
//! │     (two sales can both read 5 and both write 2)                       │
//! │                                                                         │
//! │  ✅ CORRECT: one conditional statement                                 │
//! │     UPDATE inventory_items SET quantity = quantity - 3                 │
//! │     WHERE id = ? AND quantity >= 3                                     │
//! │     RETURNING ...                                                      │
//! │                                                                         │
//! │  SQLite serializes writers, so the check and the write cannot be       │
//! │  interleaved with another decrement of the same row.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use crate::repository::generate_id;
use stockpoint_core::{
    DecrementOutcome, InventoryItem, InventoryItemPatch, InventoryStore, Money, NewInventoryItem,
    StoreError, StoreResult,
};

const ITEM_COLUMNS: &str = "id, name, category, unit_price_cents, quantity, \
                            low_stock_threshold, created_at, updated_at";

/// Row shape of `inventory_items`.
#[derive(Debug, Clone, sqlx::FromRow)]
struct InventoryItemRecord {
    id: String,
    name: String,
    category: String,
    unit_price_cents: i64,
    quantity: i64,
    low_stock_threshold: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<InventoryItemRecord> for InventoryItem {
    fn from(r: InventoryItemRecord) -> Self {
        InventoryItem {
            id: r.id,
            name: r.name,
            category: r.category,
            unit_price: Money::from_cents(r.unit_price_cents),
            quantity: r.quantity,
            low_stock_threshold: r.low_stock_threshold,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Repository for inventory database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.inventory();
///
/// let item = repo.create(NewInventoryItem::new("Rice 5kg", Money::from_cents(10000), 5)).await?;
/// match repo.conditional_decrement(&item.id, 3).await? {
///     DecrementOutcome::Decremented(after) => assert_eq!(after.quantity, 2),
///     other => panic!("{other:?}"),
/// }
/// ```
#[derive(Debug, Clone)]
pub struct InventoryRepository {
    pool: SqlitePool,
}

impl InventoryRepository {
    /// Creates a new InventoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InventoryRepository { pool }
    }

    /// Gets an item by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(InventoryItem))` - Item found
    /// * `Ok(None)` - Item not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<InventoryItem>> {
        let record = sqlx::query_as::<_, InventoryItemRecord>(&format!(
            "SELECT {ITEM_COLUMNS} FROM inventory_items WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record.map(InventoryItem::from))
    }

    /// Lists all items sorted by name.
    pub async fn list_all(&self) -> DbResult<Vec<InventoryItem>> {
        let records = sqlx::query_as::<_, InventoryItemRecord>(&format!(
            "SELECT {ITEM_COLUMNS} FROM inventory_items ORDER BY name, created_at"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(records.into_iter().map(InventoryItem::from).collect())
    }

    /// Lists items at or below their low-stock threshold, emptiest first.
    pub async fn list_low_stock(&self) -> DbResult<Vec<InventoryItem>> {
        let records = sqlx::query_as::<_, InventoryItemRecord>(&format!(
            "SELECT {ITEM_COLUMNS} FROM inventory_items \
             WHERE quantity <= low_stock_threshold \
             ORDER BY quantity, name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(records.into_iter().map(InventoryItem::from).collect())
    }

    /// Inserts a new item with a generated id.
    ///
    /// Field validation is the caller's job; the table's CHECK constraints
    /// are the last line of defense.
    pub async fn create(&self, item: NewInventoryItem) -> DbResult<InventoryItem> {
        let id = generate_id();
        let now = Utc::now();

        debug!(id = %id, name = %item.name, quantity = item.quantity, "Inserting inventory item");

        let record = sqlx::query_as::<_, InventoryItemRecord>(&format!(
            "INSERT INTO inventory_items ({ITEM_COLUMNS}) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7) \
             RETURNING {ITEM_COLUMNS}"
        ))
        .bind(&id)
        .bind(item.name.trim())
        .bind(item.category.trim())
        .bind(item.unit_price.cents())
        .bind(item.quantity)
        .bind(item.low_stock_threshold)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(record.into())
    }

    /// Applies a partial edit in one statement.
    ///
    /// Unset fields keep their stored value, so an edit that does not touch
    /// `quantity` cannot overwrite a concurrent sale's deduction.
    pub async fn update(&self, id: &str, patch: InventoryItemPatch) -> DbResult<InventoryItem> {
        debug!(id = %id, "Updating inventory item");

        let record = sqlx::query_as::<_, InventoryItemRecord>(&format!(
            "UPDATE inventory_items SET \
                 name = COALESCE(?2, name), \
                 category = COALESCE(?3, category), \
                 unit_price_cents = COALESCE(?4, unit_price_cents), \
                 quantity = COALESCE(?5, quantity), \
                 low_stock_threshold = COALESCE(?6, low_stock_threshold), \
                 updated_at = ?7 \
             WHERE id = ?1 \
             RETURNING {ITEM_COLUMNS}"
        ))
        .bind(id)
        .bind(patch.name.as_deref().map(str::trim))
        .bind(patch.category.as_deref().map(str::trim))
        .bind(patch.unit_price.map(|p| p.cents()))
        .bind(patch.quantity)
        .bind(patch.low_stock_threshold)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        record
            .map(InventoryItem::from)
            .ok_or_else(|| DbError::not_found("InventoryItem", id))
    }

    /// Hard-deletes an item.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting inventory item");

        let result = sqlx::query("DELETE FROM inventory_items WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("InventoryItem", id));
        }

        Ok(())
    }

    /// Deducts `amount` units if at least that many are in stock.
    ///
    /// ## Returns
    /// * `Decremented(item)` - item after the deduction
    /// * `InsufficientStock { available }` - nothing changed
    /// * `NotFound` - no such item
    pub async fn conditional_decrement(&self, id: &str, amount: i64) -> DbResult<DecrementOutcome> {
        if amount <= 0 {
            return Err(DbError::CheckViolation(format!(
                "decrement amount must be positive, got {amount}"
            )));
        }

        let record = sqlx::query_as::<_, InventoryItemRecord>(&format!(
            "UPDATE inventory_items \
             SET quantity = quantity - ?2, updated_at = ?3 \
             WHERE id = ?1 AND quantity >= ?2 \
             RETURNING {ITEM_COLUMNS}"
        ))
        .bind(id)
        .bind(amount)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        if let Some(record) = record {
            debug!(id = %id, amount, remaining = record.quantity, "Stock decremented");
            return Ok(DecrementOutcome::Decremented(record.into()));
        }

        // Refused: find out whether the row is missing or just short.
        match self.get_by_id(id).await? {
            Some(item) => {
                debug!(id = %id, amount, available = item.quantity, "Decrement refused");
                Ok(DecrementOutcome::InsufficientStock {
                    available: item.quantity,
                })
            }
            None => {
                warn!(id = %id, "Decrement on missing item");
                Ok(DecrementOutcome::NotFound)
            }
        }
    }

    /// Adds `amount` units back to an item.
    pub async fn increment(&self, id: &str, amount: i64) -> DbResult<InventoryItem> {
        if amount <= 0 {
            return Err(DbError::CheckViolation(format!(
                "increment amount must be positive, got {amount}"
            )));
        }

        let record = sqlx::query_as::<_, InventoryItemRecord>(&format!(
            "UPDATE inventory_items \
             SET quantity = quantity + ?2, updated_at = ?3 \
             WHERE id = ?1 \
             RETURNING {ITEM_COLUMNS}"
        ))
        .bind(id)
        .bind(amount)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        let item = record
            .map(InventoryItem::from)
            .ok_or_else(|| DbError::not_found("InventoryItem", id))?;

        debug!(id = %id, amount, quantity = item.quantity, "Stock incremented");
        Ok(item)
    }

    /// Counts items (for diagnostics and seeding).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM inventory_items")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[async_trait]
impl InventoryStore for InventoryRepository {
    async fn get_by_id(&self, id: &str) -> StoreResult<Option<InventoryItem>> {
        Ok(InventoryRepository::get_by_id(self, id).await?)
    }

    async fn list_all(&self) -> StoreResult<Vec<InventoryItem>> {
        Ok(InventoryRepository::list_all(self).await?)
    }

    async fn list_low_stock(&self) -> StoreResult<Vec<InventoryItem>> {
        Ok(InventoryRepository::list_low_stock(self).await?)
    }

    async fn create(&self, item: NewInventoryItem) -> StoreResult<InventoryItem> {
        Ok(InventoryRepository::create(self, item).await?)
    }

    async fn update(&self, id: &str, patch: InventoryItemPatch) -> StoreResult<InventoryItem> {
        Ok(InventoryRepository::update(self, id, patch).await?)
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        Ok(InventoryRepository::delete(self, id).await?)
    }

    async fn conditional_decrement(&self, id: &str, amount: i64) -> StoreResult<DecrementOutcome> {
        Ok(InventoryRepository::conditional_decrement(self, id, amount).await?)
    }

    async fn increment(&self, id: &str, amount: i64) -> StoreResult<InventoryItem> {
        InventoryRepository::increment(self, id, amount)
            .await
            .map_err(StoreError::from)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
