//! # Sale Repository
//!
//! Append-only storage for completed sales and their lines.
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  add(NewSale)                                                          │
//! │     BEGIN                                                              │
//! │       INSERT INTO sales ...                                            │
//! │       INSERT INTO sale_items (position 0) ...                          │
//! │       INSERT INTO sale_items (position 1) ...                          │
//! │     COMMIT            ← readers see the whole sale or nothing          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Sales are never updated or deleted.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::generate_id;
use stockpoint_core::{Money, NewSale, Sale, SaleLineItem, SaleStore, StoreResult};

#[derive(Debug, Clone, sqlx::FromRow)]
struct SaleRecord {
    id: String,
    total_amount_cents: i64,
    seller_name: String,
    buyer_name: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct SaleItemRecord {
    item_id: String,
    item_name: String,
    quantity: i64,
    unit_price_cents: i64,
    line_total_cents: i64,
}

impl From<SaleItemRecord> for SaleLineItem {
    fn from(r: SaleItemRecord) -> Self {
        SaleLineItem {
            item_id: r.item_id,
            item_name: r.item_name,
            quantity: r.quantity,
            unit_price: Money::from_cents(r.unit_price_cents),
            line_total: Money::from_cents(r.line_total_cents),
        }
    }
}

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Stores a sale and its lines in one transaction.
    ///
    /// ## Returns
    /// The stored sale with its generated id and timestamp.
    pub async fn add(&self, sale: NewSale) -> DbResult<Sale> {
        if sale.items.is_empty() {
            return Err(DbError::CheckViolation(
                "a sale needs at least one line".to_string(),
            ));
        }

        let id = generate_id();
        let now = Utc::now();

        debug!(
            id = %id,
            lines = sale.items.len(),
            total = %sale.total_amount,
            "Inserting sale"
        );

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO sales (id, total_amount_cents, seller_name, buyer_name, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&id)
        .bind(sale.total_amount.cents())
        .bind(&sale.seller_name)
        .bind(&sale.buyer_name)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        for (position, line) in sale.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO sale_items (
                    sale_id, position, item_id, item_name,
                    quantity, unit_price_cents, line_total_cents
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(&id)
            .bind(position as i64)
            .bind(&line.item_id)
            .bind(&line.item_name)
            .bind(line.quantity)
            .bind(line.unit_price.cents())
            .bind(line.line_total.cents())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(Sale {
            id,
            items: sale.items,
            total_amount: sale.total_amount,
            seller_name: sale.seller_name,
            buyer_name: sale.buyer_name,
            created_at: now,
        })
    }

    /// Gets a sale with its lines in cart order.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let record = sqlx::query_as::<_, SaleRecord>(
            r#"
            SELECT id, total_amount_cents, seller_name, buyer_name, created_at
            FROM sales
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match record {
            Some(record) => Ok(Some(self.hydrate(record).await?)),
            None => Ok(None),
        }
    }

    /// Lists all sales, most recent first.
    pub async fn list_all(&self) -> DbResult<Vec<Sale>> {
        let records = sqlx::query_as::<_, SaleRecord>(
            r#"
            SELECT id, total_amount_cents, seller_name, buyer_name, created_at
            FROM sales
            ORDER BY rowid DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut sales = Vec::with_capacity(records.len());
        for record in records {
            sales.push(self.hydrate(record).await?);
        }
        Ok(sales)
    }

    /// Counts stored sales.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn hydrate(&self, record: SaleRecord) -> DbResult<Sale> {
        let items = sqlx::query_as::<_, SaleItemRecord>(
            r#"
            SELECT item_id, item_name, quantity, unit_price_cents, line_total_cents
            FROM sale_items
            WHERE sale_id = ?1
            ORDER BY position
            "#,
        )
        .bind(&record.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Sale {
            id: record.id,
            items: items.into_iter().map(SaleLineItem::from).collect(),
            total_amount: Money::from_cents(record.total_amount_cents),
            seller_name: record.seller_name,
            buyer_name: record.buyer_name,
            created_at: record.created_at,
        })
    }
}

#[async_trait]
impl SaleStore for SaleRepository {
    async fn add(&self, sale: NewSale) -> StoreResult<Sale> {
        Ok(SaleRepository::add(self, sale).await?)
    }

    async fn get_by_id(&self, id: &str) -> StoreResult<Option<Sale>> {
        Ok(SaleRepository::get_by_id(self, id).await?)
    }

    async fn list_all(&self) -> StoreResult<Vec<Sale>> {
        Ok(SaleRepository::list_all(self).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
