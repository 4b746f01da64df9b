//! # Receipt Repository
//!
//! Append-only storage for receipts.
//!
//! Lines are stored as a JSON snapshot in `items_json`; a receipt is read
//! back exactly as it was printed, independent of `sale_items`.
//!
//! There is no uniqueness constraint on `sale_id`. The sale engine checks
//! `get_by_sale_id` before issuing, and this repository returns the
//! earliest receipt if more than one ever exists.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use crate::repository::generate_id;
use stockpoint_core::{Money, NewReceipt, Receipt, ReceiptStore, SaleLineItem, StoreResult};

const RECEIPT_COLUMNS: &str = "id, sale_id, business_name, business_address, items_json, \
                               total_amount_cents, seller_name, buyer_name, created_at";

#[derive(Debug, Clone, sqlx::FromRow)]
struct ReceiptRecord {
    id: String,
    sale_id: String,
    business_name: String,
    business_address: String,
    items_json: String,
    total_amount_cents: i64,
    seller_name: String,
    buyer_name: String,
    created_at: DateTime<Utc>,
}

impl ReceiptRecord {
    fn into_receipt(self) -> DbResult<Receipt> {
        let items: Vec<SaleLineItem> = serde_json::from_str(&self.items_json)?;
        Ok(Receipt {
            id: self.id,
            sale_id: self.sale_id,
            business_name: self.business_name,
            business_address: self.business_address,
            items,
            total_amount: Money::from_cents(self.total_amount_cents),
            seller_name: self.seller_name,
            buyer_name: self.buyer_name,
            created_at: self.created_at,
        })
    }
}

/// Repository for receipt database operations.
#[derive(Debug, Clone)]
pub struct ReceiptRepository {
    pool: SqlitePool,
}

impl ReceiptRepository {
    /// Creates a new ReceiptRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReceiptRepository { pool }
    }

    /// Appends a receipt.
    pub async fn add(&self, receipt: NewReceipt) -> DbResult<Receipt> {
        let id = generate_id();
        let now = Utc::now();
        let items_json = serde_json::to_string(&receipt.items)?;

        debug!(id = %id, sale_id = %receipt.sale_id, "Inserting receipt");

        sqlx::query(&format!(
            "INSERT INTO receipts ({RECEIPT_COLUMNS}) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
        ))
        .bind(&id)
        .bind(&receipt.sale_id)
        .bind(&receipt.business_name)
        .bind(&receipt.business_address)
        .bind(&items_json)
        .bind(receipt.total_amount.cents())
        .bind(&receipt.seller_name)
        .bind(&receipt.buyer_name)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Receipt {
            id,
            sale_id: receipt.sale_id,
            business_name: receipt.business_name,
            business_address: receipt.business_address,
            items: receipt.items,
            total_amount: receipt.total_amount,
            seller_name: receipt.seller_name,
            buyer_name: receipt.buyer_name,
            created_at: now,
        })
    }

    /// Gets a receipt by its own id.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Receipt>> {
        let record = sqlx::query_as::<_, ReceiptRecord>(&format!(
            "SELECT {RECEIPT_COLUMNS} FROM receipts WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        record.map(ReceiptRecord::into_receipt).transpose()
    }

    /// Gets the (earliest) receipt issued for a sale.
    pub async fn get_by_sale_id(&self, sale_id: &str) -> DbResult<Option<Receipt>> {
        let record = sqlx::query_as::<_, ReceiptRecord>(&format!(
            "SELECT {RECEIPT_COLUMNS} FROM receipts \
             WHERE sale_id = ?1 \
             ORDER BY rowid \
             LIMIT 1"
        ))
        .bind(sale_id)
        .fetch_optional(&self.pool)
        .await?;

        record.map(ReceiptRecord::into_receipt).transpose()
    }

    /// Lists all receipts, most recent first.
    pub async fn list_all(&self) -> DbResult<Vec<Receipt>> {
        let records = sqlx::query_as::<_, ReceiptRecord>(&format!(
            "SELECT {RECEIPT_COLUMNS} FROM receipts ORDER BY rowid DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        records.into_iter().map(ReceiptRecord::into_receipt).collect()
    }

    /// Counts receipts issued for a sale. More than one means the 1:1 rule
    /// was broken by something other than the sale engine.
    pub async fn count_for_sale(&self, sale_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM receipts WHERE sale_id = ?1")
            .bind(sale_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[async_trait]
impl ReceiptStore for ReceiptRepository {
    async fn add(&self, receipt: NewReceipt) -> StoreResult<Receipt> {
        Ok(ReceiptRepository::add(self, receipt).await?)
    }

    async fn get_by_id(&self, id: &str) -> StoreResult<Option<Receipt>> {
        Ok(ReceiptRepository::get_by_id(self, id).await?)
    }

    async fn get_by_sale_id(&self, sale_id: &str) -> StoreResult<Option<Receipt>> {
        Ok(ReceiptRepository::get_by_sale_id(self, sale_id).await?)
    }

    async fn list_all(&self) -> StoreResult<Vec<Receipt>> {
        Ok(ReceiptRepository::list_all(self).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::{Database, DbConfig};
    use stockpoint_core::{BusinessSnapshot, NewSale};

    async fn stored_sale(db: &Database) -> stockpoint_core::Sale {
        let items = vec![SaleLineItem {
            item_id: "item-1".to_string(),
            item_name: "Rice 5kg".to_string(),
            quantity: 3,
            unit_price: Money::from_cents(100),
            line_total: Money::from_cents(300),
        }];
        db.sales()
            .add(NewSale {
                items,
                total_amount: Money::from_cents(300),
                seller_name: "Ada".to_string(),
                buyer_name: "Grace".to_string(),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_add_and_lookup_by_sale() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let sale = stored_sale(&db).await;
        let business = BusinessSnapshot::new("Corner Shop", "1 High St");

        let receipt = db
            .receipts()
            .add(NewReceipt::for_sale(&sale, &business))
            .await
            .unwrap();

        let by_sale = db.receipts().get_by_sale_id(&sale.id).await.unwrap().unwrap();
        assert_eq!(by_sale.id, receipt.id);
        assert!(by_sale.mirrors(&sale));
        assert_eq!(by_sale.business_address, "1 High St");

        let by_id = db.receipts().get_by_id(&receipt.id).await.unwrap().unwrap();
        assert_eq!(by_id.items, sale.items);
        assert_eq!(db.receipts().count_for_sale(&sale.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_receipt_for_unknown_sale_is_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let receipt = NewReceipt {
            sale_id: "no-such-sale".to_string(),
            business_name: String::new(),
            business_address: String::new(),
            items: vec![],
            total_amount: Money::zero(),
            seller_name: "Ada".to_string(),
            buyer_name: "Grace".to_string(),
        };

        assert!(matches!(
            db.receipts().add(receipt).await,
            Err(DbError::ForeignKeyViolation { .. })
        ));
    }

    #[tokio::test]
    async fn test_no_receipt_yet() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let sale = stored_sale(&db).await;

        assert!(db.receipts().get_by_sale_id(&sale.id).await.unwrap().is_none());
        assert!(db.receipts().list_all().await.unwrap().is_empty());
    }
}
