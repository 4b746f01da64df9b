//! # Domain Types
//!
//! Core domain types used throughout Stockpoint.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  InventoryItem  │   │      Sale       │   │     Receipt     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  name           │   │  items[]        │   │  sale_id ───────┼──► 1:1│
//! │  │  unit_price     │   │  total_amount   │   │  business_*     │       │
//! │  │  quantity ≥ 0   │   │  seller / buyer │   │  items[] (copy) │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌──────────────────┐                            │
//! │  │  SaleLineItem   │   │ BusinessSnapshot │                            │
//! │  │  (embedded,     │   │ (frozen onto     │                            │
//! │  │   frozen price) │   │  each receipt)   │                            │
//! │  └─────────────────┘   └──────────────────┘                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! Sales and receipts copy names and prices at creation time. Editing or
//! deleting an inventory item later never changes history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::DEFAULT_LOW_STOCK_THRESHOLD;

// =============================================================================
// Inventory Item
// =============================================================================

/// An item the business stocks and sells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct InventoryItem {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown to the operator and on receipts.
    pub name: String,

    /// Free text, may be empty.
    pub category: String,

    /// Current selling price.
    pub unit_price: Money,

    /// Units on hand. Never negative.
    pub quantity: i64,

    /// Quantity at or below which the item is reported as low stock.
    pub low_stock_threshold: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl InventoryItem {
    /// True when stock has fallen to the item's threshold.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.low_stock_threshold
    }
}

/// Input for creating an inventory item. Id and timestamps are assigned
/// by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInventoryItem {
    pub name: String,
    #[serde(default)]
    pub category: String,
    pub unit_price: Money,
    pub quantity: i64,
    #[serde(default = "default_low_stock_threshold")]
    pub low_stock_threshold: i64,
}

fn default_low_stock_threshold() -> i64 {
    DEFAULT_LOW_STOCK_THRESHOLD
}

impl NewInventoryItem {
    /// Creates an item input with the default low-stock threshold.
    pub fn new(name: impl Into<String>, unit_price: Money, quantity: i64) -> Self {
        NewInventoryItem {
            name: name.into(),
            category: String::new(),
            unit_price,
            quantity,
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_low_stock_threshold(mut self, threshold: i64) -> Self {
        self.low_stock_threshold = threshold;
        self
    }
}

/// Partial edit of an inventory item. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItemPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub unit_price: Option<Money>,
    pub quantity: Option<i64>,
    pub low_stock_threshold: Option<i64>,
}

impl InventoryItemPatch {
    /// Applies the patch to a copy of `item`.
    pub fn apply_to(&self, item: &InventoryItem) -> InventoryItem {
        let mut updated = item.clone();
        if let Some(name) = &self.name {
            updated.name = name.trim().to_string();
        }
        if let Some(category) = &self.category {
            updated.category = category.trim().to_string();
        }
        if let Some(price) = self.unit_price {
            updated.unit_price = price;
        }
        if let Some(quantity) = self.quantity {
            updated.quantity = quantity;
        }
        if let Some(threshold) = self.low_stock_threshold {
            updated.low_stock_threshold = threshold;
        }
        updated
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.unit_price.is_none()
            && self.quantity.is_none()
            && self.low_stock_threshold.is_none()
    }
}

// =============================================================================
// Sale Line Item
// =============================================================================

/// A line of a sale or receipt.
///
/// `item_id` is a weak reference kept for traceability; the item may be
/// edited or deleted later without affecting this record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleLineItem {
    pub item_id: String,
    /// Item name at time of sale (frozen).
    pub item_name: String,
    /// Units sold, always positive.
    pub quantity: i64,
    /// Unit price at time of sale (frozen).
    pub unit_price: Money,
    /// quantity × unit_price, captured at the same moment.
    pub line_total: Money,
}

impl SaleLineItem {
    /// Freezes a line from the item as it was read during deduction.
    ///
    /// Returns `None` if the line total overflows.
    pub fn capture(item: &InventoryItem, quantity: i64) -> Option<Self> {
        let line_total = item.unit_price.checked_mul_quantity(quantity)?;
        Some(SaleLineItem {
            item_id: item.id.clone(),
            item_name: item.name.clone(),
            quantity,
            unit_price: item.unit_price,
            line_total,
        })
    }
}

/// Exact sum of line totals, `None` on overflow.
pub fn sum_line_totals(items: &[SaleLineItem]) -> Option<Money> {
    items
        .iter()
        .try_fold(Money::zero(), |acc, line| acc.checked_add(line.line_total))
}

// =============================================================================
// Sale
// =============================================================================

/// A completed sale. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Sale {
    pub id: String,
    /// Lines in cart order; never empty.
    pub items: Vec<SaleLineItem>,
    pub total_amount: Money,
    pub seller_name: String,
    pub buyer_name: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A sale ready to be appended to the sales store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSale {
    pub items: Vec<SaleLineItem>,
    pub total_amount: Money,
    pub seller_name: String,
    pub buyer_name: String,
}

// =============================================================================
// Business Snapshot
// =============================================================================

/// Business identity stamped onto a receipt when it is created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct BusinessSnapshot {
    pub business_name: String,
    pub business_address: String,
}

impl BusinessSnapshot {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        BusinessSnapshot {
            business_name: name.into(),
            business_address: address.into(),
        }
    }
}

// =============================================================================
// Receipt
// =============================================================================

/// The customer-facing record of a sale. Exactly one per sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Receipt {
    pub id: String,
    pub sale_id: String,
    pub business_name: String,
    pub business_address: String,
    pub items: Vec<SaleLineItem>,
    pub total_amount: Money,
    pub seller_name: String,
    pub buyer_name: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Receipt {
    /// True when items, total, seller and buyer exactly mirror `sale`.
    pub fn mirrors(&self, sale: &Sale) -> bool {
        self.sale_id == sale.id
            && self.items == sale.items
            && self.total_amount == sale.total_amount
            && self.seller_name == sale.seller_name
            && self.buyer_name == sale.buyer_name
    }
}

/// A receipt ready to be appended to the receipt store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReceipt {
    pub sale_id: String,
    pub business_name: String,
    pub business_address: String,
    pub items: Vec<SaleLineItem>,
    pub total_amount: Money,
    pub seller_name: String,
    pub buyer_name: String,
}

impl NewReceipt {
    /// Duplicates the sale's lines, total and parties and stamps the
    /// business snapshot.
    pub fn for_sale(sale: &Sale, business: &BusinessSnapshot) -> Self {
        NewReceipt {
            sale_id: sale.id.clone(),
            business_name: business.business_name.clone(),
            business_address: business.business_address.clone(),
            items: sale.items.clone(),
            total_amount: sale.total_amount,
            seller_name: sale.seller_name.clone(),
            buyer_name: sale.buyer_name.clone(),
        }
    }
}

// =============================================================================
// Sale Request
// =============================================================================

/// One `{itemId, quantity}` pair of a checkout request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleLineRequest {
    pub item_id: String,
    pub quantity: i64,
}

impl SaleLineRequest {
    pub fn new(item_id: impl Into<String>, quantity: i64) -> Self {
        SaleLineRequest {
            item_id: item_id.into(),
            quantity,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
