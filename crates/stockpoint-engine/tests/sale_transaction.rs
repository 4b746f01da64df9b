//! End-to-end sale scenarios against SQLite, in memory or file-backed.
//!
//! Storage faults are injected by wrapping the real repositories.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use stockpoint_core::{
    BusinessSnapshot, Cart, DecrementOutcome, InventoryItem, InventoryItemPatch, InventoryStore,
    Money, NewInventoryItem, NewReceipt, NewSale, Receipt, ReceiptStore, Sale, SaleLineRequest,
    SaleStore, StoreError, StoreResult,
};
use stockpoint_db::{setting_keys, Database, DbConfig, InventoryRepository, ReceiptRepository};
use stockpoint_engine::{SaleError, SaleRequest, SaleTransactionEngine};

// =============================================================================
// Fault-injecting wrappers
// =============================================================================

/// Counts calls and optionally fails the nth decrement with a storage fault.
struct FlakyInventory {
    inner: InventoryRepository,
    decrements: AtomicUsize,
    increments: AtomicUsize,
    fail_decrement_at: Option<usize>,
}

impl FlakyInventory {
    fn new(inner: InventoryRepository) -> Self {
        FlakyInventory {
            inner,
            decrements: AtomicUsize::new(0),
            increments: AtomicUsize::new(0),
            fail_decrement_at: None,
        }
    }

    fn failing_at(inner: InventoryRepository, nth: usize) -> Self {
        FlakyInventory {
            fail_decrement_at: Some(nth),
            ..FlakyInventory::new(inner)
        }
    }

    fn decrements(&self) -> usize {
        self.decrements.load(Ordering::SeqCst)
    }

    fn increments(&self) -> usize {
        self.increments.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InventoryStore for FlakyInventory {
    async fn get_by_id(&self, id: &str) -> StoreResult<Option<InventoryItem>> {
        InventoryStore::get_by_id(&self.inner, id).await
    }

    async fn list_all(&self) -> StoreResult<Vec<InventoryItem>> {
        InventoryStore::list_all(&self.inner).await
    }

    async fn list_low_stock(&self) -> StoreResult<Vec<InventoryItem>> {
        InventoryStore::list_low_stock(&self.inner).await
    }

    async fn create(&self, item: NewInventoryItem) -> StoreResult<InventoryItem> {
        InventoryStore::create(&self.inner, item).await
    }

    async fn update(&self, id: &str, patch: InventoryItemPatch) -> StoreResult<InventoryItem> {
        InventoryStore::update(&self.inner, id, patch).await
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        InventoryStore::delete(&self.inner, id).await
    }

    async fn conditional_decrement(&self, id: &str, amount: i64) -> StoreResult<DecrementOutcome> {
        let call = self.decrements.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_decrement_at == Some(call) {
            return Err(StoreError::Unavailable("disk I/O error".to_string()));
        }
        InventoryStore::conditional_decrement(&self.inner, id, amount).await
    }

    async fn increment(&self, id: &str, amount: i64) -> StoreResult<InventoryItem> {
        self.increments.fetch_add(1, Ordering::SeqCst);
        InventoryStore::increment(&self.inner, id, amount).await
    }
}

/// Refuses every sale write.
struct BrokenSales;

#[async_trait]
impl SaleStore for BrokenSales {
    async fn add(&self, _sale: NewSale) -> StoreResult<Sale> {
        Err(StoreError::Unavailable("database is locked".to_string()))
    }

    async fn get_by_id(&self, _id: &str) -> StoreResult<Option<Sale>> {
        Ok(None)
    }

    async fn list_all(&self) -> StoreResult<Vec<Sale>> {
        Ok(Vec::new())
    }
}

/// Fails receipt writes until `recover()` is called.
struct FlakyReceipts {
    inner: ReceiptRepository,
    broken: AtomicBool,
}

impl FlakyReceipts {
    fn broken(inner: ReceiptRepository) -> Self {
        FlakyReceipts {
            inner,
            broken: AtomicBool::new(true),
        }
    }

    fn recover(&self) {
        self.broken.store(false, Ordering::SeqCst);
    }
}

#[async_trait]
impl ReceiptStore for FlakyReceipts {
    async fn add(&self, receipt: NewReceipt) -> StoreResult<Receipt> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("disk full".to_string()));
        }
        ReceiptStore::add(&self.inner, receipt).await
    }

    async fn get_by_id(&self, id: &str) -> StoreResult<Option<Receipt>> {
        ReceiptStore::get_by_id(&self.inner, id).await
    }

    async fn get_by_sale_id(&self, sale_id: &str) -> StoreResult<Option<Receipt>> {
        ReceiptStore::get_by_sale_id(&self.inner, sale_id).await
    }

    async fn list_all(&self) -> StoreResult<Vec<Receipt>> {
        ReceiptStore::list_all(&self.inner).await
    }
}

// =============================================================================
// Fixtures
// =============================================================================

async fn database() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

fn shop() -> BusinessSnapshot {
    BusinessSnapshot::new("Corner Shop", "1 Main St")
}

fn engine_over(db: &Database, inventory: Arc<dyn InventoryStore>) -> SaleTransactionEngine {
    SaleTransactionEngine::new(
        inventory,
        Arc::new(db.sales()),
        Arc::new(db.receipts()),
        Arc::new(db.settings()),
    )
}

fn engine(db: &Database) -> SaleTransactionEngine {
    engine_over(db, Arc::new(db.inventory()))
}

async fn stock(db: &Database, name: &str, cents: i64, quantity: i64) -> InventoryItem {
    db.inventory()
        .create(NewInventoryItem::new(name, Money::from_cents(cents), quantity))
        .await
        .unwrap()
}

async fn quantity_of(db: &Database, id: &str) -> i64 {
    db.inventory().get_by_id(id).await.unwrap().unwrap().quantity
}

fn sell(lines: Vec<SaleLineRequest>) -> SaleRequest {
    SaleRequest::new(lines, "Ada", "Grace").with_business(shop())
}

// =============================================================================
// Happy path
// =============================================================================

#[tokio::test]
async fn test_simple_sale_deducts_and_issues_receipt() {
    let db = database().await;
    let item = stock(&db, "Soap", 100, 10).await;

    let receipt = engine(&db)
        .complete_sale(sell(vec![SaleLineRequest::new(&item.id, 3)]))
        .await
        .unwrap();

    assert_eq!(receipt.total_amount.cents(), 300);
    assert_eq!(receipt.business_name, "Corner Shop");
    assert_eq!(receipt.items.len(), 1);
    assert_eq!(receipt.items[0].item_name, "Soap");
    assert_eq!(receipt.items[0].line_total.cents(), 300);
    assert_eq!(quantity_of(&db, &item.id).await, 7);

    let sale = db.sales().get_by_id(&receipt.sale_id).await.unwrap().unwrap();
    assert!(receipt.mirrors(&sale));
    assert_eq!(sale.seller_name, "Ada");
    assert_eq!(sale.buyer_name, "Grace");
}

#[tokio::test]
async fn test_multi_line_sale_from_cart() {
    let db = database().await;
    let soap = stock(&db, "Soap", 150, 10).await;
    let rice = stock(&db, "Rice", 1099, 4).await;

    let mut cart = Cart::new();
    cart.add_line(&soap, 2).unwrap();
    cart.add_line(&rice, 4).unwrap();

    let receipt = engine(&db)
        .complete_sale(sell(cart.to_sale_lines()))
        .await
        .unwrap();

    assert_eq!(receipt.total_amount.cents(), 2 * 150 + 4 * 1099);
    assert_eq!(receipt.items[0].item_id, soap.id);
    assert_eq!(receipt.items[1].item_id, rice.id);
    assert_eq!(quantity_of(&db, &soap.id).await, 8);
    assert_eq!(quantity_of(&db, &rice.id).await, 0);
}

#[tokio::test]
async fn test_names_are_trimmed_before_recording() {
    let db = database().await;
    let item = stock(&db, "Soap", 100, 5).await;

    let request = SaleRequest::new(vec![SaleLineRequest::new(&item.id, 1)], "  Ada  ", " Grace\n")
        .with_business(shop());
    let receipt = engine(&db).complete_sale(request).await.unwrap();

    assert_eq!(receipt.seller_name, "Ada");
    assert_eq!(receipt.buyer_name, "Grace");
}

#[tokio::test]
async fn test_price_is_frozen_at_sale_time() {
    let db = database().await;
    let item = stock(&db, "Soap", 100, 5).await;

    let receipt = engine(&db)
        .complete_sale(sell(vec![SaleLineRequest::new(&item.id, 2)]))
        .await
        .unwrap();

    let patch = InventoryItemPatch {
        name: Some("Luxury Soap".to_string()),
        unit_price: Some(Money::from_cents(500)),
        ..Default::default()
    };
    db.inventory().update(&item.id, patch).await.unwrap();

    let sale = db.sales().get_by_id(&receipt.sale_id).await.unwrap().unwrap();
    assert_eq!(sale.items[0].item_name, "Soap");
    assert_eq!(sale.items[0].unit_price.cents(), 100);
    assert_eq!(sale.total_amount.cents(), 200);
}

#[tokio::test]
async fn test_duplicate_lines_are_deducted_separately() {
    let db = database().await;
    let item = stock(&db, "Soap", 100, 5).await;

    let receipt = engine(&db)
        .complete_sale(sell(vec![
            SaleLineRequest::new(&item.id, 2),
            SaleLineRequest::new(&item.id, 1),
        ]))
        .await
        .unwrap();

    assert_eq!(receipt.items.len(), 2);
    assert_eq!(receipt.total_amount.cents(), 300);
    assert_eq!(quantity_of(&db, &item.id).await, 2);
}

#[tokio::test]
async fn test_business_snapshot_falls_back_to_settings() {
    let db = database().await;
    let item = stock(&db, "Soap", 100, 5).await;
    let settings = db.settings();
    settings.set(setting_keys::BUSINESS_NAME, "Settings Shop").await.unwrap();
    settings.set(setting_keys::BUSINESS_ADDRESS, "2 High St").await.unwrap();

    let request = SaleRequest::new(vec![SaleLineRequest::new(&item.id, 1)], "Ada", "Grace");
    let receipt = engine(&db).complete_sale(request).await.unwrap();

    assert_eq!(receipt.business_name, "Settings Shop");
    assert_eq!(receipt.business_address, "2 High St");
}

// =============================================================================
// Validation
// =============================================================================

#[tokio::test]
async fn test_invalid_requests_touch_nothing() {
    let db = database().await;
    let item = stock(&db, "Soap", 100, 5).await;
    let inventory = Arc::new(FlakyInventory::new(db.inventory()));
    let engine = engine_over(&db, inventory.clone());

    let cases = [
        (SaleRequest::new(vec![], "Ada", "Grace"), SaleError::EmptyCart),
        (
            SaleRequest::new(vec![SaleLineRequest::new(&item.id, 0)], "Ada", "Grace"),
            SaleError::InvalidQuantity {
                item_id: item.id.clone(),
                quantity: 0,
            },
        ),
        (
            SaleRequest::new(vec![SaleLineRequest::new(&item.id, 1)], "   ", "Grace"),
            SaleError::MissingSellerName,
        ),
        (
            SaleRequest::new(vec![SaleLineRequest::new(&item.id, 1)], "Ada", ""),
            SaleError::MissingBuyerName,
        ),
    ];

    for (request, expected) in cases {
        assert_eq!(engine.complete_sale(request).await.unwrap_err(), expected);
    }

    assert_eq!(inventory.decrements(), 0);
    assert_eq!(quantity_of(&db, &item.id).await, 5);
    assert_eq!(db.sales().count().await.unwrap(), 0);
}

// =============================================================================
// Rollback
// =============================================================================

#[tokio::test]
async fn test_insufficient_stock_records_nothing() {
    let db = database().await;
    let item = stock(&db, "Soap", 100, 2).await;

    let err = engine(&db)
        .complete_sale(sell(vec![SaleLineRequest::new(&item.id, 3)]))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        SaleError::InsufficientStock {
            item_id: item.id.clone(),
            available: 2,
            requested: 3,
        }
    );
    assert_eq!(quantity_of(&db, &item.id).await, 2);
    assert_eq!(db.sales().count().await.unwrap(), 0);
    assert!(db.receipts().list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_refused_second_line_restores_first() {
    let db = database().await;
    let soap = stock(&db, "Soap", 100, 10).await;
    let rice = stock(&db, "Rice", 1000, 1).await;
    let inventory = Arc::new(FlakyInventory::new(db.inventory()));

    let err = engine_over(&db, inventory.clone())
        .complete_sale(sell(vec![
            SaleLineRequest::new(&soap.id, 4),
            SaleLineRequest::new(&rice.id, 2),
        ]))
        .await
        .unwrap_err();

    assert!(matches!(err, SaleError::InsufficientStock { available: 1, requested: 2, .. }));
    assert_eq!(inventory.decrements(), 2);
    assert_eq!(inventory.increments(), 1);
    assert_eq!(quantity_of(&db, &soap.id).await, 10);
    assert_eq!(quantity_of(&db, &rice.id).await, 1);
    assert_eq!(db.sales().count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_unknown_item_restores_earlier_lines() {
    let db = database().await;
    let soap = stock(&db, "Soap", 100, 10).await;

    let err = engine(&db)
        .complete_sale(sell(vec![
            SaleLineRequest::new(&soap.id, 4),
            SaleLineRequest::new("no-such-item", 1),
        ]))
        .await
        .unwrap_err();

    assert_eq!(err, SaleError::ItemNotFound("no-such-item".to_string()));
    assert_eq!(quantity_of(&db, &soap.id).await, 10);
}

#[tokio::test]
async fn test_storage_fault_mid_deduction_rolls_back() {
    let db = database().await;
    let soap = stock(&db, "Soap", 100, 10).await;
    let rice = stock(&db, "Rice", 1000, 10).await;
    let inventory = Arc::new(FlakyInventory::failing_at(db.inventory(), 2));

    let err = engine_over(&db, inventory.clone())
        .complete_sale(sell(vec![
            SaleLineRequest::new(&soap.id, 3),
            SaleLineRequest::new(&rice.id, 3),
        ]))
        .await
        .unwrap_err();

    assert!(matches!(err, SaleError::TransactionFailed { .. }));
    assert!(err.is_retryable());
    assert_eq!(inventory.increments(), 1);
    assert_eq!(quantity_of(&db, &soap.id).await, 10);
    assert_eq!(quantity_of(&db, &rice.id).await, 10);
}

#[tokio::test]
async fn test_sale_write_failure_restores_stock() {
    let db = database().await;
    let soap = stock(&db, "Soap", 100, 10).await;
    let rice = stock(&db, "Rice", 1000, 10).await;

    let engine = SaleTransactionEngine::new(
        Arc::new(db.inventory()),
        Arc::new(BrokenSales),
        Arc::new(db.receipts()),
        Arc::new(db.settings()),
    );

    let err = engine
        .complete_sale(sell(vec![
            SaleLineRequest::new(&soap.id, 2),
            SaleLineRequest::new(&rice.id, 5),
        ]))
        .await
        .unwrap_err();

    assert!(matches!(err, SaleError::TransactionFailed { .. }));
    assert_eq!(err.recorded_sale_id(), None);
    assert_eq!(quantity_of(&db, &soap.id).await, 10);
    assert_eq!(quantity_of(&db, &rice.id).await, 10);
}

#[tokio::test]
async fn test_overflowing_total_rolls_back() {
    let db = database().await;
    let pricey = stock(&db, "Gold", i64::MAX / 2, 10).await;

    let err = engine(&db)
        .complete_sale(sell(vec![SaleLineRequest::new(&pricey.id, 3)]))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        SaleError::AmountOverflow {
            item_id: pricey.id.clone()
        }
    );
    assert_eq!(quantity_of(&db, &pricey.id).await, 10);
    assert_eq!(db.sales().count().await.unwrap(), 0);
}

// =============================================================================
// Receipt failure and retry
// =============================================================================

#[tokio::test]
async fn test_receipt_failure_keeps_sale_and_retry_is_idempotent() {
    let db = database().await;
    let item = stock(&db, "Soap", 100, 10).await;
    let receipts = Arc::new(FlakyReceipts::broken(db.receipts()));

    let engine = SaleTransactionEngine::new(
        Arc::new(db.inventory()),
        Arc::new(db.sales()),
        receipts.clone(),
        Arc::new(db.settings()),
    );

    let err = engine
        .complete_sale(sell(vec![SaleLineRequest::new(&item.id, 3)]))
        .await
        .unwrap_err();

    let sale_id = err.recorded_sale_id().unwrap().to_string();
    assert!(matches!(err, SaleError::ReceiptGenerationFailed { .. }));

    // Sale is durable and stock stays deducted.
    assert!(db.sales().get_by_id(&sale_id).await.unwrap().is_some());
    assert_eq!(quantity_of(&db, &item.id).await, 7);

    // Still broken: retry fails the same way and creates nothing.
    let again = engine.issue_receipt(&sale_id).await.unwrap_err();
    assert_eq!(again.recorded_sale_id(), Some(sale_id.as_str()));

    receipts.recover();
    let first = engine.issue_receipt_with(&sale_id, &shop()).await.unwrap();
    let second = engine.issue_receipt(&sale_id).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(first.total_amount.cents(), 300);
    assert_eq!(first.business_name, "Corner Shop");
    assert_eq!(db.receipts().count_for_sale(&sale_id).await.unwrap(), 1);
    assert_eq!(quantity_of(&db, &item.id).await, 7);
}

#[tokio::test]
async fn test_concurrent_receipt_retries_issue_one_receipt() {
    let db = database().await;
    let item = stock(&db, "Soap", 100, 10).await;
    let receipts = Arc::new(FlakyReceipts::broken(db.receipts()));

    let engine = SaleTransactionEngine::new(
        Arc::new(db.inventory()),
        Arc::new(db.sales()),
        receipts.clone(),
        Arc::new(db.settings()),
    );

    let err = engine
        .complete_sale(sell(vec![SaleLineRequest::new(&item.id, 1)]))
        .await
        .unwrap_err();
    let sale_id = err.recorded_sale_id().unwrap().to_string();
    receipts.recover();

    let (a, b) = tokio::join!(engine.issue_receipt(&sale_id), engine.issue_receipt(&sale_id));
    assert_eq!(a.unwrap().id, b.unwrap().id);
    assert_eq!(db.receipts().count_for_sale(&sale_id).await.unwrap(), 1);
}

#[tokio::test]
async fn test_issue_receipt_for_unknown_sale() {
    let db = database().await;

    let err = engine(&db).issue_receipt("no-such-sale").await.unwrap_err();
    assert_eq!(err, SaleError::SaleNotFound("no-such-sale".to_string()));
}

#[tokio::test]
async fn test_issue_receipt_returns_existing() {
    let db = database().await;
    let item = stock(&db, "Soap", 100, 10).await;
    let engine = engine(&db);

    let receipt = engine
        .complete_sale(sell(vec![SaleLineRequest::new(&item.id, 1)]))
        .await
        .unwrap();

    let again = engine.issue_receipt(&receipt.sale_id).await.unwrap();
    assert_eq!(again.id, receipt.id);
    assert_eq!(again.items, receipt.items);
    assert_eq!(db.receipts().count_for_sale(&receipt.sale_id).await.unwrap(), 1);
}

// =============================================================================
// Concurrency
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_sales_never_oversell() {
    let db = database().await;
    let item = stock(&db, "Soap", 100, 5).await;
    let engine = engine(&db);

    let first = engine.complete_sale(sell(vec![SaleLineRequest::new(&item.id, 3)]));
    let second = engine.complete_sale(sell(vec![SaleLineRequest::new(&item.id, 3)]));
    let (a, b) = tokio::join!(first, second);

    let outcomes = [a, b];
    let succeeded = outcomes.iter().filter(|r| r.is_ok()).count();
    assert_eq!(succeeded, 1);

    let failure = outcomes.iter().find_map(|r| r.as_ref().err()).unwrap();
    assert!(matches!(
        failure,
        SaleError::InsufficientStock { available: 2, requested: 3, .. }
    ));

    assert_eq!(quantity_of(&db, &item.id).await, 2);
    assert_eq!(db.sales().count().await.unwrap(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_many_concurrent_single_unit_sales() {
    let db = database().await;
    let item = stock(&db, "Soap", 100, 7).await;
    let engine = engine(&db);

    let mut handles = Vec::new();
    for _ in 0..12 {
        let engine = engine.clone();
        let id = item.id.clone();
        handles.push(tokio::spawn(async move {
            engine.complete_sale(sell(vec![SaleLineRequest::new(id, 1)])).await
        }));
    }

    let mut succeeded = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            succeeded += 1;
        }
    }

    assert_eq!(succeeded, 7);
    assert_eq!(quantity_of(&db, &item.id).await, 0);
    assert_eq!(db.sales().count().await.unwrap(), 7);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_two_registers_on_one_file_never_oversell() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shop.db");
    let front = Database::new(DbConfig::new(&path).max_connections(4)).await.unwrap();
    let back = Database::new(DbConfig::new(&path).max_connections(4)).await.unwrap();

    let item = stock(&front, "Soap", 100, 7).await;
    let registers = [engine(&front), engine(&back)];

    let mut handles = Vec::new();
    for n in 0..24 {
        let engine = registers[n % 2].clone();
        let id = item.id.clone();
        handles.push(tokio::spawn(async move {
            engine.complete_sale(sell(vec![SaleLineRequest::new(id, 1)])).await
        }));
    }

    let mut succeeded = 0;
    let mut refused = 0;
    let mut unexpected = Vec::new();
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => succeeded += 1,
            Err(SaleError::InsufficientStock { .. }) => refused += 1,
            Err(other) => unexpected.push(other),
        }
    }

    assert!(unexpected.is_empty(), "unexpected failures: {unexpected:?}");
    assert_eq!(succeeded, 7);
    assert_eq!(refused, 17);
    assert_eq!(quantity_of(&back, &item.id).await, 0);
    assert_eq!(front.sales().count().await.unwrap(), 7);

    front.close().await;
    back.close().await;
}
