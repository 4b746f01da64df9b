//! # Sale Transaction Engine
//!
//! ## Processing Order
//! ```text
//! complete_sale(request)
//!   │
//!   ├─ 1. validate (caller's task, no side effects)
//!   │
//!   └─ tokio::spawn ─────────────────────────────────────────────────┐
//!        2. for each line, in cart order:                            │
//!             conditional_decrement(item, qty)                       │
//!             refused / missing / fault ─► reverse applied lines     │
//!        3. build Sale (frozen name + price, exact total)            │
//!        4. sales.add ── fault ─► reverse all lines                  │
//!        5. receipts.add ── fault ─► sale stays, ReceiptGeneration-  │
//!                                    Failed { sale_id }              │
//!        6. Ok(receipt)                                              │
//!   ◄────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Once deduction starts the attempt runs to completion on its own task,
//! so dropping the caller's future cannot strand applied decrements.

use std::sync::Arc;

use stockpoint_core::{
    sum_line_totals, BusinessSnapshot, DecrementOutcome, InventoryItem, InventoryStore, NewReceipt,
    NewSale, Receipt, ReceiptStore, Sale, SaleLineItem, SaleLineRequest, SaleStore,
    SettingsProvider,
};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::error::{SaleError, SaleResult};
use crate::state::{AttemptTracker, SaleAttemptState};

// =============================================================================
// Request
// =============================================================================

/// Input to [`SaleTransactionEngine::complete_sale`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleRequest {
    /// `{item_id, quantity}` pairs in cart order.
    pub lines: Vec<SaleLineRequest>,
    pub seller_name: String,
    pub buyer_name: String,
    /// Business identity for the receipt. `None` reads the settings
    /// provider when the receipt is built.
    pub business: Option<BusinessSnapshot>,
}

impl SaleRequest {
    pub fn new(
        lines: Vec<SaleLineRequest>,
        seller_name: impl Into<String>,
        buyer_name: impl Into<String>,
    ) -> Self {
        SaleRequest {
            lines,
            seller_name: seller_name.into(),
            buyer_name: buyer_name.into(),
            business: None,
        }
    }

    pub fn with_business(mut self, business: BusinessSnapshot) -> Self {
        self.business = Some(business);
        self
    }
}

/// A request that passed validation. Names are trimmed.
#[derive(Debug, Clone)]
struct ValidatedSale {
    lines: Vec<SaleLineRequest>,
    seller_name: String,
    buyer_name: String,
    business: Option<BusinessSnapshot>,
}

fn validate(request: SaleRequest) -> SaleResult<ValidatedSale> {
    if request.lines.is_empty() {
        return Err(SaleError::EmptyCart);
    }

    if let Some(bad) = request.lines.iter().find(|l| l.quantity <= 0) {
        return Err(SaleError::InvalidQuantity {
            item_id: bad.item_id.clone(),
            quantity: bad.quantity,
        });
    }

    let seller_name = request.seller_name.trim();
    if seller_name.is_empty() {
        return Err(SaleError::MissingSellerName);
    }

    let buyer_name = request.buyer_name.trim();
    if buyer_name.is_empty() {
        return Err(SaleError::MissingBuyerName);
    }

    Ok(ValidatedSale {
        seller_name: seller_name.to_string(),
        buyer_name: buyer_name.to_string(),
        lines: request.lines,
        business: request.business,
    })
}

// =============================================================================
// Engine
// =============================================================================

/// Orchestrates stock deduction, sale recording and receipt issuing.
///
/// Cheap to clone; clones share the same stores and receipt lock.
#[derive(Clone)]
pub struct SaleTransactionEngine {
    inventory: Arc<dyn InventoryStore>,
    sales: Arc<dyn SaleStore>,
    receipts: Arc<dyn ReceiptStore>,
    settings: Arc<dyn SettingsProvider>,
    /// Serializes check-then-insert on receipts so a sale gets one.
    receipt_lock: Arc<Mutex<()>>,
}

impl std::fmt::Debug for SaleTransactionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaleTransactionEngine").finish_non_exhaustive()
    }
}

impl SaleTransactionEngine {
    pub fn new(
        inventory: Arc<dyn InventoryStore>,
        sales: Arc<dyn SaleStore>,
        receipts: Arc<dyn ReceiptStore>,
        settings: Arc<dyn SettingsProvider>,
    ) -> Self {
        SaleTransactionEngine {
            inventory,
            sales,
            receipts,
            settings,
            receipt_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Completes a sale and returns its receipt.
    ///
    /// ## Errors
    /// * `EmptyCart`, `InvalidQuantity`, `MissingSellerName`,
    ///   `MissingBuyerName` - nothing was touched
    /// * `InsufficientStock`, `ItemNotFound`, `AmountOverflow`,
    ///   `TransactionFailed` - every applied decrement was reversed
    /// * `ReceiptGenerationFailed { sale_id }` - the sale is recorded;
    ///   call [`issue_receipt`](Self::issue_receipt) with `sale_id`
    pub async fn complete_sale(&self, request: SaleRequest) -> SaleResult<Receipt> {
        let mut attempt = AttemptTracker::new();

        let sale = match validate(request) {
            Ok(sale) => sale,
            Err(e) => {
                warn!(attempt = %attempt.id(), error = %e, "Sale rejected");
                attempt.advance(SaleAttemptState::Failed);
                return Err(e);
            }
        };

        let engine = self.clone();
        let handle = tokio::spawn(async move { engine.run_attempt(attempt, sale).await });

        match handle.await {
            Ok(result) => result,
            Err(join_err) => {
                error!(error = %join_err, "Sale task did not finish");
                Err(SaleError::transaction_failed(format!(
                    "sale task did not finish: {join_err}"
                )))
            }
        }
    }

    /// Returns the receipt for `sale_id`, creating it if none exists.
    ///
    /// Safe to call any number of times; a sale never gets a second receipt.
    /// The business snapshot comes from the settings provider.
    pub async fn issue_receipt(&self, sale_id: &str) -> SaleResult<Receipt> {
        self.issue_receipt_inner(sale_id, None).await
    }

    /// Like [`issue_receipt`](Self::issue_receipt), with an explicit
    /// business snapshot for a newly created receipt.
    pub async fn issue_receipt_with(
        &self,
        sale_id: &str,
        business: &BusinessSnapshot,
    ) -> SaleResult<Receipt> {
        self.issue_receipt_inner(sale_id, Some(business)).await
    }

    async fn issue_receipt_inner(
        &self,
        sale_id: &str,
        business: Option<&BusinessSnapshot>,
    ) -> SaleResult<Receipt> {
        let _guard = self.receipt_lock.lock().await;

        if let Some(existing) = self
            .receipts
            .get_by_sale_id(sale_id)
            .await
            .map_err(|e| SaleError::receipt_failed(sale_id, e))?
        {
            info!(sale_id = %sale_id, receipt_id = %existing.id, "Receipt already issued");
            return Ok(existing);
        }

        let sale = self
            .sales
            .get_by_id(sale_id)
            .await
            .map_err(|e| SaleError::receipt_failed(sale_id, e))?
            .ok_or_else(|| SaleError::SaleNotFound(sale_id.to_string()))?;

        let business = match business {
            Some(business) => business.clone(),
            None => self
                .settings
                .business_snapshot()
                .await
                .map_err(|e| SaleError::receipt_failed(sale_id, e))?,
        };

        self.insert_receipt(&sale, &business).await
    }

    // -------------------------------------------------------------------------
    // Attempt
    // -------------------------------------------------------------------------

    async fn run_attempt(
        &self,
        mut attempt: AttemptTracker,
        request: ValidatedSale,
    ) -> SaleResult<Receipt> {
        attempt.advance(SaleAttemptState::Deducting);

        let mut applied: Vec<(String, i64)> = Vec::with_capacity(request.lines.len());
        let mut items: Vec<SaleLineItem> = Vec::with_capacity(request.lines.len());

        for line in &request.lines {
            let item = match self.deduct_line(line).await {
                Ok(item) => item,
                Err(e) => return Err(self.abort(&mut attempt, &applied, e).await),
            };
            applied.push((line.item_id.clone(), line.quantity));

            // Name and price are frozen from the row the decrement returned.
            match SaleLineItem::capture(&item, line.quantity) {
                Some(captured) => items.push(captured),
                None => {
                    let overflow = SaleError::AmountOverflow {
                        item_id: line.item_id.clone(),
                    };
                    return Err(self.abort(&mut attempt, &applied, overflow).await);
                }
            }
        }

        let Some(total_amount) = sum_line_totals(&items) else {
            let overflow = SaleError::AmountOverflow {
                item_id: items.last().map(|l| l.item_id.clone()).unwrap_or_default(),
            };
            return Err(self.abort(&mut attempt, &applied, overflow).await);
        };

        attempt.advance(SaleAttemptState::Recording);

        let new_sale = NewSale {
            items,
            total_amount,
            seller_name: request.seller_name,
            buyer_name: request.buyer_name,
        };

        let sale = match self.sales.add(new_sale).await {
            Ok(sale) => sale,
            Err(e) => {
                let failed = SaleError::transaction_failed(e);
                return Err(self.abort(&mut attempt, &applied, failed).await);
            }
        };

        info!(
            attempt = %attempt.id(),
            sale_id = %sale.id,
            lines = sale.items.len(),
            total = %sale.total_amount,
            "Sale recorded"
        );

        attempt.advance(SaleAttemptState::ReceiptPending);

        let business = match request.business {
            Some(business) => Ok(business),
            None => self
                .settings
                .business_snapshot()
                .await
                .map_err(|e| SaleError::receipt_failed(&sale.id, e)),
        };

        let receipt = match business {
            Ok(business) => {
                let _guard = self.receipt_lock.lock().await;
                self.insert_receipt(&sale, &business).await
            }
            Err(e) => Err(e),
        };

        match receipt {
            Ok(receipt) => {
                attempt.advance(SaleAttemptState::Complete);
                Ok(receipt)
            }
            Err(e) => {
                warn!(
                    attempt = %attempt.id(),
                    sale_id = %sale.id,
                    error = %e,
                    "Sale recorded without receipt"
                );
                attempt.advance(SaleAttemptState::CompleteWithoutReceipt);
                Err(e)
            }
        }
    }

    /// Deducts one line, returning the item row after the decrement.
    async fn deduct_line(&self, line: &SaleLineRequest) -> SaleResult<InventoryItem> {
        let outcome = self
            .inventory
            .conditional_decrement(&line.item_id, line.quantity)
            .await
            .map_err(SaleError::transaction_failed)?;

        match outcome {
            DecrementOutcome::Decremented(item) => {
                if item.is_low_stock() {
                    info!(item_id = %item.id, remaining = item.quantity, "Item is low on stock");
                }
                Ok(item)
            }
            DecrementOutcome::InsufficientStock { available } => {
                Err(SaleError::InsufficientStock {
                    item_id: line.item_id.clone(),
                    available,
                    requested: line.quantity,
                })
            }
            DecrementOutcome::NotFound => Err(SaleError::ItemNotFound(line.item_id.clone())),
        }
    }

    /// Reverses applied decrements, newest first, and hands back `cause`.
    ///
    /// A failed increment is logged and skipped; the caller still sees the
    /// error that triggered the rollback.
    async fn abort(
        &self,
        attempt: &mut AttemptTracker,
        applied: &[(String, i64)],
        cause: SaleError,
    ) -> SaleError {
        warn!(
            attempt = %attempt.id(),
            error = %cause,
            applied = applied.len(),
            "Sale attempt failed, rolling back"
        );
        attempt.advance(SaleAttemptState::RolledBack);

        for (item_id, quantity) in applied.iter().rev() {
            if let Err(e) = self.inventory.increment(item_id, *quantity).await {
                error!(
                    attempt = %attempt.id(),
                    item_id = %item_id,
                    quantity = *quantity,
                    error = %e,
                    "Compensating increment failed, stock is short"
                );
            }
        }

        attempt.advance(SaleAttemptState::Failed);
        cause
    }

    async fn insert_receipt(&self, sale: &Sale, business: &BusinessSnapshot) -> SaleResult<Receipt> {
        let receipt = self
            .receipts
            .add(NewReceipt::for_sale(sale, business))
            .await
            .map_err(|e| SaleError::receipt_failed(&sale.id, e))?;

        info!(
            sale_id = %sale.id,
            receipt_id = %receipt.id,
            total = %receipt.total_amount,
            "Receipt issued"
        );
        Ok(receipt)
    }
}
