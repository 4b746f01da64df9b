//! # stockpoint-engine: Sale Transaction Engine
//!
//! Converts a validated cart plus seller/buyer identity into durable Sale
//! and Receipt records, deducting inventory exactly once per line.
//!
//! ## Attempt Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Validating ──► Deducting ──► Recording ──► ReceiptPending ──► Complete │
//! │      │              │             │               │                     │
//! │      │ (no effects) │ refused     │ store failed  │ store failed        │
//! │      ▼              ▼             ▼               ▼                     │
//! │   Failed        RolledBack ──► Failed      CompleteWithoutReceipt      │
//! │                 (compensating                (sale durable,             │
//! │                  increments)                  retry issue_receipt)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```rust,ignore
//! let engine = SaleTransactionEngine::new(inventory, sales, receipts, settings);
//! let receipt = engine
//!     .complete_sale(SaleRequest::new(cart.to_sale_lines(), "Ada", "Grace"))
//!     .await?;
//! ```

pub mod engine;
pub mod error;
pub mod state;

pub use engine::{SaleRequest, SaleTransactionEngine};
pub use error::{SaleError, SaleResult};
pub use state::SaleAttemptState;
