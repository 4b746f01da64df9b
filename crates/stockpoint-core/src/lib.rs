//! # stockpoint-core: Pure Business Logic for Stockpoint
//!
//! This crate is the **heart** of Stockpoint. It contains the domain types,
//! money arithmetic, cart building and the storage contracts that the sale
//! engine is written against. Nothing in here performs I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockpoint Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    apps/register (CLI)                          │   │
//! │  │    item add ──► sell ──► receipt show / retry                   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    stockpoint-engine                            │   │
//! │  │    complete_sale, issue_receipt                                 │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ (store traits)                         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ stockpoint-core (THIS CRATE) ★                  │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │   store   │  │   │
//! │  │   │ Inventory │  │   Money   │  │   Cart    │  │  traits   │  │   │
//! │  │   │ Sale/Rcpt │  │           │  │ CartLine  │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                ▲                                        │
//! │  ┌─────────────────────────────┴───────────────────────────────────┐   │
//! │  │                 stockpoint-db (implements store)                │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (InventoryItem, Sale, Receipt, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - Cart builder with advisory stock checks
//! - [`store`] - Storage contracts consumed by the sale engine
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use stockpoint_core::money::Money;
//!
//! let price = Money::from_cents(100);
//! let line_total = price.checked_mul_quantity(3).unwrap();
//! assert_eq!(line_total.cents(), 300);
//! ```

pub mod cart;
pub mod error;
pub mod money;
pub mod store;
pub mod types;
pub mod validation;

// Re-exports so callers can write `use stockpoint_core::Money`
pub use cart::{Cart, CartLine};
pub use error::{CoreError, CoreResult, StoreError, StoreResult, ValidationError};
pub use money::Money;
pub use store::{DecrementOutcome, InventoryStore, ReceiptStore, SaleStore, SettingsProvider};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines allowed in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single item in a cart line.
///
/// Guards against typing 1000 instead of 10.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Low-stock threshold applied when an item is created without one.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 5;
