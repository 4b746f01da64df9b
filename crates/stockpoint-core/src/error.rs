//! # Error Types
//!
//! Domain-specific error types for stockpoint-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  stockpoint-core errors (this file)                                    │
//! │  ├── CoreError        - Cart and domain rule violations                │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  └── StoreError       - What a store implementation reports            │
//! │                                                                         │
//! │  stockpoint-db        DbError   ──► StoreError                         │
//! │  stockpoint-engine    SaleError (wraps StoreError)                     │
//! │  apps/register        AppError  (what the operator sees)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Requested quantity exceeds the known available stock.
    ///
    /// ## User Workflow
    /// ```text
    /// Add to Cart (qty: 5)
    ///      │
    ///      ▼
    /// Known stock: available=3
    ///      │
    ///      ▼
    /// InsufficientStock { item_id, available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// Operator sees: "Only 3 in stock"
    /// ```
    #[error("Insufficient stock for {item_id}: available {available}, requested {requested}")]
    InsufficientStock {
        item_id: String,
        available: i64,
        requested: i64,
    },

    /// Cart line index does not exist.
    #[error("Cart line {0} does not exist")]
    LineNotFound(usize),

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Item quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Money arithmetic left the representable range.
    #[error("Amount overflow while pricing {item_id}")]
    AmountOverflow { item_id: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, non-digit PIN).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Store Error
// =============================================================================

/// Errors reported by store implementations.
///
/// Storage-agnostic on purpose: the engine only needs to know whether a
/// record was missing or the backend failed.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Stored data violates a constraint (e.g. negative quantity).
    #[error("Constraint violated: {0}")]
    Constraint(String),

    /// The backend could not complete the operation. Safe to retry.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

/// Result type returned by store contracts.
pub type StoreResult<T> = Result<T, StoreError>;
