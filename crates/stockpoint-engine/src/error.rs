//! # Sale Errors
//!
//! ```text
//! ┌───────────────────────────┬──────────────┬─────────────────────────────┐
//! │ Error                     │ Side effects │ Operator action             │
//! ├───────────────────────────┼──────────────┼─────────────────────────────┤
//! │ EmptyCart                 │ none         │ add lines                   │
//! │ InvalidQuantity           │ none         │ fix quantity                │
//! │ MissingSellerName         │ none         │ enter seller                │
//! │ MissingBuyerName          │ none         │ enter buyer                 │
//! │ InsufficientStock         │ rolled back  │ reduce or remove line       │
//! │ ItemNotFound              │ rolled back  │ remove line                 │
//! │ AmountOverflow            │ rolled back  │ split the sale              │
//! │ TransactionFailed         │ rolled back  │ retry the whole sale        │
//! │ ReceiptGenerationFailed   │ sale stored  │ retry receipt for sale_id   │
//! │ SaleNotFound              │ none         │ check the sale id           │
//! └───────────────────────────┴──────────────┴─────────────────────────────┘
//! ```

use thiserror::Error;

/// Errors returned by the sale transaction engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaleError {
    #[error("Cart is empty")]
    EmptyCart,

    #[error("Invalid quantity {quantity} for item {item_id}")]
    InvalidQuantity { item_id: String, quantity: i64 },

    #[error("Seller name is required")]
    MissingSellerName,

    #[error("Buyer name is required")]
    MissingBuyerName,

    /// Live stock was lower than requested when the line was deducted.
    #[error("Insufficient stock for {item_id}: available {available}, requested {requested}")]
    InsufficientStock {
        item_id: String,
        available: i64,
        requested: i64,
    },

    #[error("Item not found: {0}")]
    ItemNotFound(String),

    /// Line or sale total left the representable money range.
    #[error("Amount overflow while pricing {item_id}")]
    AmountOverflow { item_id: String },

    /// Storage failed before the sale was recorded. Stock was restored.
    #[error("Transaction failed: {reason}")]
    TransactionFailed { reason: String },

    /// The sale is recorded but its receipt is not.
    #[error("Sale {sale_id} recorded but receipt generation failed: {reason}")]
    ReceiptGenerationFailed { sale_id: String, reason: String },

    #[error("Sale not found: {0}")]
    SaleNotFound(String),
}

impl SaleError {
    /// True for transient storage failures where repeating the same call
    /// may succeed. Everything else needs the input changed first.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SaleError::TransactionFailed { .. } | SaleError::ReceiptGenerationFailed { .. }
        )
    }

    /// The sale id when the sale was durably recorded despite the error.
    pub fn recorded_sale_id(&self) -> Option<&str> {
        match self {
            SaleError::ReceiptGenerationFailed { sale_id, .. } => Some(sale_id),
            _ => None,
        }
    }

    pub(crate) fn transaction_failed(reason: impl std::fmt::Display) -> Self {
        SaleError::TransactionFailed {
            reason: reason.to_string(),
        }
    }

    pub(crate) fn receipt_failed(sale_id: &str, reason: impl std::fmt::Display) -> Self {
        SaleError::ReceiptGenerationFailed {
            sale_id: sale_id.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Result type for engine operations.
pub type SaleResult<T> = Result<T, SaleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_split() {
        assert!(SaleError::transaction_failed("disk").is_retryable());
        assert!(SaleError::receipt_failed("sale-1", "disk").is_retryable());

        assert!(!SaleError::EmptyCart.is_retryable());
        assert!(!SaleError::MissingBuyerName.is_retryable());
        assert!(!SaleError::ItemNotFound("x".to_string()).is_retryable());
        assert!(!SaleError::InsufficientStock {
            item_id: "x".to_string(),
            available: 1,
            requested: 2
        }
        .is_retryable());
    }

    #[test]
    fn test_recorded_sale_id() {
        let err = SaleError::receipt_failed("sale-1", "disk full");
        assert_eq!(err.recorded_sale_id(), Some("sale-1"));
        assert_eq!(SaleError::EmptyCart.recorded_sale_id(), None);
    }

    #[test]
    fn test_messages_name_the_culprit() {
        let err = SaleError::InvalidQuantity {
            item_id: "item-9".to_string(),
            quantity: 0,
        };
        assert_eq!(err.to_string(), "Invalid quantity 0 for item item-9");
    }
}
