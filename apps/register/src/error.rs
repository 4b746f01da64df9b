//! # Register Error Type
//!
//! One error type for every command, carrying a machine-readable code.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SaleError ─┐                                                           │
//! │  DbError ───┤                                                           │
//! │  CoreError ─┼──► AppError { code, message } ──► stderr as JSON, exit 1  │
//! │  Validation ┤                                                           │
//! │  ConfigError┘                                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ```json
//! { "code": "INSUFFICIENT_STOCK", "message": "Insufficient stock for ..." }
//! ```

use serde::Serialize;
use stockpoint_core::{CoreError, ValidationError};
use stockpoint_db::DbError;
use stockpoint_engine::SaleError;

use crate::config::ConfigError;

/// Error returned from register commands.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable message for the operator
    pub message: String,

    /// Present when the sale was recorded but its receipt was not.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sale_id: Option<String>,
}

/// Error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotFound,
    ValidationError,
    DatabaseError,
    InsufficientStock,
    /// Storage failed mid-sale; stock was restored and the sale may be retried.
    TransactionFailed,
    /// Sale recorded, receipt missing; retry with `receipt retry`.
    ReceiptFailed,
    /// PIN missing or wrong.
    Unauthorized,
    /// Too many wrong PINs.
    LockedOut,
    ConfigError,
    Internal,
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        AppError {
            code,
            message: message.into(),
            sale_id: None,
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        AppError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::ValidationError, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::Unauthorized, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::Internal, message)
    }
}

impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => AppError::not_found(&entity, &id),
            DbError::CheckViolation(msg) => {
                AppError::validation(format!("Rejected by the database: {}", msg))
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                AppError::validation("Invalid reference")
            }
            DbError::ConnectionFailed(_) => {
                AppError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                AppError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                tracing::error!("Database query failed: {}", e);
                AppError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::Corrupt(e) => {
                tracing::error!("Corrupt record: {}", e);
                AppError::new(ErrorCode::DatabaseError, "Stored record is unreadable")
            }
            DbError::PoolExhausted => {
                AppError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                AppError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InsufficientStock { .. } => {
                AppError::new(ErrorCode::InsufficientStock, err.to_string())
            }
            CoreError::Validation(e) => AppError::validation(e.to_string()),
            CoreError::LineNotFound(_)
            | CoreError::CartTooLarge { .. }
            | CoreError::QuantityTooLarge { .. }
            | CoreError::AmountOverflow { .. } => AppError::validation(err.to_string()),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::validation(err.to_string())
    }
}

impl From<SaleError> for AppError {
    fn from(err: SaleError) -> Self {
        let code = match &err {
            SaleError::EmptyCart
            | SaleError::InvalidQuantity { .. }
            | SaleError::MissingSellerName
            | SaleError::MissingBuyerName
            | SaleError::AmountOverflow { .. } => ErrorCode::ValidationError,
            SaleError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            SaleError::ItemNotFound(_) | SaleError::SaleNotFound(_) => ErrorCode::NotFound,
            SaleError::TransactionFailed { .. } => ErrorCode::TransactionFailed,
            SaleError::ReceiptGenerationFailed { .. } => ErrorCode::ReceiptFailed,
        };

        AppError {
            code,
            message: err.to_string(),
            sale_id: err.recorded_sale_id().map(str::to_string),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::new(ErrorCode::ConfigError, err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::internal(format!("Failed to encode output: {}", err))
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {}

/// Result type for register commands.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receipt_failure_carries_sale_id() {
        let err: AppError = SaleError::ReceiptGenerationFailed {
            sale_id: "sale-1".to_string(),
            reason: "disk full".to_string(),
        }
        .into();

        assert_eq!(err.code, ErrorCode::ReceiptFailed);
        assert_eq!(err.sale_id.as_deref(), Some("sale-1"));

        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "RECEIPT_FAILED");
        assert_eq!(json["saleId"], "sale-1");
    }

    #[test]
    fn test_sale_id_omitted_when_absent() {
        let err: AppError = SaleError::EmptyCart.into();
        let json = serde_json::to_value(&err).unwrap();

        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert!(json.get("saleId").is_none());
    }

    #[test]
    fn test_db_not_found_maps_to_not_found() {
        let err: AppError = DbError::NotFound {
            entity: "InventoryItem".to_string(),
            id: "x".to_string(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "InventoryItem not found: x");
    }
}
