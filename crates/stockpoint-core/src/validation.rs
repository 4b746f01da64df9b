//! # Validation Module
//!
//! Input validation utilities for Stockpoint.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Register CLI (clap)                                          │
//! │  └── Type validation (argument parsing)                                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE: Business rule validation                        │
//! │  ├── item fields before insert/update                                  │
//! │  └── seller/buyer names, PIN format                                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  └── CHECK (quantity >= 0), CHECK (unit_price_cents >= 0)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockpoint_core::validation::{validate_item_name, validate_quantity};
//!
//! validate_item_name("Rice 5kg").unwrap();
//! validate_quantity(5).unwrap();
//! ```

use crate::error::ValidationError;
use crate::types::{InventoryItemPatch, NewInventoryItem};
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted item name.
pub const MAX_ITEM_NAME_LEN: usize = 200;

/// Longest accepted seller or buyer name.
pub const MAX_PARTY_NAME_LEN: usize = 100;

/// PIN length bounds (digits).
pub const MIN_PIN_LEN: usize = 4;
pub const MAX_PIN_LEN: usize = 8;

// =============================================================================
// String Validators
// =============================================================================

/// Validates an inventory item name.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 200 characters
///
/// ## Example
/// ```rust
/// use stockpoint_core::validation::validate_item_name;
///
/// assert!(validate_item_name("Rice 5kg").is_ok());
/// assert!(validate_item_name("   ").is_err());
/// ```
pub fn validate_item_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_ITEM_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_ITEM_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a seller or buyer name and returns it trimmed.
///
/// ## Returns
/// The trimmed name, which is what gets stored on the sale.
pub fn validate_party_name(field: &str, name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.chars().count() > MAX_PARTY_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_PARTY_NAME_LEN,
        });
    }

    Ok(name.to_string())
}

/// Validates a PIN: 4 to 8 ASCII digits.
///
/// ## Example
/// ```rust
/// use stockpoint_core::validation::validate_pin;
///
/// assert!(validate_pin("1234").is_ok());
/// assert!(validate_pin("12a4").is_err());
/// assert!(validate_pin("123").is_err());
/// ```
pub fn validate_pin(pin: &str) -> ValidationResult<()> {
    if pin.is_empty() {
        return Err(ValidationError::Required {
            field: "pin".to_string(),
        });
    }

    if !pin.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "pin".to_string(),
            reason: "must contain only digits".to_string(),
        });
    }

    if pin.len() < MIN_PIN_LEN {
        return Err(ValidationError::TooShort {
            field: "pin".to_string(),
            min: MIN_PIN_LEN,
        });
    }

    if pin.len() > MAX_PIN_LEN {
        return Err(ValidationError::TooLong {
            field: "pin".to_string(),
            max: MAX_PIN_LEN,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a cart or sale-line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Cart: Add Line                                                         │
/// │                                                                         │
/// │  Operator enters quantity: 5                                           │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_quantity(5) ← THIS FUNCTION                                  │
/// │       │                                                                 │
/// │       ├── qty <= 0? → Error: "quantity must be positive"               │
/// │       ├── qty > 999? → Error: "quantity must be between 1 and 999"     │
/// │       └── OK → Proceed with add_line                                   │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a stock level. Zero is a valid (sold out) level.
pub fn validate_stock_quantity(qty: i64) -> ValidationResult<()> {
    if qty < 0 {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a low-stock threshold.
pub fn validate_low_stock_threshold(threshold: i64) -> ValidationResult<()> {
    if threshold < 0 {
        return Err(ValidationError::OutOfRange {
            field: "low stock threshold".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a price in cents.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free items)
///
/// ## Example
/// ```rust
/// use stockpoint_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents(1099).is_ok());
/// assert!(validate_price_cents(0).is_ok());
/// assert!(validate_price_cents(-100).is_err());
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates cart size before a new line is appended.
pub fn validate_cart_size(current_items: usize) -> ValidationResult<()> {
    if current_items >= MAX_CART_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "cart items".to_string(),
            min: 0,
            max: MAX_CART_ITEMS as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Record Validators
// =============================================================================

/// Validates every field of a new inventory item.
pub fn validate_new_item(item: &NewInventoryItem) -> ValidationResult<()> {
    validate_item_name(&item.name)?;
    validate_price_cents(item.unit_price.cents())?;
    validate_stock_quantity(item.quantity)?;
    validate_low_stock_threshold(item.low_stock_threshold)?;
    Ok(())
}

/// Validates the fields present in an item patch.
pub fn validate_item_patch(patch: &InventoryItemPatch) -> ValidationResult<()> {
    if let Some(name) = &patch.name {
        validate_item_name(name)?;
    }
    if let Some(price) = patch.unit_price {
        validate_price_cents(price.cents())?;
    }
    if let Some(quantity) = patch.quantity {
        validate_stock_quantity(quantity)?;
    }
    if let Some(threshold) = patch.low_stock_threshold {
        validate_low_stock_threshold(threshold)?;
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
