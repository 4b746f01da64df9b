//! # Cart Builder
//!
//! The in-progress selection for one checkout session.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Operator Action          Cart Method            State Change           │
//! │  ───────────────          ───────────            ────────────           │
//! │                                                                         │
//! │  Pick item ──────────────► add_line() ─────────► push or qty += n      │
//! │                                                                         │
//! │  +1 / -1 ────────────────► adjust_line() ──────► qty += delta          │
//! │                                                  (qty <= 0 removes)     │
//! │                                                                         │
//! │  Remove ─────────────────► remove_line() ──────► lines.remove(i)       │
//! │                                                                         │
//! │  Checkout ───────────────► to_sale_lines() ────► engine input          │
//! │                                                                         │
//! │  NOTE: Stock checks here use the quantity known when the item was      │
//! │        added. They are advisory; the sale engine re-checks against     │
//! │        live stock when it deducts.                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{InventoryItem, SaleLineRequest};
use crate::validation::{validate_cart_size, validate_quantity};
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

/// One line of the cart.
///
/// Name and price are frozen when the line is first added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub item_id: String,
    pub item_name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub line_total: Money,
    /// Stock level the cart knew about when the item was (last) added.
    pub available_at_add: i64,
}

impl CartLine {
    fn set_quantity(&mut self, quantity: i64) -> CoreResult<()> {
        let line_total = self
            .unit_price
            .checked_mul_quantity(quantity)
            .ok_or_else(|| CoreError::AmountOverflow {
                item_id: self.item_id.clone(),
            })?;
        self.quantity = quantity;
        self.line_total = line_total;
        Ok(())
    }
}

/// The cart.
///
/// ## Invariants
/// - Lines are unique by `item_id` (adding the same item increases quantity)
/// - Every line quantity is in `1..=MAX_ITEM_QUANTITY`
/// - At most `MAX_CART_ITEMS` lines
/// - `total()` is always the sum of the current line totals
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { lines: Vec::new() }
    }

    /// Adds `requested_qty` of `item`, or increases the existing line.
    ///
    /// The combined quantity is checked against `item.quantity`, which also
    /// becomes the line's new known availability. On error the cart is
    /// unchanged.
    pub fn add_line(&mut self, item: &InventoryItem, requested_qty: i64) -> CoreResult<()> {
        validate_quantity(requested_qty)?;

        if let Some(line) = self.lines.iter_mut().find(|l| l.item_id == item.id) {
            let new_qty = line.quantity + requested_qty;
            check_bounds(&item.id, new_qty, item.quantity)?;
            line.set_quantity(new_qty)?;
            line.available_at_add = item.quantity;
            return Ok(());
        }

        validate_cart_size(self.lines.len()).map_err(|_| CoreError::CartTooLarge {
            max: MAX_CART_ITEMS,
        })?;
        check_bounds(&item.id, requested_qty, item.quantity)?;

        let mut line = CartLine {
            item_id: item.id.clone(),
            item_name: item.name.clone(),
            quantity: 0,
            unit_price: item.unit_price,
            line_total: Money::zero(),
            available_at_add: item.quantity,
        };
        line.set_quantity(requested_qty)?;
        self.lines.push(line);
        Ok(())
    }

    /// Changes the quantity of line `index` by `delta`.
    ///
    /// A resulting quantity of zero or less removes the line.
    pub fn adjust_line(&mut self, index: usize, delta: i64) -> CoreResult<()> {
        let line = self
            .lines
            .get_mut(index)
            .ok_or(CoreError::LineNotFound(index))?;

        let new_qty = line.quantity.saturating_add(delta);
        if new_qty <= 0 {
            self.lines.remove(index);
            return Ok(());
        }

        check_bounds(&line.item_id, new_qty, line.available_at_add)?;
        line.set_quantity(new_qty)
    }

    /// Removes line `index`.
    pub fn remove_line(&mut self, index: usize) -> CoreResult<CartLine> {
        if index >= self.lines.len() {
            return Err(CoreError::LineNotFound(index));
        }
        Ok(self.lines.remove(index))
    }

    /// Sum of line totals.
    ///
    /// Fails with `AmountOverflow` naming the line that pushed the sum out
    /// of range.
    pub fn total(&self) -> CoreResult<Money> {
        self.lines.iter().try_fold(Money::zero(), |acc, line| {
            acc.checked_add(line.line_total)
                .ok_or_else(|| CoreError::AmountOverflow {
                    item_id: line.item_id.clone(),
                })
        })
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Returns the total quantity of all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Engine input for checkout, in cart order.
    pub fn to_sale_lines(&self) -> Vec<SaleLineRequest> {
        self.lines
            .iter()
            .map(|l| SaleLineRequest::new(l.item_id.clone(), l.quantity))
            .collect()
    }
}

fn check_bounds(item_id: &str, requested: i64, available: i64) -> CoreResult<()> {
    if requested > MAX_ITEM_QUANTITY {
        return Err(CoreError::QuantityTooLarge {
            requested,
            max: MAX_ITEM_QUANTITY,
        });
    }
    if requested > available {
        return Err(CoreError::InsufficientStock {
            item_id: item_id.to_string(),
            available,
            requested,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
