//! Selling and sale history.

use serde_json::Value;
use stockpoint_core::Cart;
use stockpoint_engine::SaleRequest;
use tracing::{debug, info};

use crate::cli::SellArgs;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Builds a cart from live stock, then completes the sale.
///
/// The cart catches obvious problems (unknown item, more than shown in
/// stock) before anything is written. The engine re-checks stock
/// atomically, so a sale racing another register is still safe.
pub async fn sell(state: &AppState, args: SellArgs) -> AppResult<Value> {
    let inventory = state.db().inventory();
    let mut cart = Cart::new();

    for line in &args.lines {
        let item = inventory
            .get_by_id(&line.item_id)
            .await?
            .ok_or_else(|| AppError::not_found("Item", &line.item_id))?;
        cart.add_line(&item, line.quantity)?;
    }

    let total = cart.total()?;
    debug!(
        lines = cart.lines().len(),
        units = cart.total_quantity(),
        total = %total,
        "Cart built"
    );

    let request = SaleRequest::new(cart.to_sale_lines(), args.seller, args.buyer);
    let receipt = state.engine().complete_sale(request).await?;

    info!(
        sale_id = %receipt.sale_id,
        receipt_id = %receipt.id,
        total = %receipt.total_amount,
        "Sale complete"
    );
    Ok(serde_json::to_value(receipt)?)
}

pub async fn list(state: &AppState) -> AppResult<Value> {
    Ok(serde_json::to_value(state.db().sales().list_all().await?)?)
}

pub async fn show(state: &AppState, id: &str) -> AppResult<Value> {
    let sale = state
        .db()
        .sales()
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Sale", id))?;
    Ok(serde_json::to_value(sale)?)
}
