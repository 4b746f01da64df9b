//! Inventory commands.

use serde_json::{json, Value};
use stockpoint_core::validation::{validate_item_patch, validate_new_item};
use stockpoint_core::{InventoryItemPatch, NewInventoryItem};
use tracing::info;

use crate::cli::ItemCommand;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

pub async fn run(state: &AppState, cmd: ItemCommand) -> AppResult<Value> {
    let inventory = state.db().inventory();

    match cmd {
        ItemCommand::Add {
            name,
            price,
            quantity,
            category,
            low_stock_threshold,
        } => {
            let mut item = NewInventoryItem::new(name, price, quantity).with_category(category);
            if let Some(threshold) = low_stock_threshold {
                item = item.with_low_stock_threshold(threshold);
            }
            validate_new_item(&item)?;

            let created = inventory.create(item).await?;
            info!(item_id = %created.id, name = %created.name, "Item added");
            Ok(serde_json::to_value(created)?)
        }

        ItemCommand::Edit {
            id,
            name,
            category,
            price,
            quantity,
            low_stock_threshold,
        } => {
            let patch = InventoryItemPatch {
                name,
                category,
                unit_price: price,
                quantity,
                low_stock_threshold,
            };
            if patch.is_empty() {
                return Err(AppError::validation("Nothing to change"));
            }
            validate_item_patch(&patch)?;

            let updated = inventory.update(&id, patch).await?;
            info!(item_id = %updated.id, "Item updated");
            Ok(serde_json::to_value(updated)?)
        }

        ItemCommand::Delete { id } => {
            inventory.delete(&id).await?;
            info!(item_id = %id, "Item deleted");
            Ok(json!({ "deleted": id }))
        }

        ItemCommand::List => Ok(serde_json::to_value(inventory.list_all().await?)?),

        ItemCommand::LowStock => Ok(serde_json::to_value(inventory.list_low_stock().await?)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::state;
    use crate::error::ErrorCode;
    use stockpoint_core::Money;

    fn add(name: &str, quantity: i64, threshold: Option<i64>) -> ItemCommand {
        ItemCommand::Add {
            name: name.to_string(),
            price: Money::from_cents(250),
            quantity,
            category: "Grocery".to_string(),
            low_stock_threshold: threshold,
        }
    }

    #[tokio::test]
    async fn test_add_edit_delete() {
        let state = state().await;

        let created = run(&state, add("Soap", 10, None)).await.unwrap();
        let id = created["id"].as_str().unwrap().to_string();
        assert_eq!(created["unitPrice"], 250);
        assert_eq!(created["lowStockThreshold"], 5);

        let edited = run(
            &state,
            ItemCommand::Edit {
                id: id.clone(),
                name: Some("Bar Soap".to_string()),
                category: None,
                price: Some(Money::from_cents(300)),
                quantity: None,
                low_stock_threshold: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(edited["name"], "Bar Soap");
        assert_eq!(edited["unitPrice"], 300);
        assert_eq!(edited["quantity"], 10);

        run(&state, ItemCommand::Delete { id: id.clone() }).await.unwrap();
        let err = run(&state, ItemCommand::Delete { id }).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_add_rejects_bad_input() {
        let state = state().await;
        let err = run(&state, add("   ", 1, None)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = run(&state, add("Soap", -1, None)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_empty_edit_rejected() {
        let state = state().await;
        let err = run(
            &state,
            ItemCommand::Edit {
                id: "x".to_string(),
                name: None,
                category: None,
                price: None,
                quantity: None,
                low_stock_threshold: None,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_low_stock() {
        let state = state().await;
        run(&state, add("Soap", 10, Some(3))).await.unwrap();
        run(&state, add("Rice", 2, Some(3))).await.unwrap();

        let low = run(&state, ItemCommand::LowStock).await.unwrap();
        let low = low.as_array().unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0]["name"], "Rice");
    }
}
