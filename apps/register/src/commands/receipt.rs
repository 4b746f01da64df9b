//! Receipt commands.

use serde_json::Value;
use tracing::info;

use crate::cli::ReceiptCommand;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

pub async fn run(state: &AppState, cmd: ReceiptCommand) -> AppResult<Value> {
    let receipts = state.db().receipts();

    match cmd {
        ReceiptCommand::Show { id, sale_id } => {
            let receipt = match (id, sale_id) {
                (Some(id), _) => receipts
                    .get_by_id(&id)
                    .await?
                    .ok_or_else(|| AppError::not_found("Receipt", &id))?,
                (None, Some(sale_id)) => receipts
                    .get_by_sale_id(&sale_id)
                    .await?
                    .ok_or_else(|| AppError::not_found("Receipt for sale", &sale_id))?,
                (None, None) => return Err(AppError::validation("Give a receipt id or --sale-id")),
            };
            Ok(serde_json::to_value(receipt)?)
        }

        ReceiptCommand::List => Ok(serde_json::to_value(receipts.list_all().await?)?),

        ReceiptCommand::Retry { sale_id } => {
            let receipt = state.engine().issue_receipt(&sale_id).await?;
            info!(sale_id = %sale_id, receipt_id = %receipt.id, "Receipt available");
            Ok(serde_json::to_value(receipt)?)
        }
    }
}
