//! PIN commands.

use serde_json::{json, Value};
use tracing::info;

use crate::cli::PinCommand;
use crate::error::AppResult;
use crate::state::AppState;

pub async fn run(state: &AppState, pin: Option<&str>, cmd: PinCommand) -> AppResult<Value> {
    match cmd {
        PinCommand::Set { new_pin } => {
            // First-time setup needs no PIN; changing one does.
            if state.pins().is_configured().await? {
                state.pins().require(pin).await?;
            } else {
                info!("Setting initial PIN");
            }
            state.pins().set_pin(&new_pin).await?;
            Ok(json!({ "pinSet": true }))
        }
        PinCommand::Status => {
            let configured = state.pins().is_configured().await?;
            let lockout = state.pins().lockout_status().await?;
            Ok(json!({ "configured": configured, "lockout": lockout }))
        }
    }
}
