//! Business identity settings.

use std::collections::BTreeMap;

use serde_json::{json, Value};
use stockpoint_core::validation::validate_party_name;
use stockpoint_db::setting_keys as keys;
use tracing::info;

use crate::cli::SettingsCommand;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

const MAX_ADDRESS_LEN: usize = 200;

pub async fn run(state: &AppState, cmd: SettingsCommand) -> AppResult<Value> {
    let settings = state.settings();

    match cmd {
        SettingsCommand::Show => {
            let stored: BTreeMap<String, String> =
                settings.list_public().await?.into_iter().collect();
            let business = settings.business_snapshot().await?;
            Ok(json!({ "stored": stored, "business": business }))
        }

        SettingsCommand::Set { key, value } => {
            if !keys::EDITABLE.contains(&key.as_str()) {
                return Err(AppError::validation(format!(
                    "Unknown setting '{}'; editable: {}",
                    key,
                    keys::EDITABLE.join(", ")
                )));
            }

            let value = if key == keys::BUSINESS_NAME {
                validate_party_name(keys::BUSINESS_NAME, &value)?
            } else {
                let value = value.trim().to_string();
                if value.chars().count() > MAX_ADDRESS_LEN {
                    return Err(AppError::validation(format!(
                        "{} must be at most {} characters",
                        key, MAX_ADDRESS_LEN
                    )));
                }
                value
            };

            settings.set(&key, &value).await?;
            info!(key = %key, "Setting updated");
            Ok(json!({ "key": key, "value": value }))
        }
    }
}
