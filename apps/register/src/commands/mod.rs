//! # Register Commands
//!
//! ```text
//! commands/
//! ├── mod.rs       ◄─── dispatch + PIN gating
//! ├── pin.rs       ◄─── pin set / status
//! ├── item.rs      ◄─── inventory CRUD, low stock
//! ├── sale.rs      ◄─── sell, sale list / show
//! ├── receipt.rs   ◄─── receipt show / list / retry
//! └── settings.rs  ◄─── business identity
//! ```
//!
//! Every handler returns a JSON value that `main` prints to stdout.
//! Commands that change data call [`require_pin`] first.

pub mod item;
pub mod pin;
pub mod receipt;
pub mod sale;
pub mod settings;

use serde_json::Value;

use crate::cli::{Command, ItemCommand, ReceiptCommand, SaleCommand, SettingsCommand};
use crate::error::AppResult;
use crate::state::AppState;

/// Runs one command.
pub async fn dispatch(state: &AppState, pin: Option<&str>, command: Command) -> AppResult<Value> {
    match command {
        Command::Pin(cmd) => pin::run(state, pin, cmd).await,

        Command::Item(cmd) => {
            if !matches!(cmd, ItemCommand::List | ItemCommand::LowStock) {
                require_pin(state, pin).await?;
            }
            item::run(state, cmd).await
        }

        Command::Sell(args) => {
            require_pin(state, pin).await?;
            sale::sell(state, args).await
        }

        Command::Sale(cmd) => match cmd {
            SaleCommand::List => sale::list(state).await,
            SaleCommand::Show { id } => sale::show(state, &id).await,
        },

        Command::Receipt(cmd) => {
            if matches!(cmd, ReceiptCommand::Retry { .. }) {
                require_pin(state, pin).await?;
            }
            receipt::run(state, cmd).await
        }

        Command::Settings(cmd) => {
            if matches!(cmd, SettingsCommand::Set { .. }) {
                require_pin(state, pin).await?;
            }
            settings::run(state, cmd).await
        }
    }
}

async fn require_pin(state: &AppState, pin: Option<&str>) -> AppResult<()> {
    state.pins().require(pin).await
}
