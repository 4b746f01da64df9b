//! # Stockpoint Register
//!
//! Operator CLI for a single shop: PIN gate, inventory, selling and
//! receipts, all over one SQLite file.
//!
//! ## Module Organization
//! ```text
//! stockpoint_register/
//! ├── lib.rs          ◄─── You are here (startup + run)
//! ├── cli.rs          ◄─── clap definitions
//! ├── config.rs       ◄─── layered RegisterConfig
//! ├── auth.rs         ◄─── PinGate (argon2, lockout)
//! ├── state.rs        ◄─── database, engine, PIN gate
//! ├── commands/       ◄─── one module per subcommand
//! └── error.rs        ◄─── AppError { code, message }
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Parse arguments (clap)                                              │
//! │  2. Initialize logging (RUST_LOG, default info,stockpoint=debug)        │
//! │  3. Load config: defaults ► stockpoint.toml ► STOCKPOINT_* env          │
//! │  4. Open database (WAL, migrations)                                     │
//! │  5. Run the command, print JSON to stdout                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod state;

use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use config::RegisterConfig;
use error::AppResult;
use state::AppState;

/// Runs one CLI invocation and returns its JSON output.
pub async fn run(cli: Cli) -> AppResult<Value> {
    let config = RegisterConfig::load(cli.config.as_deref())?;
    info!(db_path = %config.database_path.display(), "Configuration loaded");

    let state = AppState::open(&config).await?;
    let output = commands::dispatch(&state, cli.pin.as_deref(), cli.command).await;

    state.db().close().await;
    output
}

/// Initializes the tracing subscriber.
///
/// Logs go to stderr so stdout stays clean JSON.
///
/// - `RUST_LOG=debug` - everything at debug
/// - `RUST_LOG=stockpoint_engine=trace` - one crate only
/// - Default: `info,stockpoint=debug,sqlx=warn`
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,stockpoint=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
