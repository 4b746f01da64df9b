//! Register configuration.
//!
//! Layers, later wins:
//! 1. Built-in defaults
//! 2. `stockpoint.toml` in the working directory, or the `--config` path
//! 3. `STOCKPOINT_*` environment variables (`STOCKPOINT_LOCKOUT_SECS=60`)

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use stockpoint_core::BusinessSnapshot;

use crate::auth::MAX_LOCKOUT_SECS;

/// Default config file looked up when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "stockpoint.toml";

const ENV_PREFIX: &str = "STOCKPOINT";

/// Register configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterConfig {
    /// SQLite database file
    pub database_path: PathBuf,

    /// Connection pool size
    pub max_connections: u32,

    /// Consecutive wrong PINs before lockout
    pub max_pin_attempts: i64,

    /// Lockout duration in seconds
    pub lockout_secs: i64,

    /// Receipt header used until `settings set business_name` is run
    pub business_name: String,

    /// Receipt address used until `settings set business_address` is run
    pub business_address: String,
}

impl RegisterConfig {
    /// Loads configuration from defaults, the config file and environment.
    ///
    /// An explicit `path` must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(path, Environment::with_prefix(ENV_PREFIX))
    }

    fn load_with(path: Option<&Path>, env: Environment) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let config: RegisterConfig = Config::builder()
            .set_default("database_path", default_database_path()?.display().to_string())?
            .set_default("max_connections", 5)?
            .set_default("max_pin_attempts", 5)?
            .set_default("lockout_secs", 300)?
            .set_default("business_name", "")?
            .set_default("business_address", "")?
            .add_source(file)
            .add_source(env)
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_connections",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.max_pin_attempts < 1 {
            return Err(ConfigError::InvalidValue {
                field: "max_pin_attempts",
                reason: "must be at least 1".to_string(),
            });
        }
        if !(0..=MAX_LOCKOUT_SECS).contains(&self.lockout_secs) {
            return Err(ConfigError::InvalidValue {
                field: "lockout_secs",
                reason: format!("must be between 0 and {}", MAX_LOCKOUT_SECS),
            });
        }
        Ok(())
    }

    /// Business identity used when none is stored in settings.
    pub fn business_defaults(&self) -> BusinessSnapshot {
        BusinessSnapshot::new(self.business_name.trim(), self.business_address.trim())
    }
}

/// `<platform data dir>/stockpoint.db`
///
/// - Linux: ~/.local/share/stockpoint/stockpoint.db
/// - macOS: ~/Library/Application Support/com.stockpoint.stockpoint/stockpoint.db
/// - Windows: %APPDATA%\stockpoint\stockpoint\data\stockpoint.db
fn default_database_path() -> Result<PathBuf, ConfigError> {
    let dirs = ProjectDirs::from("com", "stockpoint", "stockpoint").ok_or(ConfigError::NoDataDir)?;
    Ok(dirs.data_dir().join("stockpoint.db"))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("Could not determine a data directory; set STOCKPOINT_DATABASE_PATH")]
    NoDataDir,
}
