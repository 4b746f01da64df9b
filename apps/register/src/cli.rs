//! Command line definition.

use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand};
use stockpoint_core::{Money, SaleLineRequest};

/// Stockpoint register: inventory, sales and receipts.
#[derive(Debug, Parser)]
#[command(name = "register", version, about)]
pub struct Cli {
    /// Config file (default: ./stockpoint.toml if present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Operator PIN, required by commands that change data
    #[arg(long, global = true, env = "STOCKPOINT_PIN", hide_env_values = true)]
    pub pin: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the PIN or show lockout status
    #[command(subcommand)]
    Pin(PinCommand),

    /// Manage inventory
    #[command(subcommand)]
    Item(ItemCommand),

    /// Complete a sale and print its receipt
    Sell(SellArgs),

    /// Show, list or reissue receipts
    #[command(subcommand)]
    Receipt(ReceiptCommand),

    /// Show recorded sales
    #[command(subcommand)]
    Sale(SaleCommand),

    /// Business name and address
    #[command(subcommand)]
    Settings(SettingsCommand),
}

#[derive(Debug, Subcommand)]
pub enum PinCommand {
    /// Set the PIN. Changing an existing PIN needs the current one in --pin.
    Set {
        #[arg(long, value_name = "PIN")]
        new_pin: String,
    },
    /// Failed attempts and lockout state
    Status,
}

#[derive(Debug, Subcommand)]
pub enum ItemCommand {
    Add {
        #[arg(long)]
        name: String,
        /// Unit price, e.g. 10.99
        #[arg(long, value_parser = parse_price)]
        price: Money,
        #[arg(long)]
        quantity: i64,
        #[arg(long, default_value = "")]
        category: String,
        #[arg(long)]
        low_stock_threshold: Option<i64>,
    },
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long, value_parser = parse_price)]
        price: Option<Money>,
        #[arg(long)]
        quantity: Option<i64>,
        #[arg(long)]
        low_stock_threshold: Option<i64>,
    },
    Delete {
        id: String,
    },
    List,
    /// Items at or below their low-stock threshold
    LowStock,
}

#[derive(Debug, Args)]
pub struct SellArgs {
    #[arg(long)]
    pub seller: String,

    #[arg(long)]
    pub buyer: String,

    /// ITEM_ID:QTY, repeatable
    #[arg(long = "line", value_name = "ITEM_ID:QTY", required = true, value_parser = parse_line)]
    pub lines: Vec<SaleLineRequest>,
}

#[derive(Debug, Subcommand)]
pub enum ReceiptCommand {
    /// Show one receipt by id or by sale id
    #[command(group(ArgGroup::new("target").required(true).args(["id", "sale_id"])))]
    Show {
        id: Option<String>,
        #[arg(long)]
        sale_id: Option<String>,
    },
    List,
    /// Issue the receipt for a sale that was recorded without one
    Retry {
        #[arg(long)]
        sale_id: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum SaleCommand {
    List,
    Show { id: String },
}

#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    Show,
    Set { key: String, value: String },
}

/// Parses `10`, `10.5`, `10.99` or `$10.99` into cents.
pub fn parse_price(raw: &str) -> Result<Money, String> {
    let raw = raw.trim();
    let digits = raw.strip_prefix('$').unwrap_or(raw);

    let (major, minor) = match digits.split_once('.') {
        Some((major, minor)) => (major, minor),
        None => (digits, ""),
    };

    let is_number = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if major.is_empty() || !is_number(major) || !is_number(minor) || minor.len() > 2 {
        return Err(format!("invalid price '{}': expected e.g. 10.99", raw));
    }

    let major: i64 = major
        .parse()
        .map_err(|_| format!("price '{}' is too large", raw))?;
    let minor: i64 = match minor.len() {
        0 => 0,
        1 => minor.parse::<i64>().map_err(|e| e.to_string())? * 10,
        _ => minor.parse::<i64>().map_err(|e| e.to_string())?,
    };

    major
        .checked_mul(100)
        .and_then(|cents| cents.checked_add(minor))
        .map(Money::from_cents)
        .ok_or_else(|| format!("price '{}' is too large", raw))
}

/// Parses `ITEM_ID:QTY`.
pub fn parse_line(raw: &str) -> Result<SaleLineRequest, String> {
    let (id, qty) = raw
        .rsplit_once(':')
        .ok_or_else(|| format!("invalid line '{}': expected ITEM_ID:QTY", raw))?;

    let id = id.trim();
    if id.is_empty() {
        return Err(format!("invalid line '{}': missing item id", raw));
    }

    let quantity: i64 = qty
        .trim()
        .parse()
        .map_err(|_| format!("invalid line '{}': quantity must be a whole number", raw))?;

    Ok(SaleLineRequest::new(id, quantity))
}
