//! # Seed Data Generator
//!
//! Populates the database with demo inventory for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./stockpoint_dev.db with the default catalogue
//! cargo run -p stockpoint-db --bin seed
//!
//! # Specify database path
//! cargo run -p stockpoint-db --bin seed -- --db ./data/stockpoint.db
//! ```
//!
//! Each catalogue entry becomes one inventory item with a category, a
//! price and a starting quantity. Some quantities are deliberately at or
//! below the low-stock threshold so `item low-stock` has something to show.

use std::env;
use stockpoint_core::{validation, Money, NewInventoryItem};
use stockpoint_db::{setting_keys, Database, DbConfig};

/// (category, name, price in cents, quantity)
const CATALOGUE: &[(&str, &str, i64, i64)] = &[
    ("Grocery", "Rice 5kg", 10000, 40),
    ("Grocery", "Flour 2kg", 3500, 25),
    ("Grocery", "Sugar 1kg", 2200, 4),
    ("Grocery", "Cooking Oil 1L", 4800, 18),
    ("Grocery", "Canned Beans", 1200, 60),
    ("Beverages", "Mineral Water 1.5L", 600, 120),
    ("Beverages", "Orange Juice 1L", 1800, 3),
    ("Beverages", "Instant Coffee 200g", 5200, 12),
    ("Beverages", "Tea Bags x50", 2600, 30),
    ("Household", "Laundry Soap", 900, 45),
    ("Household", "Dish Liquid 500ml", 1500, 2),
    ("Household", "Matches x10", 300, 80),
    ("Household", "Candles x6", 1100, 0),
    ("Personal Care", "Toothpaste", 1300, 22),
    ("Personal Care", "Bath Soap", 450, 70),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./stockpoint_dev.db");
    let mut business_name: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--business" | "-b" => {
                if i + 1 < args.len() {
                    business_name = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Stockpoint Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>         Database file path (default: ./stockpoint_dev.db)");
                println!("  -b, --business <NAME>   Also store a business name for receipts");
                println!("  -h, --help              Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Stockpoint Seed Data Generator");
    println!("=================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.inventory().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} items", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    if let Some(name) = business_name {
        db.settings().set(setting_keys::BUSINESS_NAME, &name).await?;
        println!("✓ Business name set to {}", name);
    }

    println!();
    println!("Adding items...");

    let mut generated = 0;
    for (category, name, price_cents, quantity) in CATALOGUE {
        let item = NewInventoryItem::new(*name, Money::from_cents(*price_cents), *quantity)
            .with_category(*category);

        if let Err(e) = validation::validate_new_item(&item) {
            eprintln!("Skipping {}: {}", name, e);
            continue;
        }

        if let Err(e) = db.inventory().create(item).await {
            eprintln!("Failed to insert {}: {}", name, e);
            continue;
        }

        generated += 1;
    }

    let low = db.inventory().list_low_stock().await?;

    println!();
    println!("✓ Added {} items ({} at or below low-stock threshold)", generated, low.len());
    println!("✓ Seed complete!");

    Ok(())
}
