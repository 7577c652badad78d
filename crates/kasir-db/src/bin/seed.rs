//! # Seed Data Generator
//!
//! Populates the database with the sample catalog.
//!
//! ## Usage
//! ```bash
//! # Seed ./kasir.db with untracked stock
//! cargo run -p kasir-db --bin seed
//!
//! # Give every product a starting stock level
//! cargo run -p kasir-db --bin seed -- --stock 25
//!
//! # Specify database path
//! cargo run -p kasir-db --bin seed -- --db ./data/kasir.db
//! ```
//!
//! ## Generated Catalog
//! - Categories: Electronics, Home Appliances
//! - Products (Electronics): Laptop 999.99, Smartphone 499.99, Tablet 299.99

use std::env;

use kasir_core::{CategoryDraft, ProductDraft};
use kasir_db::{Database, DbConfig};

/// `(name, description)`
const CATEGORIES: &[(&str, &str)] = &[
    ("Electronics", "Devices and gadgets"),
    ("Home Appliances", "Appliances for home use"),
];

/// `(name, price in cents)`, all filed under the first category.
const PRODUCTS: &[(&str, i64)] = &[
    ("Laptop", 99_999),
    ("Smartphone", 49_999),
    ("Tablet", 29_999),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut stock: Option<i64> = None;
    let mut db_path = String::from("./kasir.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--stock" | "-s" => {
                if i + 1 < args.len() {
                    stock = Some(args[i + 1].parse()?);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Kasir POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -s, --stock <N>    Starting stock per product (default: untracked)");
                println!("  -d, --db <PATH>    Database file path (default: ./kasir.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Kasir POS Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path);
    match stock {
        Some(n) => println!("Stock:    {} per product", n),
        None => println!("Stock:    untracked"),
    }
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let mut category_ids = Vec::with_capacity(CATEGORIES.len());
    for (name, description) in CATEGORIES {
        let category = db
            .categories()
            .insert(&CategoryDraft {
                name: name.to_string(),
                description: description.to_string(),
            })
            .await?;
        println!("  + category #{} {}", category.id, category.name);
        category_ids.push(category.id);
    }

    for (name, price_cents) in PRODUCTS {
        let product = db
            .products()
            .insert(&ProductDraft {
                name: name.to_string(),
                price_cents: *price_cents,
                category_id: category_ids.first().copied(),
                stock,
            })
            .await?;
        println!("  + product  #{} {} @ {}", product.id, product.name, product.price());
    }

    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}
