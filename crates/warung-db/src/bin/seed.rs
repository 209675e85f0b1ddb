//! # Seed Data Generator
//!
//! Populates the database with demo catalog data for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default development database
//! cargo run -p warung-db --bin seed
//!
//! # Specify database path
//! cargo run -p warung-db --bin seed -- --db ./data/warung.db
//! ```

use std::env;

use tracing_subscriber::EnvFilter;
use warung_core::{Category, Customer, NewCategory, NewCustomer, NewProduct, Product};
use warung_db::{Database, DbConfig};

/// Demo catalog: (name, category, price, stock)
const PRODUCTS: &[(&str, &str, i64, i64)] = &[
    ("Indomie Goreng", "Makanan", 3_500, 48),
    ("Indomie Soto", "Makanan", 3_500, 36),
    ("Roti Tawar", "Makanan", 14_000, 10),
    ("Biskuit Kelapa", "Makanan", 9_500, 18),
    ("Teh Botol Sosro", "Minuman", 4_000, 24),
    ("Kopi Sachet", "Minuman", 2_000, 60),
    ("Air Mineral 600ml", "Minuman", 3_000, 40),
    ("Susu Kotak Coklat", "Minuman", 6_500, 15),
    ("Sabun Mandi", "Kebutuhan", 5_500, 12),
    ("Pasta Gigi", "Kebutuhan", 11_000, 9),
    ("Deterjen Sachet", "Kebutuhan", 1_500, 80),
    ("Minyak Goreng 1L", "Kebutuhan", 19_000, 14),
];

/// Categories with their chip colors
const CATEGORIES: &[(&str, &str)] = &[
    ("Makanan", "#C4643C"),
    ("Minuman", "#3C7DC4"),
    ("Kebutuhan", "#5FA052"),
];

const CUSTOMERS: &[(&str, &str)] = &[
    ("Budi", "0812-0000-1111"),
    ("Siti", "0813-2222-3333"),
    ("Agus", ""),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from("./warung_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Warung POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./warung_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Warung POS Seed Data Generator");
    println!("==============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("Connected, migrations applied");

    // Don't double-seed
    let existing = db.products().count().await?;
    if existing > 0 {
        println!("Database already has {existing} products; skipping seed.");
        println!("Delete the database file to regenerate.");
        return Ok(());
    }

    for (name, color) in CATEGORIES {
        db.categories()
            .insert(&Category::new(NewCategory {
                name: name.to_string(),
                color: Some(color.to_string()),
            }))
            .await?;
    }
    println!("Seeded {} categories", CATEGORIES.len());

    for (name, category, price, stock) in PRODUCTS {
        db.products()
            .insert(&Product::new(NewProduct {
                name: name.to_string(),
                category: category.to_string(),
                price: *price,
                stock: *stock,
            }))
            .await?;
    }
    println!("Seeded {} products", PRODUCTS.len());

    for (name, phone) in CUSTOMERS {
        db.customers()
            .insert(&Customer::new(NewCustomer {
                name: name.to_string(),
                phone: phone.to_string(),
                address: String::new(),
            }))
            .await?;
    }
    println!("Seeded {} customers", CUSTOMERS.len());

    println!();
    println!("Seed complete!");
    Ok(())
}
