//! # Seed Data Generator
//!
//! Populates a database with demo goods for development.
//!
//! ## Usage
//! ```bash
//! # Generate 200 goods (default)
//! cargo run -p till-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p till-db --bin seed -- --count 500
//!
//! # Specify database path
//! cargo run -p till-db --bin seed -- --db ./data/till.db
//! ```
//!
//! ## Generated Goods
//! - Product id: `{CATEGORY}-{NAME}-{INDEX}`
//! - Price: 0.99 - 19.99 plus a size addon
//! - Cost: 60-80% of price
//! - Stock: 0 - 60, so some goods show up in the low-stock report
//! - Every fifth good is sold wholesale

use std::env;
use till_core::{GoodType, NewGood};
use till_db::{Catalog, Database, DbConfig};

/// Categories and the goods in each.
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "BEV",
        &[
            "Cola", "Lemon Soda", "Orange Juice", "Mango Juice", "Mineral Water", "Iced Tea",
            "Green Tea", "Coffee Beans",
        ],
    ),
    (
        "SNK",
        &[
            "Potato Chips", "Salted Peanuts", "Chocolate Bar", "Butter Cookies", "Crackers",
            "Popcorn",
        ],
    ),
    (
        "DRY",
        &["Whole Milk", "Skim Milk", "Cheddar", "Yogurt", "Butter", "Cream"],
    ),
    (
        "GRO",
        &[
            "Basmati Rice", "Wheat Flour", "Sugar", "Cooking Oil", "Red Lentils", "Chickpeas",
            "Pasta", "Salt",
        ],
    ),
    (
        "HOM",
        &["Dish Soap", "Laundry Powder", "Toilet Paper", "Matches", "Candles"],
    ),
];

/// Size variants and their price addon in cents.
const SIZES: &[(&str, i64)] = &[
    ("Small", 0),
    ("Medium", 100),
    ("Large", 200),
    ("Family", 450),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 200;
    let mut db_path = String::from("./till_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(200);
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
                println!("Till POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of goods to generate (default: 200)");
                println!("  -d, --db <PATH>    Database file path (default: ./till_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Till POS Seed Data Generator");
    println!("============================");
    println!("Database: {}", db_path);
    println!("Goods:    {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database, migrations applied");

    let existing = db.goods().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} goods", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let catalog = Catalog::new(&db);
    let mut generated = 0;
    let start = std::time::Instant::now();

    'outer: for (category_idx, (category_code, names)) in CATEGORIES.iter().enumerate() {
        for (name_idx, name) in names.iter().enumerate() {
            for (size_idx, (size_name, price_addon)) in SIZES.iter().enumerate() {
                if generated >= count {
                    break 'outer;
                }

                let good = generate_good(
                    category_code,
                    name,
                    size_name,
                    *price_addon,
                    category_idx * 1000 + name_idx * 20 + size_idx,
                );

                if let Err(e) = catalog.register(&good).await {
                    eprintln!("Failed to insert {}: {}", good.product_id, e);
                    continue;
                }

                generated += 1;
            }
        }
    }

    println!();
    println!("✓ Generated {} goods in {:?}", generated, start.elapsed());

    let low = catalog.low_stock(till_core::DEFAULT_LOW_STOCK_THRESHOLD).await?;
    println!("  Low stock: {} goods", low.len());

    let matches = catalog.search("milk").await?;
    println!("  Search 'milk': {} results", matches.len());

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Builds one demo good from its category, name, and size.
fn generate_good(category: &str, name: &str, size: &str, price_addon: i64, seed: usize) -> NewGood {
    let compact: String = name.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    let product_id = format!(
        "{}-{}-{:04}",
        category,
        compact.chars().take(4).collect::<String>().to_uppercase(),
        seed
    );

    let price_cents = 99 + ((seed * 37) % 1900) as i64 + price_addon;
    let cost_pct = 60 + (seed % 20) as i64;

    NewGood {
        product_id,
        name: format!("{} {}", name, size),
        price_cents,
        cost_cents: price_cents * cost_pct / 100,
        stock: (seed % 61) as i64,
        quantity: 1,
        good_type: if seed % 5 == 0 {
            GoodType::Wholesale
        } else {
            GoodType::Retail
        },
    }
}
