//! # Seed Data Generator
//!
//! Populates the database with pharmacy products for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default development database
//! cargo run -p farmapos-db --bin seed
//!
//! # Specify database path
//! cargo run -p farmapos-db --bin seed -- --db ./data/farmapos.db
//! ```
//!
//! ## Generated Products
//! Creates a realistic pharmacy catalog across categories:
//! - Analgesics (acetaminophen, ibuprofen, aspirin)
//! - Antibiotics (amoxicillin, azithromycin)
//! - Cold & flu, gastric, dermatological, vitamins
//!
//! Each product has:
//! - Unique SKU: `{CATEGORY}-{INDEX}`
//! - Price derived from the product index (deterministic, no RNG dep)
//! - Stock between 5 and 104 units

use chrono::Utc;
use std::env;
use uuid::Uuid;

use farmapos_core::Product;
use farmapos_db::{Database, DbConfig};

/// Product categories with typical pharmacy items.
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "ANLG",
        &[
            "Acetaminofén 500mg x10",
            "Acetaminofén 500mg x30",
            "Ibuprofeno 400mg x10",
            "Ibuprofeno 600mg x10",
            "Aspirina 100mg x30",
            "Naproxeno 250mg x10",
            "Diclofenaco 50mg x10",
            "Tramadol 50mg x10",
        ],
    ),
    (
        "ANTB",
        &[
            "Amoxicilina 500mg x21",
            "Amoxicilina + Clavulanato 875mg x14",
            "Azitromicina 500mg x3",
            "Cefalexina 500mg x20",
            "Ciprofloxacina 500mg x10",
            "Doxiciclina 100mg x10",
        ],
    ),
    (
        "RESP",
        &[
            "Loratadina 10mg x10",
            "Cetirizina 10mg x10",
            "Jarabe para la tos 120ml",
            "Salbutamol inhalador 100mcg",
            "Descongestionante nasal spray",
            "Antigripal día/noche x12",
        ],
    ),
    (
        "GAST",
        &[
            "Omeprazol 20mg x14",
            "Esomeprazol 40mg x14",
            "Sales de rehidratación oral",
            "Loperamida 2mg x6",
            "Antiácido suspensión 360ml",
            "Simeticona gotas 30ml",
        ],
    ),
    (
        "DERM",
        &[
            "Crema hidratante 100g",
            "Protector solar FPS 50 120ml",
            "Clotrimazol crema 1% 20g",
            "Hidrocortisona crema 1% 15g",
            "Alcohol antiséptico 250ml",
            "Agua oxigenada 120ml",
        ],
    ),
    (
        "VITM",
        &[
            "Vitamina C 1g x10",
            "Vitamina D3 1000UI x30",
            "Complejo B x30",
            "Multivitamínico adulto x30",
            "Zinc 50mg x30",
            "Calcio + D x30",
        ],
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG=debug surfaces the repository-level events during seeding
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./farmapos_dev.db");

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
                println!("FarmaPOS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./farmapos_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 FarmaPOS Seed Data Generator");
    println!("===============================");
    println!("Database: {}", db_path);
    println!();

    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count_active().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating catalog...");

    let mut generated = 0;
    let start = std::time::Instant::now();

    for (category_code, products) in CATEGORIES {
        for (product_idx, product_name) in products.iter().enumerate() {
            let product = generate_product(category_code, product_name, product_idx);

            if let Err(e) = db.products().insert(&product).await {
                eprintln!("Failed to insert {}: {}", product.sku, e);
                continue;
            }

            generated += 1;
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} products in {:?}", generated, elapsed);
    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Generates a single product with deterministic price and stock.
fn generate_product(category: &str, name: &str, index: usize) -> Product {
    let now = Utc::now();

    // 1.500 to 36.500 pesos in cents, spread by index
    let price_cents = 1_500 + (index as i64 % 8) * 5_000;
    let stock = 5 + (index as i64 * 13) % 100;

    Product {
        id: Uuid::new_v4().to_string(),
        sku: format!("{}-{:03}", category, index + 1),
        name: name.to_string(),
        price_cents,
        stock,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}
