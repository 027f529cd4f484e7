//! # Seed Data Generator
//!
//! Populates a development database with a catalog, a few members and a
//! handful of sales run through the sale processor.
//!
//! ## Usage
//! ```bash
//! # Seed ./tillpoint.db (or $TILLPOINT_DB_PATH)
//! cargo run -p tillpoint-db --bin seed
//!
//! # Custom product count and path
//! cargo run -p tillpoint-db --bin seed -- --count 500 --db ./data/dev.db
//!
//! # More log output
//! RUST_LOG=debug cargo run -p tillpoint-db --bin seed
//! ```

use std::env;
use std::time::Instant;

use tillpoint_core::{NewProduct, PaymentMethod, SaleRequest, SaleRequestItem};
use tillpoint_db::{Database, EngineConfig, SaleProcessor};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Catalog families and their items.
const FAMILIES: &[(&str, &[&str])] = &[
    (
        "Drinks",
        &[
            "Cola",
            "Lemon Soda",
            "Sparkling Water",
            "Still Water",
            "Orange Juice",
            "Iced Tea",
            "Cold Brew",
            "Energy Drink",
        ],
    ),
    (
        "Snacks",
        &[
            "Salted Chips",
            "Paprika Chips",
            "Pretzels",
            "Trail Mix",
            "Chocolate Bar",
            "Granola Bar",
            "Gummy Bears",
            "Butter Cookies",
        ],
    ),
    (
        "Fresh",
        &[
            "Banana",
            "Apple",
            "Sandwich Ham",
            "Sandwich Veggie",
            "Yogurt Cup",
            "Fruit Salad",
        ],
    ),
];

/// Pack sizes with their price addon in cents.
const PACKS: &[(&str, i64)] = &[("Single", 0), ("Twin", 90), ("Six", 420)];

const MEMBERS: &[(i64, &str)] = &[
    (1, "Ada Lovelace"),
    (2, "Grace Hopper"),
    (3, "Katherine Johnson"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tillpoint=debug,sqlx=warn")),
        )
        .init();

    let mut config = EngineConfig::load()?;
    let mut count: usize = 100;

    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if let Some(value) = args.get(i + 1) {
                    count = value.parse().unwrap_or(count);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if let Some(value) = args.get(i + 1) {
                    config.database_path = value.into();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Tillpoint Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 100)");
                println!("  -d, --db <PATH>    Database file path (default: $TILLPOINT_DB_PATH or ./tillpoint.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => warn!(argument = other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    info!(path = %config.database_path.display(), count, "Seeding database");

    let db = Database::new(config.db_config()).await?;

    let existing = db.products().count().await?;
    if existing > 0 {
        warn!(existing, "Database already has products; delete the file to regenerate");
        return Ok(());
    }

    for &(id, name) in MEMBERS {
        sqlx::query("INSERT OR IGNORE INTO members (id, name) VALUES (?1, ?2)")
            .bind(id)
            .bind(name)
            .execute(db.pool())
            .await?;
    }

    let start = Instant::now();
    let mut product_ids = Vec::with_capacity(count);

    'catalog: for (family_idx, (family, items)) in FAMILIES.iter().enumerate() {
        for (item_idx, item) in items.iter().enumerate() {
            for (pack_idx, pack) in PACKS.iter().enumerate() {
                if product_ids.len() >= count {
                    break 'catalog;
                }

                let seed = family_idx * 100 + item_idx * 10 + pack_idx;
                let product = generate_product(family, item, pack, seed);

                match db.products().insert(&product).await {
                    Ok(inserted) => product_ids.push((inserted.id, inserted.price_cents)),
                    Err(e) => warn!(name = %product.name, error = %e, "Failed to insert product"),
                }
            }
        }
    }

    info!(
        products = product_ids.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Catalog generated"
    );

    let processor = SaleProcessor::new(db.clone()).with_top_products(config.top_products);
    let methods = [PaymentMethod::Cash, PaymentMethod::Card, PaymentMethod::MemberAccount];

    for (n, chunk) in product_ids.chunks(3).take(10).enumerate() {
        let items: Vec<SaleRequestItem> = chunk
            .iter()
            .map(|&(product_id, price)| SaleRequestItem {
                product_id,
                quantity: 1 + (n as i64 % 2),
                unit_price_cents: price,
            })
            .collect();
        let subtotal: i64 = items.iter().map(|i| i.quantity * i.unit_price_cents).sum();
        let payment_method = methods[n % methods.len()];

        let request = SaleRequest {
            member_id: (payment_method == PaymentMethod::MemberAccount)
                .then(|| MEMBERS[n % MEMBERS.len()].0),
            items,
            subtotal_cents: subtotal,
            discount_cents: 0,
            total_cents: subtotal,
            payment_method,
            notes: None,
        };

        if let Err(e) = processor.create_sale(&request).await {
            warn!(error = %e, "Demo sale rejected");
        }
    }

    let stats = processor.statistics(None).await?;
    let low_stock = db.products().low_stock(100).await?;
    info!(
        sales = stats.completed_count,
        revenue_cents = stats.revenue_cents,
        low_stock = low_stock.len(),
        "Seed complete"
    );

    Ok(())
}

/// Deterministic product data from a seed number.
fn generate_product(family: &str, item: &str, pack: &(&str, i64), seed: usize) -> NewProduct {
    let (pack_name, price_addon) = *pack;

    // $0.99 - $5.98 plus pack addon
    let price_cents = 99 + ((seed * 37) % 500) as i64 + price_addon;

    // 55-74% of price
    let cost_cents = price_cents * (55 + (seed % 20) as i64) / 100;

    NewProduct {
        name: format!("{item} {pack_name} ({family})"),
        price_cents,
        cost_cents: Some(cost_cents),
        stock_current: (seed % 40) as i64,
        stock_minimum: 5,
    }
}
