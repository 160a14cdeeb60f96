//! # Seed Data Generator
//!
//! Populates the database with branches, customers, products and sample
//! sales. Sales go through the real command handlers, so every one of them
//! is validated, priced and announced exactly like production traffic.
//!
//! ## Usage
//! ```bash
//! # 50 sales (default) into MERCADO_DATABASE_PATH or ./mercado.db
//! cargo run -p mercado-app --bin seed
//!
//! # Custom amount and database path
//! cargo run -p mercado-app --bin seed -- --sales 200 --db ./data/mercado.db
//!
//! # Drain the event outbox into the log afterwards
//! cargo run -p mercado-app --bin seed -- --relay
//! ```
//!
//! ## Generated Sales
//! Line quantities cycle through 1..=20 so every discount tier shows up:
//! - 1-3 units: no discount
//! - 4-9 units: 10%
//! - 10-20 units: 20%
//!
//! Every 7th sale is cancelled and every 5th completed.

use std::env;
use std::path::PathBuf;

use chrono::{Duration, Utc};
use mercado_app::handlers::{cancel_sale, complete_sale, create_sale, list_sales};
use mercado_app::publisher::{relay_outbox, LoggingPublisher};
use mercado_app::{bootstrap, telemetry, AppConfig, CancelToken};
use mercado_core::commands::{CreateSale, SaleItemInput};
use mercado_core::{Branch, Customer, Money, Product};
use rust_decimal::Decimal;
use uuid::Uuid;

/// (code, name, price in cents, category)
const PRODUCTS: &[(&str, &str, i64, &str)] = &[
    ("BEV-001", "Lager 350ml", 449, "Beverages"),
    ("BEV-002", "Lager 600ml", 749, "Beverages"),
    ("BEV-003", "Pilsen 1L", 1099, "Beverages"),
    ("BEV-004", "Guarana 2L", 899, "Beverages"),
    ("BEV-005", "Sparkling Water 500ml", 299, "Beverages"),
    ("SNK-001", "Salted Peanuts 150g", 650, "Snacks"),
    ("SNK-002", "Potato Chips 90g", 799, "Snacks"),
    ("SNK-003", "Cheese Crackers 200g", 549, "Snacks"),
    ("GRO-001", "Rice 5kg", 2790, "Grocery"),
    ("GRO-002", "Black Beans 1kg", 899, "Grocery"),
];

/// (name, city, state)
const BRANCHES: &[(&str, &str, &str)] = &[
    ("Centro", "São Paulo", "SP"),
    ("Savassi", "Belo Horizonte", "MG"),
    ("Boa Viagem", "Recife", "PE"),
];

const CUSTOMERS: &[&str] = &[
    "Ana Souza",
    "Bruno Lima",
    "Carla Mendes",
    "Diego Alves",
    "Elisa Rocha",
    "Fábio Costa",
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load()?;
    let mut sales: usize = 50;
    let mut relay = false;

    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-s" | "--sales" => {
                if i + 1 < args.len() {
                    sales = args[i + 1].parse().unwrap_or(sales);
                    i += 1;
                }
            }
            "-d" | "--db" => {
                if i + 1 < args.len() {
                    config.database_path = PathBuf::from(&args[i + 1]);
                    i += 1;
                }
            }
            "-r" | "--relay" => relay = true,
            "-h" | "--help" => {
                println!("Mercado Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -s, --sales <N>    Number of sales to create (default: 50)");
                println!("  -d, --db <PATH>    Database file path (default: MERCADO_DATABASE_PATH or ./mercado.db)");
                println!("  -r, --relay        Deliver queued outbox events to the log when done");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    telemetry::init_tracing(&config.log_filter);

    println!("Mercado Seed Data Generator");
    println!("===========================");
    println!("Database: {}", config.database_path.display());
    println!("Sales:    {}", sales);
    println!();

    let (db, state) = bootstrap(&config).await?;
    println!("✓ Connected to database");

    if db.products().count().await? > 0 {
        println!("⚠ Database already has products");
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Reference data
    let directory = db.directory();
    let mut branch_ids = Vec::new();
    for (name, city, uf) in BRANCHES {
        let branch = Branch {
            id: Uuid::new_v4(),
            name: name.to_string(),
            address: None,
            city: Some(city.to_string()),
            state: Some(uf.to_string()),
            country: Some("BR".to_string()),
            phone_number: None,
        };
        directory.insert_branch(&branch).await?;
        branch_ids.push(branch.id);
    }

    let mut customer_ids = Vec::new();
    for (idx, name) in CUSTOMERS.iter().enumerate() {
        let customer = Customer {
            id: Uuid::new_v4(),
            external_id: Some(format!("CRM-{:04}", idx + 1)),
            name: name.to_string(),
            email: None,
            phone_number: None,
            registered_at: Utc::now() - Duration::days(365),
        };
        directory.insert_customer(&customer).await?;
        customer_ids.push(customer.id);
    }

    let mut products = Vec::new();
    for (code, name, cents, category) in PRODUCTS {
        let product = Product {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: None,
            price: Money::from_cents(*cents),
            category: Some(category.to_string()),
            stock_quantity: 500,
            supplier: None,
            product_code: code.to_string(),
        };
        db.products().insert(&product).await?;
        products.push(product);
    }
    println!(
        "✓ Reference data: {} branches, {} customers, {} products",
        branch_ids.len(),
        customer_ids.len(),
        products.len()
    );

    // Sales
    println!();
    println!("Creating sales...");
    let token = CancelToken::never();
    let start = std::time::Instant::now();
    let mut created = 0;
    let mut cancelled = 0;
    let mut completed = 0;

    for n in 0..sales {
        let lines = 1 + n % 3;
        let items = (0..lines)
            .map(|line| {
                let product = &products[(n + line * 3) % products.len()];
                SaleItemInput {
                    id: None,
                    product_id: product.id,
                    quantity: ((n * 7 + line * 5) % 20 + 1) as i64,
                    unit_price: product.price.amount(),
                    discount: Decimal::ZERO,
                }
            })
            .collect();

        let cmd = CreateSale {
            sale_number: format!("{}", 100_000 + n),
            sale_date: Utc::now() - Duration::hours((sales - n) as i64),
            branch_id: branch_ids[n % branch_ids.len()],
            customer_id: customer_ids[n % customer_ids.len()],
            items,
        };

        let sale = match create_sale(&state, cmd, &token).await {
            Ok(sale) => sale,
            Err(e) => {
                eprintln!("Failed to create sale {}: {}", 100_000 + n, e);
                continue;
            }
        };
        created += 1;

        if n % 7 == 6 {
            cancel_sale(&state, sale.id, &token).await?;
            cancelled += 1;
        } else if n % 5 == 4 {
            complete_sale(&state, sale.id, &token).await?;
            completed += 1;
        }
    }

    let elapsed = start.elapsed();
    println!("✓ Created {} sales in {:?}", created, elapsed);
    println!("  Cancelled: {}, completed: {}", cancelled, completed);

    // Verify
    let first_page = list_sales(&state, config.first_page(), &token).await?;
    println!();
    println!("Verifying...");
    println!("  Sales in store: {}", first_page.count);
    if let Some(latest) = first_page.sales.first() {
        println!(
            "  Latest: #{} total {} ({} items)",
            latest.sale_number,
            latest.total_amount,
            latest.items.len()
        );
    }
    println!("  Pending outbox events: {}", db.event_outbox().count_pending().await?);

    if relay {
        let outbox = db.event_outbox();
        let mut relayed = 0;
        loop {
            let delivered = relay_outbox(&outbox, &LoggingPublisher, 100).await?;
            if delivered == 0 {
                break;
            }
            relayed += delivered;
        }
        println!("✓ Relayed {} outbox events", relayed);
    }

    db.close().await;
    println!();
    println!("✓ Seed complete!");

    Ok(())
}
