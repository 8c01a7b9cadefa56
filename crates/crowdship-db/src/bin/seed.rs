//! # Seed Data Generator
//!
//! Populates the order collection with sample orders for development.
//!
//! ## Usage
//! ```bash
//! # Generate 20 orders (default)
//! cargo run -p crowdship-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p crowdship-db --bin seed -- --count 100
//!
//! # Specify database path
//! cargo run -p crowdship-db --bin seed -- --db ./data/crowdship.db
//! ```
//!
//! ## Generated Orders
//! Pickup and drop-off points are picked from a fixed list of San Francisco
//! Bay Area landmarks. Every order is pending and unassigned, owned by one
//! demo sender, so a partner account sees them all as available jobs.

use chrono::{Duration, Utc};
use std::env;
use uuid::Uuid;

use crowdship_core::{DeliveryLocation, Money, Order, OrderDraft, PackageSize};
use crowdship_db::{Database, DbConfig};

/// Demo sender that owns every seeded order.
const DEMO_SENDER_ID: &str = "00000000-0000-4000-8000-000000000001";

/// (address, latitude, longitude)
const LANDMARKS: &[(&str, f64, f64)] = &[
    ("Ferry Building, San Francisco, CA", 37.7955, -122.3937),
    ("Union Square, San Francisco, CA", 37.7880, -122.4075),
    ("Golden Gate Park, San Francisco, CA", 37.7694, -122.4862),
    ("Mission Dolores Park, San Francisco, CA", 37.7596, -122.4269),
    ("Oracle Park, San Francisco, CA", 37.7786, -122.3893),
    ("Lake Merritt, Oakland, CA", 37.8027, -122.2587),
    ("UC Berkeley, Berkeley, CA", 37.8719, -122.2585),
    ("Fisherman's Wharf, San Francisco, CA", 37.8080, -122.4177),
    ("Salesforce Tower, San Francisco, CA", 37.7897, -122.3972),
    ("Jack London Square, Oakland, CA", 37.7947, -122.2780),
];

const SIZES: &[PackageSize] = &[PackageSize::Small, PackageSize::Medium, PackageSize::Large];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 20;
    let mut db_path = String::from("./crowdship_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(20);
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
                println!("Crowdship Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of orders to generate (default: 20)");
                println!("  -d, --db <PATH>    Database file path (default: ./crowdship_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Crowdship Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path);
    println!("Orders:   {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let snapshot = db.orders().load().await?;
    if !snapshot.orders.is_empty() {
        println!("⚠ Database already has {} orders", snapshot.orders.len());
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let orders: Vec<Order> = (0..count).map(generate_order).collect();
    let version = db.orders().save(&orders, snapshot.version).await?;

    println!();
    println!("✓ Generated {} orders (version {})", orders.len(), version);

    let total: Money = orders.iter().map(|o| o.amount).sum();
    println!("  Total offered: {}", total);

    let distance_km: f64 = orders.iter().map(Order::distance_km).sum();
    println!("  Total distance: {:.1} km", distance_km);

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Generates a single pending order with deterministic data.
fn generate_order(seed: usize) -> Order {
    let (pickup_address, pickup_lat, pickup_lon) = LANDMARKS[seed % LANDMARKS.len()];
    // Step by 3 so pickup and drop-off never coincide
    let (drop_address, drop_lat, drop_lon) = LANDMARKS[(seed * 3 + 1) % LANDMARKS.len()];

    let draft = OrderDraft {
        pickup_location: DeliveryLocation::new(
            Uuid::new_v4().to_string(),
            pickup_lat,
            pickup_lon,
            pickup_address,
        ),
        delivery_location: DeliveryLocation::new(
            Uuid::new_v4().to_string(),
            drop_lat,
            drop_lon,
            drop_address,
        ),
        package_size: SIZES[seed % SIZES.len()],
        // $8.00 - $39.50 in 50 cent steps
        amount: Money::from_cents(800 + ((seed * 7) % 64) as i64 * 50),
    };

    let created = Utc::now() - Duration::minutes((seed * 13) as i64);
    Order::from_draft(Uuid::new_v4().to_string(), DEMO_SENDER_ID, draft, created)
}
