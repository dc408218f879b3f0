//! # Seed Data Generator
//!
//! Populates a database with a dining room and a menu for development.
//!
//! ## Usage
//! ```bash
//! # 12 tables (default) and the full menu
//! cargo run -p mesa-db --bin seed
//!
//! # Custom table count
//! cargo run -p mesa-db --bin seed -- --tables 30
//!
//! # Specify database path
//! cargo run -p mesa-db --bin seed -- --db ./data/mesa.db
//! ```
//!
//! ## Generated Data
//! - Tables numbered from 1, capacities cycling 2/4/4/6/8, split between
//!   "Salon", "Terraza" and "Barra"
//! - Menu items across starters, mains, desserts and drinks, with the last
//!   drink marked unavailable so sold-out handling can be tried by hand

use mesa_core::{NewMenuItem, NewTable};
use mesa_db::{Database, DbConfig};
use std::env;

/// (category, [(name, price)])
const MENU: &[(&str, &[(&str, &str)])] = &[
    (
        "Entradas",
        &[
            ("Empanada de carne", "3.50"),
            ("Ceviche", "12.00"),
            ("Sopa del dia", "6.75"),
            ("Ensalada mixta", "7.25"),
        ],
    ),
    (
        "Platos fuertes",
        &[
            ("Pasta carbonara", "15.50"),
            ("Lomo saltado", "18.90"),
            ("Pollo a la plancha", "14.00"),
            ("Risotto de hongos", "16.25"),
            ("Hamburguesa de la casa", "13.50"),
        ],
    ),
    (
        "Postres",
        &[
            ("Flan", "5.00"),
            ("Tres leches", "6.50"),
            ("Helado", "4.25"),
        ],
    ),
    (
        "Bebidas",
        &[
            ("Agua", "2.00"),
            ("Refresco", "3.50"),
            ("Limonada", "4.00"),
            ("Cafe", "2.75"),
            ("Jugo natural", "4.50"),
        ],
    ),
];

const CAPACITIES: &[i64] = &[2, 4, 4, 6, 8];
const LOCATIONS: &[&str] = &["Salon", "Terraza", "Barra"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut table_count: i64 = 12;
    let mut db_path = String::from("./mesa_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--tables" | "-t" => {
                if i + 1 < args.len() {
                    table_count = args[i + 1].parse().unwrap_or(12);
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
                println!("Mesa Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -t, --tables <N>   Number of tables to create (default: 12)");
                println!("  -d, --db <PATH>    Database file path (default: ./mesa_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Mesa Seed Data Generator");
    println!("==========================");
    println!("Database: {}", db_path);
    println!("Tables:   {}", table_count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.tables().list(None).await?.len();
    if existing > 0 {
        println!("⚠ Database already has {} tables", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Creating tables...");
    let registry = db.tables();
    for number in 1..=table_count {
        let idx = (number - 1) as usize;
        let table = NewTable {
            number,
            capacity: CAPACITIES[idx % CAPACITIES.len()],
            location: Some(LOCATIONS[idx % LOCATIONS.len()].to_string()),
        };
        if let Err(e) = registry.create(table).await {
            eprintln!("Failed to create table {}: {}", number, e);
        }
    }
    println!("✓ {} tables", table_count);

    println!();
    println!("Creating menu...");
    let menu = db.menu();
    let mut created = 0;
    let mut last_id = None;
    for (category, items) in MENU {
        for (name, price) in items.iter() {
            let item = NewMenuItem {
                name: name.to_string(),
                price: price.to_string(),
                category: Some(category.to_string()),
                available: None,
            };
            match menu.create(item).await {
                Ok(item) => {
                    created += 1;
                    last_id = Some(item.id);
                }
                Err(e) => eprintln!("Failed to create {}: {}", name, e),
            }
        }
    }
    if let Some(id) = last_id {
        menu.set_available(&id, false).await?;
    }
    println!("✓ {} menu items (1 marked unavailable)", created);

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
