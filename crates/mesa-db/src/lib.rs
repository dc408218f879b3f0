//! # mesa-db: Storage and Consistency Engines
//!
//! SQLite storage for tables, menu items, orders and reservations, and the
//! three engines that keep them consistent under concurrent requests.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Mesa Data Flow                                 │
//! │                                                                         │
//! │  HTTP handler (mesa-server)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     mesa-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐   ┌────────────────┐   ┌──────────────┐    │   │
//! │  │   │    Engines    │   │  Repositories  │   │  Migrations  │    │   │
//! │  │   │ TableRegistry │──►│ tables         │   │  (embedded)  │    │   │
//! │  │   │ OrderEngine   │   │ orders, lines  │   │              │    │   │
//! │  │   │ Reservation-  │   │ reservations   │   │ 001_init.sql │    │   │
//! │  │   │   Engine      │   │ menu_items     │   │              │    │   │
//! │  │   └───────────────┘   └────────────────┘   └──────────────┘    │   │
//! │  │           │ rules from mesa-core                                │   │
//! │  └───────────┼─────────────────────────────────────────────────────┘   │
//! │              ▼                                                          │
//! │       SQLite (WAL)                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation, engine accessors
//! - [`engine`] - TableRegistry, OrderEngine, ReservationEngine
//! - [`catalog`] - The `MenuCatalog` seam and its SQLite implementation
//! - [`repository`] - One module of SQL per table
//! - [`migrations`] - Embedded schema migrations
//! - [`error`] - Storage and engine error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mesa_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./mesa.db")).await?;
//!
//! let table = db.orders().assign_table(&table_id).await?;
//! let order = db.orders().create_order(&waiter_id, request).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod engine;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use catalog::{MenuCatalog, SqliteMenuCatalog};
pub use engine::{OrderEngine, ReservationEngine, TableRegistry};
pub use error::{DbError, DbResult, EngineError, EngineResult};
pub use pool::{Database, DbConfig};
