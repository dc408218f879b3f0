//! # Repository Module
//!
//! The SQL for every entity, one module per table.
//!
//! ## Executor-Generic Functions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repositories vs Engines                              │
//! │                                                                         │
//! │  Engine (owns the transaction)                                         │
//! │       │                                                                 │
//! │       │  let mut tx = pool.begin().await?;                             │
//! │       │  orders::lock_if_pending(&mut *tx, id).await?;                 │
//! │       │  order_lines::insert(&mut *tx, &line).await?;                  │
//! │       │  orders::recompute_total(&mut *tx, id).await?;                 │
//! │       │  tx.commit().await?;                                           │
//! │       ▼                                                                 │
//! │  Repository function (one SQL statement, no policy)                   │
//! │       │                                                                 │
//! │       │  takes any SqliteExecutor: &SqlitePool or &mut SqliteConnection│
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Repositories never begin or commit; engines never write SQL.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`tables`] - Tables and the status compare-and-swap
//! - [`menu_items`] - Menu catalog rows
//! - [`orders`] - Order headers, the PENDING guard, total recomputation
//! - [`order_lines`] - Order lines (soft-removed)
//! - [`reservations`] - Reservations and slot lookups
//! - [`sequences`] - Per-day order number counter

pub mod menu_items;
pub mod order_lines;
pub mod orders;
pub mod reservations;
pub mod sequences;
pub mod tables;
