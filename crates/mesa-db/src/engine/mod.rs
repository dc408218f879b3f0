//! # Consistency Engines
//!
//! The three components that mutate shared state. Each public method is one
//! atomic unit of work against SQLite.
//!
//! ## Transaction Discipline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Every mutating method follows the same protocol:                      │
//! │                                                                         │
//! │  1. validate input                     (no storage touched)            │
//! │  2. read-only lookups on the pool      (catalog, friendly pre-checks)  │
//! │  3. BEGIN                                                               │
//! │  4. first statement is a WRITE         (CAS or row lock) so SQLite     │
//! │                                          hands out the write lock now, │
//! │                                          not on a later upgrade        │
//! │  5. re-read state under the lock, decide, write                        │
//! │  6. COMMIT  (any error before this rolls back on drop)                 │
//! │                                                                         │
//! │  No pool connection is acquired while a transaction is open.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here retries. A lost race is reported to the caller with the
//! state that won it.

pub mod order;
pub mod reservation;
pub mod table;

pub use order::OrderEngine;
pub use reservation::ReservationEngine;
pub use table::TableRegistry;
