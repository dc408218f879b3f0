//! # mesa-core: Pure Domain Rules for Mesa
//!
//! This crate holds the rules that keep tables, orders and reservations
//! mutually consistent, as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Mesa Architecture                                │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    mesa-server (axum)                           │   │
//! │  │    /tables ──► /orders ──► /reservations ──► /menu-items       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │        mesa-db engines (TableRegistry, OrderEngine, ...)        │   │
//! │  │        one transaction per mutating operation                   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ asks                                   │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ mesa-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   order   │  │reservation│  │ validation│  │   │
//! │  │   │ statuses  │  │  pricing  │  │ pick_table│  │   rules   │  │   │
//! │  │   │ entities  │  │  numbers  │  │  actions  │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entities and status enums with their transition tables
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`order`] - Order commands, price snapshotting, order numbers
//! - [`reservation`] - Reservation commands and table selection
//! - [`pagination`] - Lenient page/page_size handling
//! - [`error`] - Domain error types
//! - [`validation`] - Field rules
//!
//! ## Example Usage
//!
//! ```rust
//! use mesa_core::{OrderStatus, CoreError};
//!
//! let err = OrderStatus::Preparing
//!     .check_transition(OrderStatus::Delivered)
//!     .unwrap_err();
//! assert!(matches!(err, CoreError::InvalidOrderTransition { .. }));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod order;
pub mod pagination;
pub mod reservation;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ErrorKind, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Prefix of every generated order number (`PED-YYYYMMDD-NNNN`).
pub const ORDER_NUMBER_PREFIX: &str = "PED";

/// Maximum quantity on a single order line.
///
/// ## Business Reason
/// Catches fat-finger input (1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Highest menu price in cents (1,000,000.00).
///
/// With [`MAX_ITEM_QUANTITY`] and [`MAX_LINES_PER_ORDER`] this keeps every
/// subtotal and order total far inside `i64`.
pub const MAX_PRICE_CENTS: i64 = 100_000_000;

/// Maximum lines submitted with a new order.
pub const MAX_LINES_PER_ORDER: usize = 100;

/// Largest table the floor plan supports.
pub const MAX_TABLE_CAPACITY: i64 = 50;

/// Largest party a single reservation can hold.
pub const MAX_PARTY_SIZE: i64 = 50;

pub const MAX_CUSTOMER_NAME_LEN: usize = 100;
pub const MAX_LOCATION_LEN: usize = 100;
pub const MAX_NOTES_LEN: usize = 200;
