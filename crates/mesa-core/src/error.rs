//! # Error Types
//!
//! Domain-specific error types for mesa-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  mesa-core errors (this file)                                          │
//! │  ├── CoreError        - Domain rule violations (typed, with context)   │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  └── ErrorKind        - Coarse classification used by the API layer    │
//! │                                                                         │
//! │  mesa-db errors (separate crate)                                       │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── EngineError      - CoreError | DbError                            │
//! │                                                                         │
//! │  mesa-server errors                                                    │
//! │  └── ApiError         - What HTTP clients see (status + JSON body)      │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → EngineError → ApiError → Client   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Conflicts carry the state the caller needs to react (actual status,
//!    requested status, legal next statuses)
//! 3. Errors are enum variants, never String
//! 4. Every variant maps to exactly one [`ErrorKind`]

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use thiserror::Error;

use crate::types::{OrderStatus, ReservationStatus, TableStatus};

// =============================================================================
// Error Kind
// =============================================================================

/// Coarse classification of every failure the engines can produce.
///
/// ```text
/// Validation         → 400  malformed / missing input, caught before storage
/// NotFound           → 404  referenced entity does not exist
/// Conflict           → 409  state precondition violated
/// InvalidTransition  → 409  state machine rule violated (a kind of Conflict)
/// Internal           → 500  storage or unexpected failure (the only one logged)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    InvalidTransition,
    Internal,
}

// =============================================================================
// Core Error
// =============================================================================

/// Domain rule violations raised by the table, order and reservation engines.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Table id does not exist.
    #[error("Table not found: {0}")]
    TableNotFound(String),

    /// Table numbers are unique per restaurant.
    #[error("Table number {0} already exists")]
    DuplicateTableNumber(i64),

    /// Compare-and-swap on a table's status lost the race (or was never
    /// valid). Carries the status actually found at the time of the update.
    ///
    /// ## User Workflow
    /// ```text
    /// Waiter A: assign #1 ──┐
    ///                       ├──► UPDATE tables ... WHERE status = 'available'
    /// Waiter B: assign #1 ──┘
    ///      │
    ///      ▼
    /// A: 200 OK (OCCUPIED)
    /// B: 409 TableConflict { expected: AVAILABLE, current: OCCUPIED }
    /// ```
    #[error("Table {table_id} is {current}, expected {expected}")]
    TableConflict {
        table_id: String,
        expected: TableStatus,
        current: TableStatus,
    },

    /// Orders may only be opened against an occupied table.
    #[error("Table {table_id} is {current}, orders require an OCCUPIED table")]
    TableNotOccupied {
        table_id: String,
        current: TableStatus,
    },

    /// Menu item id does not exist in the catalog.
    #[error("Menu item not found: {0}")]
    MenuItemNotFound(String),

    /// Batch availability check on order creation failed (all-or-nothing).
    #[error("One or more items are not available")]
    ItemsUnavailable,

    /// Single item is currently switched off in the catalog.
    #[error("Menu item {0} is not available")]
    ItemUnavailable(String),

    /// Order id does not exist.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Line id does not exist on the order (or was already removed).
    #[error("Order line {line_id} not found on order {order_id}")]
    OrderLineNotFound { order_id: String, line_id: String },

    /// Lines can only change while the order is still PENDING.
    #[error("Order {order_id} is {current}, lines can only change while PENDING")]
    OrderNotModifiable {
        order_id: String,
        current: OrderStatus,
    },

    /// Removing the sole remaining line would leave an empty order.
    #[error("Order {order_id} must keep at least one line")]
    LastLineUndeletable { order_id: String },

    /// Order state machine rejected the requested transition.
    #[error("Cannot move order from {current} to {requested}")]
    InvalidOrderTransition {
        current: OrderStatus,
        requested: OrderStatus,
        allowed: Vec<OrderStatus>,
    },

    /// Reservation id does not exist.
    #[error("Reservation not found: {0}")]
    ReservationNotFound(String),

    /// Reservation state machine rejected the requested action.
    #[error("Cannot move reservation from {current} to {requested}")]
    InvalidReservationTransition {
        current: ReservationStatus,
        requested: ReservationStatus,
        allowed: Vec<ReservationStatus>,
    },

    /// Reservation details can only be edited while ACTIVE.
    #[error("Reservation {reservation_id} is {current}, only ACTIVE reservations can be edited")]
    ReservationNotModifiable {
        reservation_id: String,
        current: ReservationStatus,
    },

    /// No AVAILABLE table is large enough for the party.
    #[error("No available table for a party of {party_size}")]
    NoTableAvailable { party_size: i64 },

    /// Another ACTIVE/CONFIRMED reservation holds the exact same slot.
    #[error("Table {table_id} is already booked on {date} at {time}")]
    SlotConflict {
        table_id: String,
        date: NaiveDate,
        time: NaiveTime,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Classifies the error for propagation and status-code mapping.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::Validation(_)
            | CoreError::ItemsUnavailable
            | CoreError::ItemUnavailable(_) => ErrorKind::Validation,

            CoreError::TableNotFound(_)
            | CoreError::MenuItemNotFound(_)
            | CoreError::OrderNotFound(_)
            | CoreError::OrderLineNotFound { .. }
            | CoreError::ReservationNotFound(_)
            | CoreError::NoTableAvailable { .. } => ErrorKind::NotFound,

            CoreError::DuplicateTableNumber(_)
            | CoreError::TableConflict { .. }
            | CoreError::TableNotOccupied { .. }
            | CoreError::OrderNotModifiable { .. }
            | CoreError::LastLineUndeletable { .. }
            | CoreError::ReservationNotModifiable { .. }
            | CoreError::SlotConflict { .. } => ErrorKind::Conflict,

            CoreError::InvalidOrderTransition { .. }
            | CoreError::InvalidReservationTransition { .. } => ErrorKind::InvalidTransition,
        }
    }

    /// Machine-readable error code sent to clients.
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::TableNotFound(_) => "TABLE_NOT_FOUND",
            CoreError::DuplicateTableNumber(_) => "DUPLICATE_TABLE_NUMBER",
            CoreError::TableConflict { .. } => "TABLE_CONFLICT",
            CoreError::TableNotOccupied { .. } => "TABLE_NOT_OCCUPIED",
            CoreError::MenuItemNotFound(_) => "MENU_ITEM_NOT_FOUND",
            CoreError::ItemsUnavailable => "ITEMS_UNAVAILABLE",
            CoreError::ItemUnavailable(_) => "ITEM_UNAVAILABLE",
            CoreError::OrderNotFound(_) => "ORDER_NOT_FOUND",
            CoreError::OrderLineNotFound { .. } => "ORDER_LINE_NOT_FOUND",
            CoreError::OrderNotModifiable { .. } => "ORDER_NOT_MODIFIABLE",
            CoreError::LastLineUndeletable { .. } => "LAST_LINE_UNDELETABLE",
            CoreError::InvalidOrderTransition { .. } => "INVALID_TRANSITION",
            CoreError::ReservationNotFound(_) => "RESERVATION_NOT_FOUND",
            CoreError::InvalidReservationTransition { .. } => "INVALID_TRANSITION",
            CoreError::ReservationNotModifiable { .. } => "RESERVATION_NOT_MODIFIABLE",
            CoreError::NoTableAvailable { .. } => "NO_TABLE_AVAILABLE",
            CoreError::SlotConflict { .. } => "SLOT_CONFLICT",
            CoreError::Validation(_) => "VALIDATION_ERROR",
        }
    }

    /// Structured context a client needs to act on the failure.
    ///
    /// Returns `None` when the message alone is enough.
    pub fn details(&self) -> Option<serde_json::Value> {
        use serde_json::json;

        match self {
            CoreError::TableConflict {
                table_id,
                expected,
                current,
            } => Some(json!({
                "tableId": table_id,
                "expectedStatus": expected,
                "currentStatus": current,
            })),
            CoreError::TableNotOccupied { table_id, current } => Some(json!({
                "tableId": table_id,
                "currentStatus": current,
            })),
            CoreError::OrderNotModifiable { order_id, current } => Some(json!({
                "orderId": order_id,
                "currentStatus": current,
            })),
            CoreError::InvalidOrderTransition {
                current,
                requested,
                allowed,
            } => Some(json!({
                "currentStatus": current,
                "requestedStatus": requested,
                "allowedStatuses": allowed,
            })),
            CoreError::InvalidReservationTransition {
                current,
                requested,
                allowed,
            } => Some(json!({
                "currentStatus": current,
                "requestedStatus": requested,
                "allowedStatuses": allowed,
            })),
            CoreError::ReservationNotModifiable {
                reservation_id,
                current,
            } => Some(json!({
                "reservationId": reservation_id,
                "currentStatus": current,
            })),
            CoreError::SlotConflict {
                table_id,
                date,
                time,
            } => Some(json!({
                "tableId": table_id,
                "date": date,
                "time": time,
            })),
            CoreError::Validation(e) => Some(json!({ "field": e.field() })),
            _ => None,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before any storage is touched.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, invalid price).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Name of the offending input field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::MustBePositive { field }
            | ValidationError::InvalidFormat { field, .. } => field,
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
