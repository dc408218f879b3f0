//! # Domain Types
//!
//! Core domain types shared by the engines and the HTTP layer.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Table       │   │     Order       │   │  Reservation    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │◄──│  table_id (FK)  │   │  table_id (FK)  │──►    │
//! │  │  number (biz)   │   │  order_number   │   │  date + time    │       │
//! │  │  capacity       │   │  status         │   │  party_size     │       │
//! │  │  status         │   │  total_cents    │   │  status         │       │
//! │  └─────────────────┘   └────────┬────────┘   └─────────────────┘       │
//! │                                 │ owns 1..n                             │
//! │  ┌─────────────────┐   ┌────────┴────────┐                              │
//! │  │   MenuItem      │──►│   OrderLine     │  price snapshotted           │
//! │  │  price_cents    │   │  subtotal_cents │  at line creation            │
//! │  │  available      │   │  status         │                              │
//! │  └─────────────────┘   └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Status Machines
//! Each status enum owns its transition table (`allowed_next`). The engines
//! never hard-code a transition; they ask the enum.
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID: (table `number`, `order_number`) - human-readable

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::validation::{self, ValidationResult};

// =============================================================================
// Table Status
// =============================================================================

/// Occupancy state of a physical table.
///
/// ```text
///                 assign                 confirm reservation
///   AVAILABLE ─────────────► OCCUPIED    AVAILABLE ─────────► RESERVED
///       ▲        release         │           ▲    complete        │
///       └────────────────────────┘           └────────────────────┘
///
///   AVAILABLE ◄──────────────► MAINTENANCE   (admin only)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TableStatus {
    Available,
    Occupied,
    Reserved,
    Maintenance,
}

impl TableStatus {
    /// Wire name (`"AVAILABLE"`).
    pub const fn as_str(&self) -> &'static str {
        match self {
            TableStatus::Available => "AVAILABLE",
            TableStatus::Occupied => "OCCUPIED",
            TableStatus::Reserved => "RESERVED",
            TableStatus::Maintenance => "MAINTENANCE",
        }
    }
}

impl fmt::Display for TableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Table
// =============================================================================

/// A physical seating unit.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Table {
    /// Unique identifier (UUID v4).
    pub id: String,
    /// Number painted on the table; unique per restaurant.
    pub number: i64,
    /// Seats.
    pub capacity: i64,
    /// Free-text area ("Terrace", "Window").
    pub location: Option<String>,
    pub status: TableStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Table {
    /// True when the table can seat `party_size` people.
    #[inline]
    pub fn fits(&self, party_size: i64) -> bool {
        self.capacity >= party_size
    }
}

/// Admin input for a new table. New tables start AVAILABLE.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewTable {
    pub number: i64,
    pub capacity: i64,
    #[serde(default)]
    pub location: Option<String>,
}

impl NewTable {
    pub fn validate(&self) -> ValidationResult<()> {
        validation::validate_table_number(self.number)?;
        validation::validate_capacity(self.capacity)?;
        validation::validate_location(self.location.as_deref())
    }
}

// =============================================================================
// Menu Item
// =============================================================================

/// A sellable item in the menu catalog.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    /// Price in cents (smallest currency unit).
    pub price_cents: i64,
    pub category: Option<String>,
    /// Switched off by the kitchen when sold out.
    pub available: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl MenuItem {
    /// Returns the price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

/// The slice of a menu item the order engine needs: identity, price and
/// availability at the instant of lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CatalogItem {
    pub id: String,
    pub name: String,
    pub price_cents: i64,
    pub available: bool,
}

impl CatalogItem {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

/// Admin input for a new menu item. `price` is decimal text (`"15.50"`),
/// rounded half-up to cents.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewMenuItem {
    pub name: String,
    pub price: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub available: Option<bool>,
}

impl NewMenuItem {
    /// Validates the item and returns its parsed price.
    pub fn validate(&self) -> ValidationResult<Money> {
        validation::validate_item_name(&self.name)?;
        let price = Money::parse(&self.price)?;
        validation::validate_price_cents(price.cents())?;
        Ok(price)
    }
}

impl From<MenuItem> for CatalogItem {
    fn from(item: MenuItem) -> Self {
        CatalogItem {
            id: item.id,
            name: item.name,
            price_cents: item.price_cents,
            available: item.available,
        }
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// Lifecycle of an order.
///
/// ```text
/// PENDING ──► PREPARING ──► READY ──► DELIVERED   [terminal]
///    │
///    └──(cancel, reason required)──► CANCELLED     [terminal]
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Preparing,
    Ready,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Wire name (`"PENDING"`).
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Preparing => "PREPARING",
            OrderStatus::Ready => "READY",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    /// Legal next statuses from this one.
    pub fn allowed_next(&self) -> &'static [OrderStatus] {
        match self {
            OrderStatus::Pending => &[OrderStatus::Preparing, OrderStatus::Cancelled],
            OrderStatus::Preparing => &[OrderStatus::Ready],
            OrderStatus::Ready => &[OrderStatus::Delivered],
            OrderStatus::Delivered | OrderStatus::Cancelled => &[],
        }
    }

    #[inline]
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        self.allowed_next().contains(&next)
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.allowed_next().is_empty()
    }

    /// Checks `self → next` against the transition table.
    ///
    /// ## Errors
    /// `CoreError::InvalidOrderTransition` carrying the current status, the
    /// requested one and every legal next status.
    pub fn check_transition(&self, next: OrderStatus) -> CoreResult<()> {
        if self.can_transition_to(next) {
            Ok(())
        } else {
            Err(CoreError::InvalidOrderTransition {
                current: *self,
                requested: next,
                allowed: self.allowed_next().to_vec(),
            })
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a line still counts towards its order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderLineStatus {
    Active,
    Removed,
}

// =============================================================================
// Order
// =============================================================================

/// Order header. `total_cents` is derived from the ACTIVE lines and is never
/// accepted from a client.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Order {
    pub id: String,
    /// `PED-YYYYMMDD-NNNN`
    pub order_number: String,
    pub waiter_id: String,
    pub table_id: String,
    pub status: OrderStatus,
    pub total_cents: i64,
    pub notes: Option<String>,
    pub cancel_reason: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Order {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// A line item in an order.
/// Uses snapshot pattern to freeze name and price at time of ordering.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderLine {
    pub id: String,
    pub order_id: String,
    pub item_id: String,
    /// Item name at time of ordering (frozen).
    pub name_snapshot: String,
    pub quantity: i64,
    /// Unit price in cents at time of ordering (frozen).
    pub unit_price_cents: i64,
    /// quantity × unit price.
    pub subtotal_cents: i64,
    pub notes: Option<String>,
    pub status: OrderLineStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl OrderLine {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }
}

/// An order together with its ACTIVE lines.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderDetail {
    pub order: Order,
    pub lines: Vec<OrderLine>,
}

// =============================================================================
// Reservation Status
// =============================================================================

/// Lifecycle of a reservation.
///
/// ```text
/// ACTIVE ──confirm──► CONFIRMED ──complete──► COMPLETED   [terminal]
///   │                     │
///   └──────cancel─────────┴──────────────────► CANCELLED   [terminal]
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    Active,
    Confirmed,
    Cancelled,
    Completed,
}

impl ReservationStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Active => "ACTIVE",
            ReservationStatus::Confirmed => "CONFIRMED",
            ReservationStatus::Cancelled => "CANCELLED",
            ReservationStatus::Completed => "COMPLETED",
        }
    }

    pub fn allowed_next(&self) -> &'static [ReservationStatus] {
        match self {
            ReservationStatus::Active => {
                &[ReservationStatus::Confirmed, ReservationStatus::Cancelled]
            }
            ReservationStatus::Confirmed => {
                &[ReservationStatus::Completed, ReservationStatus::Cancelled]
            }
            ReservationStatus::Cancelled | ReservationStatus::Completed => &[],
        }
    }

    /// ACTIVE and CONFIRMED reservations block their `(table, date, time)`.
    #[inline]
    pub fn holds_slot(&self) -> bool {
        matches!(self, ReservationStatus::Active | ReservationStatus::Confirmed)
    }

    pub fn check_transition(&self, next: ReservationStatus) -> CoreResult<()> {
        if self.allowed_next().contains(&next) {
            Ok(())
        } else {
            Err(CoreError::InvalidReservationTransition {
                current: *self,
                requested: next,
                allowed: self.allowed_next().to_vec(),
            })
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Reservation
// =============================================================================

/// A future booking of a table.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Reservation {
    pub id: String,
    pub customer_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub party_size: i64,
    #[ts(as = "String")]
    pub date: NaiveDate,
    #[ts(as = "String")]
    pub time: NaiveTime,
    pub table_id: String,
    pub status: ReservationStatus,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const ORDER_STATUSES: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    #[test]
    fn test_order_transition_table() {
        let legal = [
            (OrderStatus::Pending, OrderStatus::Preparing),
            (OrderStatus::Pending, OrderStatus::Cancelled),
            (OrderStatus::Preparing, OrderStatus::Ready),
            (OrderStatus::Ready, OrderStatus::Delivered),
        ];

        for from in ORDER_STATUSES {
            for to in ORDER_STATUSES {
                let expected = legal.contains(&(from, to));
                assert_eq!(
                    from.can_transition_to(to),
                    expected,
                    "{} -> {}",
                    from,
                    to
                );
                assert_eq!(from.check_transition(to).is_ok(), expected);
            }
        }
    }

    #[test]
    fn test_invalid_order_transition_carries_context() {
        let err = OrderStatus::Preparing
            .check_transition(OrderStatus::Delivered)
            .unwrap_err();

        match err {
            CoreError::InvalidOrderTransition {
                current,
                requested,
                allowed,
            } => {
                assert_eq!(current, OrderStatus::Preparing);
                assert_eq!(requested, OrderStatus::Delivered);
                assert_eq!(allowed, vec![OrderStatus::Ready]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Ready.is_terminal());
    }

    #[test]
    fn test_reservation_transition_table() {
        use ReservationStatus::*;

        assert!(Active.check_transition(Confirmed).is_ok());
        assert!(Active.check_transition(Cancelled).is_ok());
        assert!(Confirmed.check_transition(Completed).is_ok());
        assert!(Confirmed.check_transition(Cancelled).is_ok());

        assert!(Active.check_transition(Completed).is_err());
        assert!(Completed.check_transition(Cancelled).is_err());
        assert!(Cancelled.check_transition(Confirmed).is_err());
    }

    #[test]
    fn test_holds_slot() {
        assert!(ReservationStatus::Active.holds_slot());
        assert!(ReservationStatus::Confirmed.holds_slot());
        assert!(!ReservationStatus::Cancelled.holds_slot());
        assert!(!ReservationStatus::Completed.holds_slot());
    }

    #[test]
    fn test_new_table_and_menu_item_validation() {
        let table = NewTable {
            number: 4,
            capacity: 6,
            location: Some("Terrace".to_string()),
        };
        assert!(table.validate().is_ok());
        assert!(NewTable { capacity: 0, ..table }.validate().is_err());

        let item = NewMenuItem {
            name: "Pasta".to_string(),
            price: "15.5".to_string(),
            category: None,
            available: None,
        };
        assert_eq!(item.validate().unwrap().cents(), 1550);
        assert!(NewMenuItem {
            price: "-2".to_string(),
            ..item.clone()
        }
        .validate()
        .is_err());

        let absurd = NewMenuItem {
            price: "90000000000000000".to_string(),
            ..item
        };
        assert_eq!(absurd.validate().unwrap_err().field(), "price");
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&TableStatus::Maintenance).unwrap(),
            "\"MAINTENANCE\""
        );
        let parsed: OrderStatus = serde_json::from_str("\"CANCELLED\"").unwrap();
        assert_eq!(parsed, OrderStatus::Cancelled);
        assert_eq!(ReservationStatus::Confirmed.to_string(), "CONFIRMED");
    }
}
