//! # Order Rules
//!
//! Pure pieces of the order engine: command shapes, up-front validation,
//! price snapshotting and total derivation, order-number formatting.
//!
//! ## Order Creation Flow
//! ```text
//! CreateOrderRequest
//!       │ validate()            ← shape: ids, quantities, notes, ≥1 line
//!       ▼
//! price_lines(catalog, lines)   ← every item exists AND is available
//!       │                         (all-or-nothing), price snapshotted
//!       ▼
//! order_total(priced)           ← Σ subtotal, integer cents
//!       │
//!       ▼
//! mesa-db: one transaction      ← table guard, sequence, header, lines
//! ```
//!
//! ## Status Commands
//! A status change arrives as `{status, reason?}` and is converted into an
//! [`OrderStatusCommand`] before the engine runs. A `CANCELLED` request with
//! no reason is rejected here as a validation failure, never as an invalid
//! transition.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{CatalogItem, OrderDetail, OrderStatus};
use crate::validation::{
    validate_id, validate_line_count, validate_notes, validate_quantity, validate_reason,
    ValidationResult,
};
use crate::ORDER_NUMBER_PREFIX;

// =============================================================================
// Commands
// =============================================================================

/// One requested line on a new order (or an added line).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewOrderLine {
    pub item_id: String,
    pub quantity: i64,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewOrderLine {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_id("item_id", &self.item_id)?;
        validate_quantity(self.quantity)?;
        validate_notes(self.notes.as_deref())
    }
}

/// Input to `OrderEngine::create_order`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreateOrderRequest {
    pub table_id: String,
    pub items: Vec<NewOrderLine>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl CreateOrderRequest {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_id("table_id", &self.table_id)?;
        validate_line_count(self.items.len())?;
        for line in &self.items {
            line.validate()?;
        }
        validate_notes(self.notes.as_deref())
    }

    /// Distinct item ids referenced by the request, in first-seen order.
    pub fn item_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::with_capacity(self.items.len());
        for line in &self.items {
            if !ids.contains(&line.item_id) {
                ids.push(line.item_id.clone());
            }
        }
        ids
    }
}

/// Partial update of a PENDING order's line.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineUpdate {
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl LineUpdate {
    pub fn validate(&self) -> ValidationResult<()> {
        if self.quantity.is_none() && self.notes.is_none() {
            return Err(ValidationError::Required {
                field: "quantity or notes".to_string(),
            });
        }
        if let Some(qty) = self.quantity {
            validate_quantity(qty)?;
        }
        validate_notes(self.notes.as_deref())
    }
}

/// Raw status change as received from a client.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StatusChangeRequest {
    pub status: OrderStatus,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Validated status change. The transition table decides whether it is legal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderStatusCommand {
    /// Move along the kitchen pipeline (PREPARING, READY, DELIVERED).
    Advance(OrderStatus),
    /// Cancel with a mandatory, non-empty reason.
    Cancel { reason: String },
}

impl OrderStatusCommand {
    /// Status this command asks for.
    pub fn target(&self) -> OrderStatus {
        match self {
            OrderStatusCommand::Advance(status) => *status,
            OrderStatusCommand::Cancel { .. } => OrderStatus::Cancelled,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            OrderStatusCommand::Advance(_) => None,
            OrderStatusCommand::Cancel { reason } => Some(reason),
        }
    }
}

impl TryFrom<StatusChangeRequest> for OrderStatusCommand {
    type Error = ValidationError;

    fn try_from(req: StatusChangeRequest) -> Result<Self, Self::Error> {
        match req.status {
            OrderStatus::Cancelled => Ok(OrderStatusCommand::Cancel {
                reason: validate_reason(req.reason.as_deref())?,
            }),
            other => Ok(OrderStatusCommand::Advance(other)),
        }
    }
}

/// Filters accepted by `list_orders`. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderFilter {
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub table_id: Option<String>,
    #[serde(default)]
    pub waiter_id: Option<String>,
    /// Calendar day the order was created on (UTC).
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub date: Option<NaiveDate>,
}

// =============================================================================
// Pricing
// =============================================================================

/// A requested line resolved against the catalog with its price frozen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLine {
    pub item_id: String,
    pub name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub subtotal: Money,
    pub notes: Option<String>,
}

impl PricedLine {
    /// Freezes the item's current price. Fails if the subtotal does not fit
    /// in `i64` cents.
    pub fn new(
        item: &CatalogItem,
        quantity: i64,
        notes: Option<String>,
    ) -> ValidationResult<Self> {
        let unit_price = item.price();
        let subtotal = unit_price
            .checked_multiply_quantity(quantity)
            .ok_or_else(|| amount_overflow("subtotal"))?;

        Ok(PricedLine {
            item_id: item.id.clone(),
            name: item.name.clone(),
            quantity,
            unit_price,
            subtotal,
            notes,
        })
    }
}

/// Resolves every requested line against catalog rows.
///
/// ## Errors
/// - `MenuItemNotFound` for the first id the catalog did not return
/// - `ItemsUnavailable` if any referenced item is switched off (aggregate,
///   no per-item detail)
pub fn price_lines(catalog: &[CatalogItem], lines: &[NewOrderLine]) -> CoreResult<Vec<PricedLine>> {
    let by_id: HashMap<&str, &CatalogItem> =
        catalog.iter().map(|item| (item.id.as_str(), item)).collect();

    let mut any_unavailable = false;
    let mut priced = Vec::with_capacity(lines.len());

    for line in lines {
        let item = by_id
            .get(line.item_id.as_str())
            .ok_or_else(|| CoreError::MenuItemNotFound(line.item_id.clone()))?;

        if !item.available {
            any_unavailable = true;
            continue;
        }

        priced.push(PricedLine::new(item, line.quantity, line.notes.clone())?);
    }

    if any_unavailable {
        return Err(CoreError::ItemsUnavailable);
    }

    Ok(priced)
}

/// Order total from its priced lines.
pub fn order_total(lines: &[PricedLine]) -> ValidationResult<Money> {
    lines.iter().try_fold(Money::zero(), |acc, line| {
        acc.checked_add(line.subtotal)
            .ok_or_else(|| amount_overflow("total"))
    })
}

fn amount_overflow(field: &str) -> ValidationError {
    ValidationError::OutOfRange {
        field: field.to_string(),
        min: 0,
        max: i64::MAX,
    }
}

// =============================================================================
// Order Number
// =============================================================================

/// Formats an order number from the creation day and that day's sequence.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use mesa_core::order::format_order_number;
///
/// let day = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
/// assert_eq!(format_order_number(day, 7), "PED-20250101-0007");
/// ```
pub fn format_order_number(day: NaiveDate, sequence: i64) -> String {
    format!(
        "{}-{}-{:04}",
        ORDER_NUMBER_PREFIX,
        day.format("%Y%m%d"),
        sequence
    )
}

// =============================================================================
// Kitchen View
// =============================================================================

/// Per-bucket counts shown on the kitchen display header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct KitchenSummary {
    pub pending: usize,
    pub preparing: usize,
    pub total: usize,
}

/// Orders the kitchen still has to work on, oldest first per bucket.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct KitchenView {
    #[serde(rename = "PENDING")]
    pub pending: Vec<OrderDetail>,
    #[serde(rename = "PREPARING")]
    pub preparing: Vec<OrderDetail>,
    pub summary: KitchenSummary,
}

impl KitchenView {
    /// Buckets orders by status. Orders in any other status are ignored.
    pub fn from_orders(orders: Vec<OrderDetail>) -> Self {
        let (pending, rest): (Vec<_>, Vec<_>) = orders
            .into_iter()
            .partition(|d| d.order.status == OrderStatus::Pending);
        let preparing: Vec<_> = rest
            .into_iter()
            .filter(|d| d.order.status == OrderStatus::Preparing)
            .collect();

        let summary = KitchenSummary {
            pending: pending.len(),
            preparing: preparing.len(),
            total: pending.len() + preparing.len(),
        };

        KitchenView {
            pending,
            preparing,
            summary,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
