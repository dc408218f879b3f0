//! # Validation Module
//!
//! Input validation for every command the engines accept.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP extractor (axum)                                        │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── Malformed JSON → 400 before any engine runs                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Engine entry point                                           │
//! │  └── THIS MODULE: field rules (ids, ranges, lengths)                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK / NOT NULL constraints                                      │
//! │  ├── UNIQUE constraints (table number, order number, slot)             │
//! │  └── Foreign key constraints                                           │
//! │                                                                         │
//! │  A ValidationError never touches storage                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,no_run
//! use mesa_core::validation::{validate_id, validate_quantity};
//!
//! validate_id("table_id", "550e8400-e29b-41d4-a716-446655440000").unwrap();
//! validate_quantity(5).unwrap();
//! ```

use crate::error::ValidationError;
use crate::{
    MAX_CUSTOMER_NAME_LEN, MAX_ITEM_QUANTITY, MAX_LINES_PER_ORDER, MAX_LOCATION_LEN,
    MAX_NOTES_LEN, MAX_PARTY_SIZE, MAX_PRICE_CENTS, MAX_TABLE_CAPACITY,
};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

fn required_within(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

fn optional_within(field: &str, value: Option<&str>, max: usize) -> ValidationResult<()> {
    match value {
        Some(v) if v.chars().count() > max => Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        }),
        _ => Ok(()),
    }
}

/// Validates a menu item name (1-200 characters).
pub fn validate_item_name(name: &str) -> ValidationResult<()> {
    required_within("name", name, 200)
}

/// Validates a customer name on a reservation.
///
/// ## Example
/// ```rust
/// use mesa_core::validation::validate_customer_name;
///
/// assert!(validate_customer_name("Ana Pérez").is_ok());
/// assert!(validate_customer_name("   ").is_err());
/// ```
pub fn validate_customer_name(name: &str) -> ValidationResult<()> {
    required_within("customer_name", name, MAX_CUSTOMER_NAME_LEN)
}

/// Validates an optional contact email. Only checks for an `@`; delivery is
/// somebody else's problem.
pub fn validate_email(email: Option<&str>) -> ValidationResult<()> {
    match email.map(str::trim) {
        Some(e) if !e.is_empty() && !e.contains('@') => Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must contain '@'".to_string(),
        }),
        _ => optional_within("email", email, 254),
    }
}

/// Validates optional free-text notes (orders, lines, reservations).
pub fn validate_notes(notes: Option<&str>) -> ValidationResult<()> {
    optional_within("notes", notes, MAX_NOTES_LEN)
}

/// Validates an optional table location.
pub fn validate_location(location: Option<&str>) -> ValidationResult<()> {
    optional_within("location", location, MAX_LOCATION_LEN)
}

/// Validates a cancellation reason. Cancelling requires one.
///
/// ## Example
/// ```rust
/// use mesa_core::validation::validate_reason;
///
/// assert!(validate_reason(Some("customer left")).is_ok());
/// assert!(validate_reason(Some("")).is_err());
/// assert!(validate_reason(None).is_err());
/// ```
pub fn validate_reason(reason: Option<&str>) -> ValidationResult<String> {
    let reason = reason.map(str::trim).unwrap_or_default();
    required_within("reason", reason, MAX_NOTES_LEN)?;
    Ok(reason.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
///
/// ## Example
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Order: Add Line                                                        │
/// │                                                                         │
/// │  Waiter enters quantity: 5                                             │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_quantity(5) ← THIS FUNCTION                                  │
/// │       │                                                                 │
/// │       ├── qty <= 0? → Error: "quantity must be positive"               │
/// │       │                                                                 │
/// │       ├── qty > 999? → Error: "quantity must be between 1 and 999"     │
/// │       │                                                                 │
/// │       └── OK → Proceed with add_line                                   │
/// │                                                                         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price in cents. Zero is allowed (complimentary items).
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if !(0..=MAX_PRICE_CENTS).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: MAX_PRICE_CENTS,
        });
    }

    Ok(())
}

/// Validates a table number (>= 1).
pub fn validate_table_number(number: i64) -> ValidationResult<()> {
    if number < 1 {
        return Err(ValidationError::MustBePositive {
            field: "number".to_string(),
        });
    }

    Ok(())
}

/// Validates a table capacity (1-50 seats).
pub fn validate_capacity(capacity: i64) -> ValidationResult<()> {
    if !(1..=MAX_TABLE_CAPACITY).contains(&capacity) {
        return Err(ValidationError::OutOfRange {
            field: "capacity".to_string(),
            min: 1,
            max: MAX_TABLE_CAPACITY,
        });
    }

    Ok(())
}

/// Validates a party size (1-50 guests).
pub fn validate_party_size(party_size: i64) -> ValidationResult<()> {
    if !(1..=MAX_PARTY_SIZE).contains(&party_size) {
        return Err(ValidationError::OutOfRange {
            field: "party_size".to_string(),
            min: 1,
            max: MAX_PARTY_SIZE,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates the number of lines submitted with a new order.
///
/// ## Rules
/// - At least one line
/// - At most MAX_LINES_PER_ORDER (100)
pub fn validate_line_count(count: usize) -> ValidationResult<()> {
    if count == 0 {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    if count > MAX_LINES_PER_ORDER {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_LINES_PER_ORDER as i64,
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string, reporting the offending field by name.
///
/// ## Example
/// ```rust
/// use mesa_core::validation::validate_id;
///
/// assert!(validate_id("order_id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_id("order_id", "not-a-uuid").is_err());
/// ```
pub fn validate_id(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
