//! # Reservation Rules
//!
//! Command shapes and the pure decisions of the reservation engine: which
//! table a booking lands on, what a cancellation does to the notes, which
//! action maps to which status.
//!
//! ## Slot Policy
//! A reservation occupies exactly one `(table, date, time)` slot. Two
//! reservations conflict only on exact equality of all three while both hold
//! the slot (ACTIVE or CONFIRMED). There is no duration window: 20:00 and
//! 20:30 on the same table do not conflict.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::types::{ReservationStatus, Table};
use crate::validation::{
    validate_customer_name, validate_email, validate_id, validate_notes, validate_party_size,
    ValidationResult,
};

/// Input to `ReservationEngine::create`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReservationRequest {
    pub customer_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub party_size: i64,
    #[ts(as = "String")]
    pub date: NaiveDate,
    #[ts(as = "String")]
    pub time: NaiveTime,
    #[serde(default)]
    pub preferred_table_id: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl ReservationRequest {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_customer_name(&self.customer_name)?;
        validate_email(self.email.as_deref())?;
        validate_party_size(self.party_size)?;
        if let Some(id) = &self.preferred_table_id {
            validate_id("preferred_table_id", id)?;
        }
        validate_notes(self.notes.as_deref())
    }
}

/// Partial edit of an ACTIVE reservation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReservationUpdate {
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub party_size: Option<i64>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub time: Option<NaiveTime>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl ReservationUpdate {
    pub fn is_empty(&self) -> bool {
        self.customer_name.is_none()
            && self.phone.is_none()
            && self.email.is_none()
            && self.party_size.is_none()
            && self.date.is_none()
            && self.time.is_none()
            && self.notes.is_none()
    }

    /// True when the edit moves the reservation to another slot.
    pub fn moves_slot(&self) -> bool {
        self.date.is_some() || self.time.is_some()
    }

    pub fn validate(&self) -> ValidationResult<()> {
        if self.is_empty() {
            return Err(ValidationError::Required {
                field: "update fields".to_string(),
            });
        }
        if let Some(name) = &self.customer_name {
            validate_customer_name(name)?;
        }
        validate_email(self.email.as_deref())?;
        if let Some(size) = self.party_size {
            validate_party_size(size)?;
        }
        validate_notes(self.notes.as_deref())
    }
}

/// Input to `ReservationEngine::check_availability`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AvailabilityQuery {
    #[ts(as = "String")]
    pub date: NaiveDate,
    #[ts(as = "String")]
    pub time: NaiveTime,
    pub party_size: i64,
}

impl AvailabilityQuery {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_party_size(self.party_size)
    }
}

/// Cancellation payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CancelRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

// =============================================================================
// Actions
// =============================================================================

/// Lifecycle action addressed by `PUT /reservations/{id}/{action}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservationAction {
    Confirm,
    Complete,
    Cancel,
}

impl ReservationAction {
    /// Status the action moves the reservation to.
    pub fn target(&self) -> ReservationStatus {
        match self {
            ReservationAction::Confirm => ReservationStatus::Confirmed,
            ReservationAction::Complete => ReservationStatus::Completed,
            ReservationAction::Cancel => ReservationStatus::Cancelled,
        }
    }
}

impl FromStr for ReservationAction {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confirm" => Ok(ReservationAction::Confirm),
            "complete" => Ok(ReservationAction::Complete),
            "cancel" => Ok(ReservationAction::Cancel),
            _ => Err(ValidationError::InvalidFormat {
                field: "action".to_string(),
                reason: "must be one of confirm, complete, cancel".to_string(),
            }),
        }
    }
}

// =============================================================================
// Decisions
// =============================================================================

/// Appends a cancellation reason to existing notes.
///
/// ```rust
/// use mesa_core::reservation::append_cancellation_note;
///
/// assert_eq!(append_cancellation_note(None, "rain"), "Cancelled: rain");
/// assert_eq!(
///     append_cancellation_note(Some("window seat"), "rain"),
///     "window seat\nCancelled: rain"
/// );
/// ```
pub fn append_cancellation_note(notes: Option<&str>, reason: &str) -> String {
    match notes.map(str::trim).filter(|n| !n.is_empty()) {
        Some(existing) => format!("{}\nCancelled: {}", existing, reason),
        None => format!("Cancelled: {}", reason),
    }
}

/// Chooses a table for a party among AVAILABLE, conflict-free candidates.
///
/// The preferred table wins if it is among the candidates and fits the
/// party. Otherwise the smallest fitting table, ties broken by number.
pub fn pick_table<'a>(
    candidates: &'a [Table],
    party_size: i64,
    preferred: Option<&str>,
) -> Option<&'a Table> {
    let fitting = || candidates.iter().filter(|t| t.fits(party_size));

    if let Some(preferred) = preferred {
        if let Some(table) = fitting().find(|t| t.id == preferred) {
            return Some(table);
        }
    }

    fitting().min_by_key(|t| (t.capacity, t.number))
}

// =============================================================================
// Unit Tests
// =============================================================================
