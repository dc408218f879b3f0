//! # Reservation Engine
//!
//! Books tables ahead of time and keeps the booking and the table status in
//! step.
//!
//! ```text
//!                       reservation            table
//! create    ──────────► ACTIVE                 (untouched, stays AVAILABLE)
//! confirm   ──────────► CONFIRMED              AVAILABLE → RESERVED
//! complete  ──────────► COMPLETED              RESERVED  → AVAILABLE
//! cancel    ──────────► CANCELLED              RESERVED  → AVAILABLE
//!                                              (only if it was CONFIRMED
//!                                               and the table is still RESERVED)
//! ```
//!
//! Each row above is one transaction.

use chrono::{NaiveDate, NaiveTime, Utc};
use mesa_core::reservation::{
    append_cancellation_note, pick_table, AvailabilityQuery, ReservationRequest,
    ReservationUpdate,
};
use mesa_core::validation::{validate_id, validate_reason};
use mesa_core::{CoreError, Reservation, ReservationStatus, Table, TableStatus, ValidationError};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::engine::table::transition_on;
use crate::error::{EngineError, EngineResult};
use crate::repository::{reservations, tables};

#[derive(Debug, Clone)]
pub struct ReservationEngine {
    pool: SqlitePool,
}

impl ReservationEngine {
    pub fn new(pool: SqlitePool) -> Self {
        ReservationEngine { pool }
    }

    /// Books a table for `(date, time)`.
    ///
    /// A preferred table that is AVAILABLE and large enough is used as is,
    /// and an ACTIVE or CONFIRMED reservation on the exact same slot fails
    /// with `SlotConflict`. Without a usable preference the smallest fitting
    /// table that is free at the slot is picked; when every fitting table is
    /// booked the smallest one is reported as the conflict.
    ///
    /// ## Errors
    /// - Validation
    /// - `NoTableAvailable` when nothing fits, or the table stopped being
    ///   AVAILABLE before the insert
    /// - `SlotConflict`
    pub async fn create(&self, request: ReservationRequest) -> EngineResult<Reservation> {
        request.validate()?;

        let candidates = tables::list_available(&self.pool, Some(request.party_size)).await?;
        let preferred = request.preferred_table_id.as_deref();
        let first_choice = pick_table(&candidates, request.party_size, preferred)
            .ok_or(CoreError::NoTableAvailable {
                party_size: request.party_size,
            })?
            .clone();

        let table = if preferred == Some(first_choice.id.as_str()) {
            // An explicitly requested table is never swapped for another.
            if reservations::slot_taken(
                &self.pool,
                &first_choice.id,
                request.date,
                request.time,
                None,
            )
            .await?
            {
                return Err(slot_conflict(&first_choice.id, request.date, request.time));
            }
            first_choice
        } else {
            let free = reservations::free_tables(
                &self.pool,
                request.date,
                request.time,
                request.party_size,
            )
            .await?;
            match pick_table(&free, request.party_size, None) {
                Some(table) => table.clone(),
                None => return Err(slot_conflict(&first_choice.id, request.date, request.time)),
            }
        };

        let now = Utc::now();
        let reservation = Reservation {
            id: Uuid::new_v4().to_string(),
            customer_name: request.customer_name.trim().to_string(),
            phone: request.phone,
            email: request.email,
            party_size: request.party_size,
            date: request.date,
            time: request.time,
            table_id: table.id.clone(),
            status: ReservationStatus::Active,
            notes: request.notes,
            created_at: now,
            updated_at: now,
        };

        match reservations::insert_if_table_available(&self.pool, &reservation).await {
            Ok(true) => {}
            Ok(false) => {
                debug!(table_id = %table.id, "Table left AVAILABLE before reservation insert");
                return Err(CoreError::NoTableAvailable {
                    party_size: reservation.party_size,
                }
                .into());
            }
            Err(e) if e.is_unique_violation_on("reservations.") => {
                return Err(slot_conflict(&table.id, reservation.date, reservation.time));
            }
            Err(e) => return Err(e.into()),
        }

        info!(
            reservation_id = %reservation.id,
            table_id = %reservation.table_id,
            date = %reservation.date,
            time = %reservation.time,
            party_size = reservation.party_size,
            "Reservation created"
        );
        Ok(reservation)
    }

    /// ACTIVE → CONFIRMED, and the table AVAILABLE → RESERVED.
    pub async fn confirm(&self, id: &str) -> EngineResult<Reservation> {
        validate_id("reservation_id", id)?;

        let mut tx = self.pool.begin().await?;
        let current = lock_and_check(&mut tx, id, ReservationStatus::Confirmed).await?;

        let updated = reservations::set_status(
            &mut *tx,
            id,
            ReservationStatus::Confirmed,
            current.notes.as_deref(),
        )
        .await?;
        transition_on(
            &mut tx,
            &current.table_id,
            TableStatus::Available,
            TableStatus::Reserved,
        )
        .await?;

        tx.commit().await?;

        info!(reservation_id = %id, table_id = %updated.table_id, "Reservation confirmed");
        Ok(updated)
    }

    /// CONFIRMED → COMPLETED, and the table RESERVED → AVAILABLE.
    pub async fn complete(&self, id: &str) -> EngineResult<Reservation> {
        validate_id("reservation_id", id)?;

        let mut tx = self.pool.begin().await?;
        let current = lock_and_check(&mut tx, id, ReservationStatus::Completed).await?;

        let updated = reservations::set_status(
            &mut *tx,
            id,
            ReservationStatus::Completed,
            current.notes.as_deref(),
        )
        .await?;
        transition_on(
            &mut tx,
            &current.table_id,
            TableStatus::Reserved,
            TableStatus::Available,
        )
        .await?;

        tx.commit().await?;

        info!(reservation_id = %id, table_id = %updated.table_id, "Reservation completed");
        Ok(updated)
    }

    /// ACTIVE/CONFIRMED → CANCELLED with the reason appended to the notes.
    ///
    /// A CONFIRMED reservation gives its table back when the table is still
    /// RESERVED. If someone already moved the table on, it is left alone.
    pub async fn cancel(&self, id: &str, reason: Option<&str>) -> EngineResult<Reservation> {
        validate_id("reservation_id", id)?;
        let reason = validate_reason(reason)?;

        let mut tx = self.pool.begin().await?;
        let current = lock_and_check(&mut tx, id, ReservationStatus::Cancelled).await?;

        let notes = append_cancellation_note(current.notes.as_deref(), &reason);
        let updated =
            reservations::set_status(&mut *tx, id, ReservationStatus::Cancelled, Some(&notes))
                .await?;

        if current.status == ReservationStatus::Confirmed {
            let released = tables::compare_and_set(
                &mut *tx,
                &current.table_id,
                TableStatus::Reserved,
                TableStatus::Available,
            )
            .await?;
            if released.is_none() {
                warn!(
                    reservation_id = %id,
                    table_id = %current.table_id,
                    "Cancelled confirmed reservation but table was no longer RESERVED"
                );
            }
        }

        tx.commit().await?;

        info!(reservation_id = %id, from = %current.status, "Reservation cancelled");
        Ok(updated)
    }

    /// Every AVAILABLE table that fits the party and has no ACTIVE or
    /// CONFIRMED reservation at the slot, smallest first.
    pub async fn check_availability(&self, query: AvailabilityQuery) -> EngineResult<Vec<Table>> {
        query.validate()?;
        Ok(reservations::free_tables(&self.pool, query.date, query.time, query.party_size).await?)
    }

    /// Edits an ACTIVE reservation.
    ///
    /// ## Errors
    /// - `ReservationNotModifiable` unless ACTIVE
    /// - Validation when the new party no longer fits the table
    /// - `SlotConflict` when the new slot is taken
    pub async fn update(&self, id: &str, update: ReservationUpdate) -> EngineResult<Reservation> {
        validate_id("reservation_id", id)?;
        update.validate()?;

        let mut tx = self.pool.begin().await?;
        let current = lock(&mut tx, id).await?;

        if current.status != ReservationStatus::Active {
            return Err(CoreError::ReservationNotModifiable {
                reservation_id: id.to_string(),
                current: current.status,
            }
            .into());
        }

        let mut next = current.clone();
        if let Some(name) = update.customer_name {
            next.customer_name = name.trim().to_string();
        }
        if update.phone.is_some() {
            next.phone = update.phone;
        }
        if update.email.is_some() {
            next.email = update.email;
        }
        if update.notes.is_some() {
            next.notes = update.notes;
        }
        if let Some(date) = update.date {
            next.date = date;
        }
        if let Some(time) = update.time {
            next.time = time;
        }

        if let Some(party_size) = update.party_size {
            let table = tables::get(&mut *tx, &current.table_id)
                .await?
                .ok_or_else(|| CoreError::TableNotFound(current.table_id.clone()))?;
            if !table.fits(party_size) {
                return Err(ValidationError::OutOfRange {
                    field: "party_size".to_string(),
                    min: 1,
                    max: table.capacity,
                }
                .into());
            }
            next.party_size = party_size;
        }

        let moved = next.date != current.date || next.time != current.time;
        if moved
            && reservations::slot_taken(&mut *tx, &next.table_id, next.date, next.time, Some(id))
                .await?
        {
            return Err(slot_conflict(&next.table_id, next.date, next.time));
        }

        let updated = match reservations::update_details(&mut *tx, &next).await {
            Ok(r) => r,
            Err(e) if e.is_unique_violation_on("reservations.") => {
                return Err(slot_conflict(&next.table_id, next.date, next.time));
            }
            Err(e) => return Err(e.into()),
        };

        tx.commit().await?;

        info!(reservation_id = %id, moved, "Reservation updated");
        Ok(updated)
    }

    pub async fn get(&self, id: &str) -> EngineResult<Reservation> {
        validate_id("reservation_id", id)?;
        reservations::get(&self.pool, id)
            .await?
            .ok_or_else(|| CoreError::ReservationNotFound(id.to_string()).into())
    }

    /// Reservations by slot, optionally for one day and/or one status.
    pub async fn list(
        &self,
        date: Option<NaiveDate>,
        status: Option<ReservationStatus>,
    ) -> EngineResult<Vec<Reservation>> {
        Ok(reservations::list(&self.pool, date, status).await?)
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn slot_conflict(table_id: &str, date: NaiveDate, time: NaiveTime) -> EngineError {
    CoreError::SlotConflict {
        table_id: table_id.to_string(),
        date,
        time,
    }
    .into()
}

/// Opens the transaction with a write on the reservation row and returns it.
async fn lock(conn: &mut SqliteConnection, id: &str) -> EngineResult<Reservation> {
    if !reservations::lock(&mut *conn, id).await? {
        return Err(CoreError::ReservationNotFound(id.to_string()).into());
    }
    reservations::get(&mut *conn, id)
        .await?
        .ok_or_else(|| CoreError::ReservationNotFound(id.to_string()).into())
}

async fn lock_and_check(
    conn: &mut SqliteConnection,
    id: &str,
    target: ReservationStatus,
) -> EngineResult<Reservation> {
    let current = lock(conn, id).await?;
    current.status.check_transition(target)?;
    Ok(current)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::TableRegistry;
    use crate::{Database, DbConfig};
    use mesa_core::NewTable;

    struct Fixture {
        engine: ReservationEngine,
        tables: TableRegistry,
    }

    async fn setup(capacities: &[i64]) -> (Fixture, Vec<Table>) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let registry = db.tables();
        let mut created = Vec::new();
        for (i, capacity) in capacities.iter().enumerate() {
            created.push(
                registry
                    .create(NewTable {
                        number: i as i64 + 1,
                        capacity: *capacity,
                        location: None,
                    })
                    .await
                    .unwrap(),
            );
        }
        (
            Fixture {
                engine: db.reservations(),
                tables: registry,
            },
            created,
        )
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 5, 17).unwrap()
    }

    fn at(hour: u32, min: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, min, 0).unwrap()
    }

    fn booking(party_size: i64, preferred: Option<&Table>) -> ReservationRequest {
        ReservationRequest {
            customer_name: "Lucia Gomez".to_string(),
            phone: Some("555-0101".to_string()),
            email: None,
            party_size,
            date: day(),
            time: at(20, 0),
            preferred_table_id: preferred.map(|t| t.id.clone()),
            notes: Some("window".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_picks_smallest_fitting_table() {
        let (f, tables) = setup(&[6, 4, 2]).await;

        let r = f.engine.create(booking(3, None)).await.unwrap();
        assert_eq!(r.status, ReservationStatus::Active);
        assert_eq!(r.table_id, tables[1].id);

        // Creating never touches the table.
        let table = f.tables.get_by_id(&tables[1].id).await.unwrap();
        assert_eq!(table.status, TableStatus::Available);
    }

    #[tokio::test]
    async fn test_create_honours_preference() {
        let (f, tables) = setup(&[6, 4]).await;
        let r = f.engine.create(booking(2, Some(&tables[0]))).await.unwrap();
        assert_eq!(r.table_id, tables[0].id);
    }

    #[tokio::test]
    async fn test_no_table_for_large_party() {
        let (f, _) = setup(&[2, 4]).await;
        let err = f.engine.create(booking(8, None)).await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::Core(CoreError::NoTableAvailable { party_size: 8 })
        ));
    }

    #[tokio::test]
    async fn test_same_slot_conflicts_other_time_does_not() {
        let (f, tables) = setup(&[4]).await;
        f.engine.create(booking(4, Some(&tables[0]))).await.unwrap();

        let err = f
            .engine
            .create(booking(4, Some(&tables[0])))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Core(CoreError::SlotConflict { .. })));

        let later = ReservationRequest {
            time: at(20, 30),
            ..booking(4, Some(&tables[0]))
        };
        assert!(f.engine.create(later).await.is_ok());
    }

    #[tokio::test]
    async fn test_cancelled_reservation_frees_slot() {
        let (f, tables) = setup(&[4]).await;
        let first = f.engine.create(booking(4, None)).await.unwrap();
        f.engine.cancel(&first.id, Some("flu")).await.unwrap();

        let second = f.engine.create(booking(4, None)).await.unwrap();
        assert_eq!(second.table_id, tables[0].id);
    }

    #[tokio::test]
    async fn test_confirm_and_complete_move_table() {
        let (f, tables) = setup(&[4]).await;
        let r = f.engine.create(booking(4, None)).await.unwrap();

        let confirmed = f.engine.confirm(&r.id).await.unwrap();
        assert_eq!(confirmed.status, ReservationStatus::Confirmed);
        let table = f.tables.get_by_id(&tables[0].id).await.unwrap();
        assert_eq!(table.status, TableStatus::Reserved);

        let completed = f.engine.complete(&r.id).await.unwrap();
        assert_eq!(completed.status, ReservationStatus::Completed);
        let table = f.tables.get_by_id(&tables[0].id).await.unwrap();
        assert_eq!(table.status, TableStatus::Available);

        let err = f.engine.cancel(&r.id, Some("late")).await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::Core(CoreError::InvalidReservationTransition {
                current: ReservationStatus::Completed,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_confirm_rolls_back_when_table_busy() {
        let (f, tables) = setup(&[4]).await;
        let r = f.engine.create(booking(4, None)).await.unwrap();
        f.tables
            .transition(&tables[0].id, TableStatus::Available, TableStatus::Occupied)
            .await
            .unwrap();

        let err = f.engine.confirm(&r.id).await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::Core(CoreError::TableConflict {
                current: TableStatus::Occupied,
                ..
            })
        ));

        let still = f.engine.get(&r.id).await.unwrap();
        assert_eq!(still.status, ReservationStatus::Active);
    }

    #[tokio::test]
    async fn test_cancel_confirmed_releases_table() {
        let (f, tables) = setup(&[4]).await;
        let r = f.engine.create(booking(4, None)).await.unwrap();
        f.engine.confirm(&r.id).await.unwrap();

        let cancelled = f.engine.cancel(&r.id, Some("  rain ")).await.unwrap();
        assert_eq!(cancelled.status, ReservationStatus::Cancelled);
        assert_eq!(cancelled.notes.as_deref(), Some("window\nCancelled: rain"));

        let table = f.tables.get_by_id(&tables[0].id).await.unwrap();
        assert_eq!(table.status, TableStatus::Available);
    }

    #[tokio::test]
    async fn test_cancel_requires_reason() {
        let (f, _) = setup(&[4]).await;
        let r = f.engine.create(booking(4, None)).await.unwrap();

        let err = f.engine.cancel(&r.id, Some("   ")).await.unwrap_err();
        assert_eq!(err.kind(), mesa_core::ErrorKind::Validation);
        assert_eq!(
            f.engine.get(&r.id).await.unwrap().status,
            ReservationStatus::Active
        );
    }

    #[tokio::test]
    async fn test_availability_excludes_booked_tables() {
        let (f, tables) = setup(&[4, 4, 2]).await;
        f.engine.create(booking(3, Some(&tables[0]))).await.unwrap();

        let free = f
            .engine
            .check_availability(AvailabilityQuery {
                date: day(),
                time: at(20, 0),
                party_size: 3,
            })
            .await
            .unwrap();
        let ids: Vec<&str> = free.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec![tables[1].id.as_str()]);
    }

    #[tokio::test]
    async fn test_update_only_while_active() {
        let (f, _) = setup(&[4, 4]).await;
        let r = f.engine.create(booking(2, None)).await.unwrap();

        let updated = f
            .engine
            .update(
                &r.id,
                ReservationUpdate {
                    party_size: Some(3),
                    time: Some(at(21, 0)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.party_size, 3);
        assert_eq!(updated.time, at(21, 0));

        let too_big = f
            .engine
            .update(
                &r.id,
                ReservationUpdate {
                    party_size: Some(6),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            too_big,
            EngineError::Core(CoreError::Validation(ValidationError::OutOfRange {
                ref field,
                max: 4,
                ..
            })) if field == "party_size"
        ));

        f.engine.confirm(&r.id).await.unwrap();
        let err = f
            .engine
            .update(
                &r.id,
                ReservationUpdate {
                    notes: Some("cake".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Core(CoreError::ReservationNotModifiable { .. })
        ));
    }

    #[tokio::test]
    async fn test_update_into_taken_slot() {
        let (f, tables) = setup(&[4]).await;
        f.engine.create(booking(2, Some(&tables[0]))).await.unwrap();
        let other = f
            .engine
            .create(ReservationRequest {
                time: at(19, 0),
                ..booking(2, Some(&tables[0]))
            })
            .await
            .unwrap();

        let err = f
            .engine
            .update(
                &other.id,
                ReservationUpdate {
                    time: Some(at(20, 0)),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Core(CoreError::SlotConflict { .. })));
    }

    #[tokio::test]
    async fn test_list_by_date_and_status() {
        let (f, _) = setup(&[4, 4]).await;
        let a = f.engine.create(booking(2, None)).await.unwrap();
        f.engine.create(booking(2, None)).await.unwrap();
        f.engine.confirm(&a.id).await.unwrap();

        assert_eq!(f.engine.list(Some(day()), None).await.unwrap().len(), 2);
        let confirmed = f
            .engine
            .list(None, Some(ReservationStatus::Confirmed))
            .await
            .unwrap();
        assert_eq!(confirmed.len(), 1);
        assert_eq!(confirmed[0].id, a.id);
    }
}
