//! # Reservation Repository
//!
//! ## Slot Uniqueness
//! The partial index `idx_reservations_slot` allows at most one ACTIVE or
//! CONFIRMED reservation per `(table_id, date, time)`. [`slot_taken`] is the
//! friendly pre-check; the index is what makes two racing inserts resolve to
//! one success and one UNIQUE violation.

use chrono::{NaiveDate, NaiveTime, Utc};
use mesa_core::{Reservation, ReservationStatus, Table};
use sqlx::SqliteExecutor;
use tracing::debug;

use crate::error::DbResult;

pub async fn get<'e, E>(ex: E, id: &str) -> DbResult<Option<Reservation>>
where
    E: SqliteExecutor<'e>,
{
    let reservation = sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE id = ?1")
        .bind(id)
        .fetch_optional(ex)
        .await?;

    Ok(reservation)
}

/// Lists reservations by slot, optionally filtered by day and status.
pub async fn list<'e, E>(
    ex: E,
    date: Option<NaiveDate>,
    status: Option<ReservationStatus>,
) -> DbResult<Vec<Reservation>>
where
    E: SqliteExecutor<'e>,
{
    let reservations = sqlx::query_as::<_, Reservation>(
        r#"
        SELECT * FROM reservations
        WHERE (?1 IS NULL OR date = ?1)
          AND (?2 IS NULL OR status = ?2)
        ORDER BY date ASC, time ASC, created_at ASC
        "#,
    )
    .bind(date)
    .bind(status)
    .fetch_all(ex)
    .await?;

    Ok(reservations)
}

/// True when a slot-holding reservation other than `exclude_id` already sits
/// on `(table_id, date, time)`.
pub async fn slot_taken<'e, E>(
    ex: E,
    table_id: &str,
    date: NaiveDate,
    time: NaiveTime,
    exclude_id: Option<&str>,
) -> DbResult<bool>
where
    E: SqliteExecutor<'e>,
{
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM reservations
        WHERE table_id = ?1 AND date = ?2 AND time = ?3
          AND status IN ('active', 'confirmed')
          AND (?4 IS NULL OR id != ?4)
        "#,
    )
    .bind(table_id)
    .bind(date)
    .bind(time)
    .bind(exclude_id)
    .fetch_one(ex)
    .await?;

    Ok(count > 0)
}

/// AVAILABLE tables that fit the party and have no slot-holding
/// reservation at `(date, time)`, smallest first.
pub async fn free_tables<'e, E>(
    ex: E,
    date: NaiveDate,
    time: NaiveTime,
    party_size: i64,
) -> DbResult<Vec<Table>>
where
    E: SqliteExecutor<'e>,
{
    let tables = sqlx::query_as::<_, Table>(
        r#"
        SELECT t.* FROM tables t
        WHERE t.status = 'available'
          AND t.capacity >= ?3
          AND NOT EXISTS (
              SELECT 1 FROM reservations r
              WHERE r.table_id = t.id
                AND r.date = ?1 AND r.time = ?2
                AND r.status IN ('active', 'confirmed')
          )
        ORDER BY t.capacity ASC, t.number ASC
        "#,
    )
    .bind(date)
    .bind(time)
    .bind(party_size)
    .fetch_all(ex)
    .await?;

    Ok(tables)
}

/// Inserts an ACTIVE reservation, but only while its table is still
/// AVAILABLE and large enough. Returns whether the row was written.
pub async fn insert_if_table_available<'e, E>(ex: E, r: &Reservation) -> DbResult<bool>
where
    E: SqliteExecutor<'e>,
{
    debug!(id = %r.id, table_id = %r.table_id, date = %r.date, time = %r.time, "Inserting reservation");

    let result = sqlx::query(
        r#"
        INSERT INTO reservations (
            id, customer_name, phone, email, party_size,
            date, time, table_id, status, notes,
            created_at, updated_at
        )
        SELECT ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12
        WHERE EXISTS (
            SELECT 1 FROM tables
            WHERE id = ?8 AND status = 'available' AND capacity >= ?5
        )
        "#,
    )
    .bind(&r.id)
    .bind(&r.customer_name)
    .bind(&r.phone)
    .bind(&r.email)
    .bind(r.party_size)
    .bind(r.date)
    .bind(r.time)
    .bind(&r.table_id)
    .bind(r.status)
    .bind(&r.notes)
    .bind(r.created_at)
    .bind(r.updated_at)
    .execute(ex)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Takes the write lock on a reservation row. Returns whether it exists.
pub async fn lock<'e, E>(ex: E, id: &str) -> DbResult<bool>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("UPDATE reservations SET updated_at = updated_at WHERE id = ?1")
        .bind(id)
        .execute(ex)
        .await?;

    Ok(result.rows_affected() == 1)
}

/// Sets status (and notes) of a reservation.
pub async fn set_status<'e, E>(
    ex: E,
    id: &str,
    status: ReservationStatus,
    notes: Option<&str>,
) -> DbResult<Reservation>
where
    E: SqliteExecutor<'e>,
{
    let reservation = sqlx::query_as::<_, Reservation>(
        r#"
        UPDATE reservations
        SET status = ?2, notes = ?3, updated_at = ?4
        WHERE id = ?1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(status)
    .bind(notes)
    .bind(Utc::now())
    .fetch_one(ex)
    .await?;

    Ok(reservation)
}

/// Writes back every editable field of a reservation.
pub async fn update_details<'e, E>(ex: E, r: &Reservation) -> DbResult<Reservation>
where
    E: SqliteExecutor<'e>,
{
    let reservation = sqlx::query_as::<_, Reservation>(
        r#"
        UPDATE reservations
        SET customer_name = ?2, phone = ?3, email = ?4, party_size = ?5,
            date = ?6, time = ?7, notes = ?8, updated_at = ?9
        WHERE id = ?1
        RETURNING *
        "#,
    )
    .bind(&r.id)
    .bind(&r.customer_name)
    .bind(&r.phone)
    .bind(&r.email)
    .bind(r.party_size)
    .bind(r.date)
    .bind(r.time)
    .bind(&r.notes)
    .bind(Utc::now())
    .fetch_one(ex)
    .await?;

    Ok(reservation)
}
