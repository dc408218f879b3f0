//! # Table Repository
//!
//! SQL for the `tables` table. The only statement that changes a table's
//! status is [`compare_and_set`].

use chrono::Utc;
use mesa_core::{Table, TableStatus};
use sqlx::SqliteExecutor;
use tracing::debug;

use crate::error::DbResult;

/// Gets a table by ID.
pub async fn get<'e, E>(ex: E, id: &str) -> DbResult<Option<Table>>
where
    E: SqliteExecutor<'e>,
{
    let table = sqlx::query_as::<_, Table>("SELECT * FROM tables WHERE id = ?1")
        .bind(id)
        .fetch_optional(ex)
        .await?;

    Ok(table)
}

/// Lists tables by number, optionally filtered by status.
pub async fn list<'e, E>(ex: E, status: Option<TableStatus>) -> DbResult<Vec<Table>>
where
    E: SqliteExecutor<'e>,
{
    let tables = sqlx::query_as::<_, Table>(
        r#"
        SELECT * FROM tables
        WHERE (?1 IS NULL OR status = ?1)
        ORDER BY number ASC
        "#,
    )
    .bind(status)
    .fetch_all(ex)
    .await?;

    Ok(tables)
}

/// AVAILABLE tables seating at least `min_capacity`, smallest first.
pub async fn list_available<'e, E>(ex: E, min_capacity: Option<i64>) -> DbResult<Vec<Table>>
where
    E: SqliteExecutor<'e>,
{
    debug!(min_capacity = ?min_capacity, "Listing available tables");

    let tables = sqlx::query_as::<_, Table>(
        r#"
        SELECT * FROM tables
        WHERE status = 'available'
          AND capacity >= ?1
        ORDER BY capacity ASC, number ASC
        "#,
    )
    .bind(min_capacity.unwrap_or(0))
    .fetch_all(ex)
    .await?;

    Ok(tables)
}

/// Inserts a new table row.
pub async fn insert<'e, E>(ex: E, table: &Table) -> DbResult<()>
where
    E: SqliteExecutor<'e>,
{
    debug!(id = %table.id, number = table.number, "Inserting table");

    sqlx::query(
        r#"
        INSERT INTO tables (id, number, capacity, location, status, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(&table.id)
    .bind(table.number)
    .bind(table.capacity)
    .bind(&table.location)
    .bind(table.status)
    .bind(table.created_at)
    .bind(table.updated_at)
    .execute(ex)
    .await?;

    Ok(())
}

/// Moves a table from `from` to `to` in one statement.
///
/// ## Compare-And-Swap
/// ```text
/// UPDATE tables SET status = 'occupied' WHERE id = ? AND status = 'available'
///        │
///        ├── 1 row  → Some(updated table)
///        └── 0 rows → None (missing, or status was not `from`)
/// ```
pub async fn compare_and_set<'e, E>(
    ex: E,
    id: &str,
    from: TableStatus,
    to: TableStatus,
) -> DbResult<Option<Table>>
where
    E: SqliteExecutor<'e>,
{
    debug!(id = %id, from = %from, to = %to, "Table compare-and-set");

    let table = sqlx::query_as::<_, Table>(
        r#"
        UPDATE tables
        SET status = ?3, updated_at = ?4
        WHERE id = ?1 AND status = ?2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(from)
    .bind(to)
    .bind(Utc::now())
    .fetch_optional(ex)
    .await?;

    Ok(table)
}

/// Write-locks the table row if it currently has `status`, without
/// changing it. Returns whether the row matched.
///
/// Used as the first statement of a transaction that depends on a table
/// staying in `status` until commit.
pub async fn lock_if_status<'e, E>(ex: E, id: &str, status: TableStatus) -> DbResult<bool>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("UPDATE tables SET updated_at = updated_at WHERE id = ?1 AND status = ?2")
        .bind(id)
        .bind(status)
        .execute(ex)
        .await?;

    Ok(result.rows_affected() == 1)
}
