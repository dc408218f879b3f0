//! # Order Line Repository
//!
//! Lines are never deleted; removal flips `status` to `removed` so history
//! survives. Every read here returns ACTIVE lines only.

use chrono::Utc;
use mesa_core::OrderLine;
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor};
use tracing::debug;

use crate::error::DbResult;

/// Inserts a line.
///
/// ## Snapshot Pattern
/// Item name and unit price are copied onto the line. Later catalog
/// changes do not touch existing orders.
pub async fn insert<'e, E>(ex: E, line: &OrderLine) -> DbResult<()>
where
    E: SqliteExecutor<'e>,
{
    debug!(order_id = %line.order_id, item_id = %line.item_id, "Inserting order line");

    sqlx::query(
        r#"
        INSERT INTO order_lines (
            id, order_id, item_id, name_snapshot,
            quantity, unit_price_cents, subtotal_cents,
            notes, status, created_at, updated_at
        ) VALUES (
            ?1, ?2, ?3, ?4,
            ?5, ?6, ?7,
            ?8, ?9, ?10, ?11
        )
        "#,
    )
    .bind(&line.id)
    .bind(&line.order_id)
    .bind(&line.item_id)
    .bind(&line.name_snapshot)
    .bind(line.quantity)
    .bind(line.unit_price_cents)
    .bind(line.subtotal_cents)
    .bind(&line.notes)
    .bind(line.status)
    .bind(line.created_at)
    .bind(line.updated_at)
    .execute(ex)
    .await?;

    Ok(())
}

/// Gets an ACTIVE line of an order.
pub async fn get_active<'e, E>(ex: E, order_id: &str, line_id: &str) -> DbResult<Option<OrderLine>>
where
    E: SqliteExecutor<'e>,
{
    let line = sqlx::query_as::<_, OrderLine>(
        "SELECT * FROM order_lines WHERE id = ?1 AND order_id = ?2 AND status = 'active'",
    )
    .bind(line_id)
    .bind(order_id)
    .fetch_optional(ex)
    .await?;

    Ok(line)
}

/// ACTIVE lines of an order in insertion order.
pub async fn list_active<'e, E>(ex: E, order_id: &str) -> DbResult<Vec<OrderLine>>
where
    E: SqliteExecutor<'e>,
{
    let lines = sqlx::query_as::<_, OrderLine>(
        r#"
        SELECT * FROM order_lines
        WHERE order_id = ?1 AND status = 'active'
        ORDER BY created_at ASC, rowid ASC
        "#,
    )
    .bind(order_id)
    .fetch_all(ex)
    .await?;

    Ok(lines)
}

/// ACTIVE lines of several orders at once.
pub async fn list_active_for_orders<'e, E>(ex: E, order_ids: &[String]) -> DbResult<Vec<OrderLine>>
where
    E: SqliteExecutor<'e>,
{
    if order_ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new("SELECT * FROM order_lines WHERE status = 'active' AND order_id IN (");
    let mut separated = qb.separated(", ");
    for id in order_ids {
        separated.push_bind(id);
    }
    separated.push_unseparated(") ORDER BY created_at ASC, rowid ASC");

    let lines = qb.build_query_as::<OrderLine>().fetch_all(ex).await?;
    Ok(lines)
}

pub async fn count_active<'e, E>(ex: E, order_id: &str) -> DbResult<i64>
where
    E: SqliteExecutor<'e>,
{
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM order_lines WHERE order_id = ?1 AND status = 'active'",
    )
    .bind(order_id)
    .fetch_one(ex)
    .await?;

    Ok(count)
}

/// Applies a quantity and/or notes change to an ACTIVE line, re-deriving
/// its subtotal from the frozen unit price. `None` if the line is missing.
pub async fn update_active<'e, E>(
    ex: E,
    order_id: &str,
    line_id: &str,
    quantity: Option<i64>,
    notes: Option<&str>,
) -> DbResult<Option<OrderLine>>
where
    E: SqliteExecutor<'e>,
{
    let line = sqlx::query_as::<_, OrderLine>(
        r#"
        UPDATE order_lines
        SET quantity = COALESCE(?3, quantity),
            subtotal_cents = COALESCE(?3, quantity) * unit_price_cents,
            notes = COALESCE(?4, notes),
            updated_at = ?5
        WHERE id = ?1 AND order_id = ?2 AND status = 'active'
        RETURNING *
        "#,
    )
    .bind(line_id)
    .bind(order_id)
    .bind(quantity)
    .bind(notes)
    .bind(Utc::now())
    .fetch_optional(ex)
    .await?;

    Ok(line)
}

/// Soft-removes an ACTIVE line. Returns whether a row changed.
pub async fn mark_removed<'e, E>(ex: E, order_id: &str, line_id: &str) -> DbResult<bool>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        UPDATE order_lines
        SET status = 'removed', updated_at = ?3
        WHERE id = ?1 AND order_id = ?2 AND status = 'active'
        "#,
    )
    .bind(line_id)
    .bind(order_id)
    .bind(Utc::now())
    .execute(ex)
    .await?;

    Ok(result.rows_affected() == 1)
}
