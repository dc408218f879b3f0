//! # Order Repository
//!
//! Order headers.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Lifecycle                                   │
//! │                                                                         │
//! │  1. CREATE                                                             │
//! │     └── insert() header + order_lines::insert() per line, one tx       │
//! │                                                                         │
//! │  2. EDIT LINES (PENDING only)                                          │
//! │     └── lock_if_pending() → line write → recompute_total()             │
//! │                                                                         │
//! │  3. KITCHEN PIPELINE                                                   │
//! │     └── compare_and_set_status() PENDING → PREPARING → READY → ...     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use mesa_core::order::OrderFilter;
use mesa_core::pagination::PageRequest;
use mesa_core::{Order, OrderStatus};
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor};
use tracing::debug;

use crate::error::DbResult;

/// Gets an order by ID.
pub async fn get<'e, E>(ex: E, id: &str) -> DbResult<Option<Order>>
where
    E: SqliteExecutor<'e>,
{
    let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ?1")
        .bind(id)
        .fetch_optional(ex)
        .await?;

    Ok(order)
}

/// Inserts an order header.
pub async fn insert<'e, E>(ex: E, order: &Order) -> DbResult<()>
where
    E: SqliteExecutor<'e>,
{
    debug!(id = %order.id, order_number = %order.order_number, "Inserting order");

    sqlx::query(
        r#"
        INSERT INTO orders (
            id, order_number, waiter_id, table_id, status,
            total_cents, notes, cancel_reason,
            created_at, updated_at
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5,
            ?6, ?7, ?8,
            ?9, ?10
        )
        "#,
    )
    .bind(&order.id)
    .bind(&order.order_number)
    .bind(&order.waiter_id)
    .bind(&order.table_id)
    .bind(order.status)
    .bind(order.total_cents)
    .bind(&order.notes)
    .bind(&order.cancel_reason)
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(ex)
    .await?;

    Ok(())
}

/// Write-locks the order row if it is PENDING. Returns whether it matched.
///
/// First statement of every line-editing transaction: once it succeeds the
/// order cannot leave PENDING until this transaction ends.
pub async fn lock_if_pending<'e, E>(ex: E, id: &str) -> DbResult<bool>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query(
        "UPDATE orders SET updated_at = ?2 WHERE id = ?1 AND status = 'pending'",
    )
    .bind(id)
    .bind(Utc::now())
    .execute(ex)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Re-derives `total_cents` from the ACTIVE lines and returns it.
pub async fn recompute_total<'e, E>(ex: E, id: &str) -> DbResult<i64>
where
    E: SqliteExecutor<'e>,
{
    let total: i64 = sqlx::query_scalar(
        r#"
        UPDATE orders
        SET total_cents = (
                SELECT COALESCE(SUM(subtotal_cents), 0)
                FROM order_lines
                WHERE order_id = ?1 AND status = 'active'
            ),
            updated_at = ?2
        WHERE id = ?1
        RETURNING total_cents
        "#,
    )
    .bind(id)
    .bind(Utc::now())
    .fetch_one(ex)
    .await?;

    debug!(id = %id, total_cents = total, "Order total recomputed");
    Ok(total)
}

/// Moves an order from `from` to `to`, recording a cancel reason when given.
/// `None` when the order is missing or no longer in `from`.
pub async fn compare_and_set_status<'e, E>(
    ex: E,
    id: &str,
    from: OrderStatus,
    to: OrderStatus,
    cancel_reason: Option<&str>,
) -> DbResult<Option<Order>>
where
    E: SqliteExecutor<'e>,
{
    let order = sqlx::query_as::<_, Order>(
        r#"
        UPDATE orders
        SET status = ?3,
            cancel_reason = COALESCE(?4, cancel_reason),
            updated_at = ?5
        WHERE id = ?1 AND status = ?2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(from)
    .bind(to)
    .bind(cancel_reason)
    .bind(Utc::now())
    .fetch_optional(ex)
    .await?;

    Ok(order)
}

fn push_filter(qb: &mut QueryBuilder<'_, Sqlite>, filter: &OrderFilter) {
    qb.push(" WHERE 1 = 1");

    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status);
    }
    if let Some(table_id) = &filter.table_id {
        qb.push(" AND table_id = ").push_bind(table_id.clone());
    }
    if let Some(waiter_id) = &filter.waiter_id {
        qb.push(" AND waiter_id = ").push_bind(waiter_id.clone());
    }
    if let Some(date) = filter.date {
        // created_at is RFC 3339 text; its first 10 chars are the UTC day.
        qb.push(" AND substr(created_at, 1, 10) = ")
            .push_bind(date.format("%Y-%m-%d").to_string());
    }
}

/// Counts orders matching `filter`.
pub async fn count<'e, E>(ex: E, filter: &OrderFilter) -> DbResult<i64>
where
    E: SqliteExecutor<'e>,
{
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT COUNT(*) FROM orders");
    push_filter(&mut qb, filter);

    let total: i64 = qb.build_query_scalar().fetch_one(ex).await?;
    Ok(total)
}

/// One page of orders matching `filter`, newest first.
pub async fn list<'e, E>(ex: E, filter: &OrderFilter, page: PageRequest) -> DbResult<Vec<Order>>
where
    E: SqliteExecutor<'e>,
{
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM orders");
    push_filter(&mut qb, filter);
    qb.push(" ORDER BY created_at DESC, order_number DESC LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());

    let orders = qb.build_query_as::<Order>().fetch_all(ex).await?;
    Ok(orders)
}

/// Orders in the given statuses, oldest first.
pub async fn list_by_statuses<'e, E>(ex: E, statuses: &[OrderStatus]) -> DbResult<Vec<Order>>
where
    E: SqliteExecutor<'e>,
{
    if statuses.is_empty() {
        return Ok(Vec::new());
    }

    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM orders WHERE status IN (");
    let mut separated = qb.separated(", ");
    for status in statuses {
        separated.push_bind(*status);
    }
    separated.push_unseparated(") ORDER BY created_at ASC, order_number ASC");

    let orders = qb.build_query_as::<Order>().fetch_all(ex).await?;
    Ok(orders)
}
