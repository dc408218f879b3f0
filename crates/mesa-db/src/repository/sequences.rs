//! # Order Number Sequence
//!
//! One counter row per calendar day. Bumping it is a single upsert, so two
//! transactions creating orders at the same instant still get distinct
//! values: the second waits for the first's write lock and sees its
//! increment.

use chrono::NaiveDate;
use sqlx::SqliteExecutor;

use crate::error::DbResult;

/// Increments and returns the counter for `day` (1 for the first order).
pub async fn next_value<'e, E>(ex: E, day: NaiveDate) -> DbResult<i64>
where
    E: SqliteExecutor<'e>,
{
    let value: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO order_sequences (day, last_value)
        VALUES (?1, 1)
        ON CONFLICT (day) DO UPDATE SET last_value = last_value + 1
        RETURNING last_value
        "#,
    )
    .bind(day)
    .fetch_one(ex)
    .await?;

    Ok(value)
}
