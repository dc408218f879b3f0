//! # Menu Item Repository

use chrono::Utc;
use mesa_core::{CatalogItem, MenuItem};
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor};
use tracing::debug;

use crate::error::DbResult;

pub async fn get<'e, E>(ex: E, id: &str) -> DbResult<Option<MenuItem>>
where
    E: SqliteExecutor<'e>,
{
    let item = sqlx::query_as::<_, MenuItem>("SELECT * FROM menu_items WHERE id = ?1")
        .bind(id)
        .fetch_optional(ex)
        .await?;

    Ok(item)
}

/// Lists items by category then name.
pub async fn list<'e, E>(ex: E, category: Option<&str>) -> DbResult<Vec<MenuItem>>
where
    E: SqliteExecutor<'e>,
{
    let items = sqlx::query_as::<_, MenuItem>(
        r#"
        SELECT * FROM menu_items
        WHERE (?1 IS NULL OR category = ?1)
        ORDER BY category ASC, name ASC
        "#,
    )
    .bind(category)
    .fetch_all(ex)
    .await?;

    Ok(items)
}

/// Batch lookup for the catalog. Unknown ids are simply absent from the
/// result.
pub async fn find_catalog_items<'e, E>(ex: E, ids: &[String]) -> DbResult<Vec<CatalogItem>>
where
    E: SqliteExecutor<'e>,
{
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    debug!(count = ids.len(), "Looking up catalog items");

    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT id, name, price_cents, available FROM menu_items WHERE id IN (",
    );
    let mut separated = qb.separated(", ");
    for id in ids {
        separated.push_bind(id);
    }
    separated.push_unseparated(")");

    let items = qb.build_query_as::<CatalogItem>().fetch_all(ex).await?;

    Ok(items)
}

pub async fn insert<'e, E>(ex: E, item: &MenuItem) -> DbResult<()>
where
    E: SqliteExecutor<'e>,
{
    debug!(id = %item.id, name = %item.name, "Inserting menu item");

    sqlx::query(
        r#"
        INSERT INTO menu_items (id, name, price_cents, category, available, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(&item.id)
    .bind(&item.name)
    .bind(item.price_cents)
    .bind(&item.category)
    .bind(item.available)
    .bind(item.created_at)
    .bind(item.updated_at)
    .execute(ex)
    .await?;

    Ok(())
}

/// Switches an item on or off. Returns the updated row, `None` if missing.
pub async fn set_available<'e, E>(ex: E, id: &str, available: bool) -> DbResult<Option<MenuItem>>
where
    E: SqliteExecutor<'e>,
{
    debug!(id = %id, available, "Setting menu item availability");

    let item = sqlx::query_as::<_, MenuItem>(
        r#"
        UPDATE menu_items
        SET available = ?2, updated_at = ?3
        WHERE id = ?1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(available)
    .bind(Utc::now())
    .fetch_optional(ex)
    .await?;

    Ok(item)
}
