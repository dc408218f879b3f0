//! # Menu Catalog
//!
//! The order engine only needs one thing from the menu: a batch lookup of
//! `{id, name, price, available}`. That seam is the [`MenuCatalog`] trait;
//! [`SqliteMenuCatalog`] is the production implementation and also carries
//! the admin operations the HTTP layer and seed binary use.
//!
//! ```text
//! OrderEngine<C: MenuCatalog>
//!        │ get_items(ids)
//!        ▼
//! SqliteMenuCatalog ──► menu_items table
//! (tests: any in-memory fake)
//! ```

use async_trait::async_trait;
use chrono::Utc;
use mesa_core::{CatalogItem, CoreError, MenuItem, NewMenuItem};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::error::{DbResult, EngineResult};
use crate::repository::menu_items;

/// Read-only item lookup consumed by the order engine.
#[async_trait]
pub trait MenuCatalog: Send + Sync {
    /// Items for the given ids. Unknown ids are absent from the result.
    async fn get_items(&self, ids: &[String]) -> DbResult<Vec<CatalogItem>>;
}

/// Menu catalog backed by the `menu_items` table.
#[derive(Debug, Clone)]
pub struct SqliteMenuCatalog {
    pool: SqlitePool,
}

impl SqliteMenuCatalog {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteMenuCatalog { pool }
    }

    /// Adds an item to the menu.
    pub async fn create(&self, input: NewMenuItem) -> EngineResult<MenuItem> {
        let price = input.validate()?;
        let now = Utc::now();

        let item = MenuItem {
            id: Uuid::new_v4().to_string(),
            name: input.name.trim().to_string(),
            price_cents: price.cents(),
            category: input.category,
            available: input.available.unwrap_or(true),
            created_at: now,
            updated_at: now,
        };

        menu_items::insert(&self.pool, &item).await?;
        info!(id = %item.id, name = %item.name, price = %price, "Menu item created");

        Ok(item)
    }

    pub async fn get(&self, id: &str) -> EngineResult<MenuItem> {
        menu_items::get(&self.pool, id)
            .await?
            .ok_or_else(|| CoreError::MenuItemNotFound(id.to_string()).into())
    }

    pub async fn list(&self, category: Option<&str>) -> EngineResult<Vec<MenuItem>> {
        Ok(menu_items::list(&self.pool, category).await?)
    }

    /// Switches an item on (back in stock) or off (sold out).
    pub async fn set_available(&self, id: &str, available: bool) -> EngineResult<MenuItem> {
        let item = menu_items::set_available(&self.pool, id, available)
            .await?
            .ok_or_else(|| CoreError::MenuItemNotFound(id.to_string()))?;

        info!(id = %id, available, "Menu item availability changed");
        Ok(item)
    }
}

#[async_trait]
impl MenuCatalog for SqliteMenuCatalog {
    async fn get_items(&self, ids: &[String]) -> DbResult<Vec<CatalogItem>> {
        menu_items::find_catalog_items(&self.pool, ids).await
    }
}
