//! # Order Engine
//!
//! Owns the lifecycle of orders and their lines, including the derived
//! order total. Also exposes seating (assign/release) because an order can
//! only be opened on an OCCUPIED table.
//!
//! ## Flow: create_order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  validate request                     → ValidationError                 │
//! │  read table (pool)                    → TableNotFound / NotOccupied     │
//! │  catalog.get_items(ids) (pool)        → MenuItemNotFound / Unavailable  │
//! │  price lines, total = Σ subtotal                                        │
//! │  ── BEGIN ─────────────────────────────────────────────────────────    │
//! │  lock table row if still OCCUPIED     → TableNotOccupied (lost race)    │
//! │  bump day sequence → PED-YYYYMMDD-NNNN                                  │
//! │  insert header + every line                                            │
//! │  ── COMMIT ────────────────────────────────────────────────────────    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Flow: line edits
//! Every add/update/remove opens with `orders::lock_if_pending`, so the
//! order cannot leave PENDING (and no other edit can interleave) until the
//! recomputed total has been written.

use std::collections::HashMap;

use chrono::Utc;
use mesa_core::order::{
    format_order_number, order_total, price_lines, CreateOrderRequest, KitchenView, LineUpdate,
    NewOrderLine, OrderFilter, OrderStatusCommand, PricedLine,
};
use mesa_core::pagination::{Page, PageRequest, Pagination};
use mesa_core::validation::validate_id;
use mesa_core::{
    CoreError, Order, OrderDetail, OrderLine, OrderLineStatus, OrderStatus, Table, TableStatus,
    ValidationError, MAX_LINES_PER_ORDER,
};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::catalog::MenuCatalog;
use crate::engine::table::TableRegistry;
use crate::error::EngineResult;
use crate::repository::{order_lines, orders, sequences, tables};

/// Order lifecycle, generic over the menu catalog it prices against.
#[derive(Debug, Clone)]
pub struct OrderEngine<C> {
    pool: SqlitePool,
    tables: TableRegistry,
    catalog: C,
}

impl<C: MenuCatalog> OrderEngine<C> {
    pub fn new(pool: SqlitePool, catalog: C) -> Self {
        OrderEngine {
            tables: TableRegistry::new(pool.clone()),
            pool,
            catalog,
        }
    }

    // =========================================================================
    // Seating
    // =========================================================================

    /// Seats guests: AVAILABLE → OCCUPIED.
    pub async fn assign_table(&self, table_id: &str) -> EngineResult<Table> {
        validate_id("table_id", table_id)?;
        self.tables
            .transition(table_id, TableStatus::Available, TableStatus::Occupied)
            .await
    }

    /// Frees a table: OCCUPIED → AVAILABLE.
    pub async fn release_table(&self, table_id: &str) -> EngineResult<Table> {
        validate_id("table_id", table_id)?;
        self.tables
            .transition(table_id, TableStatus::Occupied, TableStatus::Available)
            .await
    }

    // =========================================================================
    // Creation
    // =========================================================================

    /// Opens an order on an OCCUPIED table.
    ///
    /// Not idempotent: two identical calls create two orders with distinct
    /// order numbers.
    pub async fn create_order(
        &self,
        waiter_id: &str,
        request: CreateOrderRequest,
    ) -> EngineResult<OrderDetail> {
        request.validate()?;
        if waiter_id.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "waiter_id".to_string(),
            }
            .into());
        }

        let table = self.tables.get_by_id(&request.table_id).await?;
        ensure_occupied(&table.id, table.status)?;

        let catalog_items = self.catalog.get_items(&request.item_ids()).await?;
        let priced = price_lines(&catalog_items, &request.items)?;
        let total = order_total(&priced)?;

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        if !tables::lock_if_status(&mut *tx, &table.id, TableStatus::Occupied).await? {
            let current = tables::get(&mut *tx, &table.id)
                .await?
                .ok_or_else(|| CoreError::TableNotFound(table.id.clone()))?;
            return Err(CoreError::TableNotOccupied {
                table_id: table.id.clone(),
                current: current.status,
            }
            .into());
        }

        let sequence = sequences::next_value(&mut *tx, now.date_naive()).await?;
        let order = Order {
            id: Uuid::new_v4().to_string(),
            order_number: format_order_number(now.date_naive(), sequence),
            waiter_id: waiter_id.to_string(),
            table_id: table.id.clone(),
            status: OrderStatus::Pending,
            total_cents: total.cents(),
            notes: request.notes,
            cancel_reason: None,
            created_at: now,
            updated_at: now,
        };
        orders::insert(&mut *tx, &order).await?;

        let mut lines = Vec::with_capacity(priced.len());
        for priced_line in priced {
            let line = build_line(&order.id, priced_line);
            order_lines::insert(&mut *tx, &line).await?;
            lines.push(line);
        }

        tx.commit().await?;

        info!(
            order_id = %order.id,
            order_number = %order.order_number,
            table_id = %order.table_id,
            lines = lines.len(),
            total = %total,
            "Order created"
        );

        Ok(OrderDetail { order, lines })
    }

    // =========================================================================
    // Line Edits (PENDING only)
    // =========================================================================

    /// Adds a line to a PENDING order and recomputes its total.
    pub async fn add_line(&self, order_id: &str, input: NewOrderLine) -> EngineResult<OrderLine> {
        validate_id("order_id", order_id)?;
        input.validate()?;

        let order = self.load_order(order_id).await?;
        ensure_pending(&order)?;

        let item = self
            .catalog
            .get_items(std::slice::from_ref(&input.item_id))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| CoreError::MenuItemNotFound(input.item_id.clone()))?;
        if !item.available {
            return Err(CoreError::ItemUnavailable(item.id).into());
        }
        let priced = PricedLine::new(&item, input.quantity, input.notes)?;

        let mut tx = self.pool.begin().await?;
        lock_pending(&mut tx, order_id).await?;

        let active = order_lines::count_active(&mut *tx, order_id).await?;
        if active >= MAX_LINES_PER_ORDER as i64 {
            return Err(ValidationError::OutOfRange {
                field: "items".to_string(),
                min: 1,
                max: MAX_LINES_PER_ORDER as i64,
            }
            .into());
        }

        let line = build_line(order_id, priced);
        order_lines::insert(&mut *tx, &line).await?;
        let total = orders::recompute_total(&mut *tx, order_id).await?;

        tx.commit().await?;

        info!(order_id = %order_id, line_id = %line.id, total_cents = total, "Order line added");
        Ok(line)
    }

    /// Changes quantity and/or notes of a line on a PENDING order.
    pub async fn update_line(
        &self,
        order_id: &str,
        line_id: &str,
        update: LineUpdate,
    ) -> EngineResult<OrderLine> {
        validate_id("order_id", order_id)?;
        validate_id("line_id", line_id)?;
        update.validate()?;

        let mut tx = self.pool.begin().await?;
        lock_pending(&mut tx, order_id).await?;

        let line = order_lines::update_active(
            &mut *tx,
            order_id,
            line_id,
            update.quantity,
            update.notes.as_deref(),
        )
        .await?
        .ok_or_else(|| CoreError::OrderLineNotFound {
            order_id: order_id.to_string(),
            line_id: line_id.to_string(),
        })?;
        let total = orders::recompute_total(&mut *tx, order_id).await?;

        tx.commit().await?;

        info!(order_id = %order_id, line_id = %line_id, total_cents = total, "Order line updated");
        Ok(line)
    }

    /// Soft-removes a line from a PENDING order. The last remaining line
    /// cannot be removed.
    pub async fn remove_line(&self, order_id: &str, line_id: &str) -> EngineResult<OrderDetail> {
        validate_id("order_id", order_id)?;
        validate_id("line_id", line_id)?;

        let mut tx = self.pool.begin().await?;
        let order = lock_pending(&mut tx, order_id).await?;

        if order_lines::get_active(&mut *tx, order_id, line_id)
            .await?
            .is_none()
        {
            return Err(CoreError::OrderLineNotFound {
                order_id: order_id.to_string(),
                line_id: line_id.to_string(),
            }
            .into());
        }

        if order_lines::count_active(&mut *tx, order_id).await? <= 1 {
            return Err(CoreError::LastLineUndeletable {
                order_id: order_id.to_string(),
            }
            .into());
        }

        order_lines::mark_removed(&mut *tx, order_id, line_id).await?;
        let total = orders::recompute_total(&mut *tx, order_id).await?;
        let lines = order_lines::list_active(&mut *tx, order_id).await?;

        tx.commit().await?;

        info!(order_id = %order_id, line_id = %line_id, total_cents = total, "Order line removed");
        Ok(OrderDetail {
            order: Order {
                total_cents: total,
                ..order
            },
            lines,
        })
    }

    // =========================================================================
    // Status
    // =========================================================================

    /// Moves an order along its state machine.
    ///
    /// The command has already been validated (a cancel always carries a
    /// reason). The transition table is checked against the status read
    /// here and enforced again by the compare-and-swap write.
    pub async fn advance_status(
        &self,
        order_id: &str,
        command: OrderStatusCommand,
    ) -> EngineResult<Order> {
        validate_id("order_id", order_id)?;

        let target = command.target();
        let current = self.load_order(order_id).await?;
        current.status.check_transition(target)?;

        let updated = orders::compare_and_set_status(
            &self.pool,
            order_id,
            current.status,
            target,
            command.reason(),
        )
        .await?;

        match updated {
            Some(order) => {
                info!(
                    order_id = %order_id,
                    from = %current.status,
                    to = %target,
                    "Order status changed"
                );
                Ok(order)
            }
            None => {
                // Lost a race: report against the status that won.
                let now = self.load_order(order_id).await?;
                debug!(order_id = %order_id, current = %now.status, "Order status CAS missed");
                Err(CoreError::InvalidOrderTransition {
                    current: now.status,
                    requested: target,
                    allowed: now.status.allowed_next().to_vec(),
                }
                .into())
            }
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Order header with its ACTIVE lines, read from one snapshot.
    pub async fn get_order(&self, order_id: &str) -> EngineResult<OrderDetail> {
        validate_id("order_id", order_id)?;

        let mut tx = self.pool.begin().await?;
        let order = orders::get(&mut *tx, order_id)
            .await?
            .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()))?;
        let lines = order_lines::list_active(&mut *tx, order_id).await?;
        tx.commit().await?;

        Ok(OrderDetail { order, lines })
    }

    /// Filtered, paginated order headers, newest first.
    pub async fn list_orders(
        &self,
        filter: &OrderFilter,
        page: PageRequest,
    ) -> EngineResult<Page<Order>> {
        let mut tx = self.pool.begin().await?;
        let total = orders::count(&mut *tx, filter).await?;
        let data = orders::list(&mut *tx, filter, page).await?;
        tx.commit().await?;

        debug!(total, returned = data.len(), page = page.page(), "Listed orders");
        Ok(Page {
            data,
            pagination: Pagination::new(page, total),
        })
    }

    /// PENDING and PREPARING orders with their lines, oldest first.
    pub async fn kitchen_view(&self) -> EngineResult<KitchenView> {
        let mut tx = self.pool.begin().await?;
        let headers =
            orders::list_by_statuses(&mut *tx, &[OrderStatus::Pending, OrderStatus::Preparing])
                .await?;
        let ids: Vec<String> = headers.iter().map(|o| o.id.clone()).collect();
        let lines = order_lines::list_active_for_orders(&mut *tx, &ids).await?;
        tx.commit().await?;

        let mut by_order: HashMap<String, Vec<OrderLine>> = HashMap::new();
        for line in lines {
            by_order.entry(line.order_id.clone()).or_default().push(line);
        }

        let details = headers
            .into_iter()
            .map(|order| OrderDetail {
                lines: by_order.remove(&order.id).unwrap_or_default(),
                order,
            })
            .collect();

        Ok(KitchenView::from_orders(details))
    }

    async fn load_order(&self, order_id: &str) -> EngineResult<Order> {
        orders::get(&self.pool, order_id)
            .await?
            .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()).into())
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn ensure_occupied(table_id: &str, status: TableStatus) -> EngineResult<()> {
    if status == TableStatus::Occupied {
        Ok(())
    } else {
        Err(CoreError::TableNotOccupied {
            table_id: table_id.to_string(),
            current: status,
        }
        .into())
    }
}

fn ensure_pending(order: &Order) -> EngineResult<()> {
    if order.status == OrderStatus::Pending {
        Ok(())
    } else {
        Err(CoreError::OrderNotModifiable {
            order_id: order.id.clone(),
            current: order.status,
        }
        .into())
    }
}

/// First statement of a line-editing transaction. Locks the order while it
/// is PENDING and returns it; otherwise reports why it cannot be edited.
async fn lock_pending(conn: &mut SqliteConnection, order_id: &str) -> EngineResult<Order> {
    let locked = orders::lock_if_pending(&mut *conn, order_id).await?;
    let order = orders::get(&mut *conn, order_id)
        .await?
        .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()))?;

    if !locked {
        ensure_pending(&order)?;
    }
    Ok(order)
}

fn build_line(order_id: &str, priced: PricedLine) -> OrderLine {
    let now = Utc::now();
    OrderLine {
        id: Uuid::new_v4().to_string(),
        order_id: order_id.to_string(),
        item_id: priced.item_id,
        name_snapshot: priced.name,
        quantity: priced.quantity,
        unit_price_cents: priced.unit_price.cents(),
        subtotal_cents: priced.subtotal.cents(),
        notes: priced.notes,
        status: OrderLineStatus::Active,
        created_at: now,
        updated_at: now,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SqliteMenuCatalog;
    use crate::{Database, DbConfig, EngineError};
    use async_trait::async_trait;
    use mesa_core::order::StatusChangeRequest;
    use mesa_core::{CatalogItem, NewMenuItem, NewTable};

    struct Fixture {
        db: Database,
        engine: OrderEngine<SqliteMenuCatalog>,
        table: Table,
        pasta: String,
        soda: String,
    }

    async fn setup() -> Fixture {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let menu = db.menu();
        let pasta = menu
            .create(NewMenuItem {
                name: "Pasta".to_string(),
                price: "15.50".to_string(),
                category: None,
                available: None,
            })
            .await
            .unwrap();
        let soda = menu
            .create(NewMenuItem {
                name: "Soda".to_string(),
                price: "3.50".to_string(),
                category: None,
                available: None,
            })
            .await
            .unwrap();
        let table = db
            .tables()
            .create(NewTable {
                number: 1,
                capacity: 4,
                location: None,
            })
            .await
            .unwrap();

        let engine = db.orders();
        engine.assign_table(&table.id).await.unwrap();

        Fixture {
            engine,
            table,
            pasta: pasta.id,
            soda: soda.id,
            db,
        }
    }

    fn line(item_id: &str, quantity: i64) -> NewOrderLine {
        NewOrderLine {
            item_id: item_id.to_string(),
            quantity,
            notes: None,
        }
    }

    fn request(f: &Fixture) -> CreateOrderRequest {
        CreateOrderRequest {
            table_id: f.table.id.clone(),
            items: vec![line(&f.pasta, 2), line(&f.soda, 1)],
            notes: Some("birthday".to_string()),
        }
    }

    fn cmd(status: OrderStatus, reason: Option<&str>) -> OrderStatusCommand {
        OrderStatusCommand::try_from(StatusChangeRequest {
            status,
            reason: reason.map(str::to_string),
        })
        .unwrap()
    }

    async fn stored_total_matches_lines(engine: &OrderEngine<SqliteMenuCatalog>, id: &str) {
        let detail = engine.get_order(id).await.unwrap();
        let sum: i64 = detail.lines.iter().map(|l| l.subtotal_cents).sum();
        assert_eq!(detail.order.total_cents, sum);
        assert!(!detail.lines.is_empty());
    }

    #[tokio::test]
    async fn test_create_order_totals() {
        let f = setup().await;
        let detail = f.engine.create_order("waiter-1", request(&f)).await.unwrap();

        assert_eq!(detail.order.status, OrderStatus::Pending);
        assert_eq!(detail.order.total().to_decimal_string(), "34.50");
        assert_eq!(detail.lines.len(), 2);
        assert!(detail.order.order_number.starts_with("PED-"));
        stored_total_matches_lines(&f.engine, &detail.order.id).await;
    }

    #[tokio::test]
    async fn test_create_order_twice_gives_distinct_numbers() {
        let f = setup().await;
        let a = f.engine.create_order("waiter-1", request(&f)).await.unwrap();
        let b = f.engine.create_order("waiter-1", request(&f)).await.unwrap();

        assert_ne!(a.order.id, b.order.id);
        assert_ne!(a.order.order_number, b.order.order_number);
        assert!(a.order.order_number.ends_with("-0001"));
        assert!(b.order.order_number.ends_with("-0002"));
    }

    #[tokio::test]
    async fn test_create_order_requires_occupied_table() {
        let f = setup().await;
        f.engine.release_table(&f.table.id).await.unwrap();

        let err = f.engine.create_order("waiter-1", request(&f)).await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::Core(CoreError::TableNotOccupied {
                current: TableStatus::Available,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_create_order_requires_waiter() {
        let f = setup().await;
        let err = f.engine.create_order("  ", request(&f)).await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::Core(CoreError::Validation(ValidationError::Required { ref field }))
                if field == "waiter_id"
        ));
    }

    #[tokio::test]
    async fn test_create_order_rejects_unavailable_items() {
        let f = setup().await;
        f.db.menu().set_available(&f.soda, false).await.unwrap();

        let err = f.engine.create_order("waiter-1", request(&f)).await.unwrap_err();
        assert!(matches!(err, EngineError::Core(CoreError::ItemsUnavailable)));

        let page = f
            .engine
            .list_orders(&OrderFilter::default(), PageRequest::new(1, 20))
            .await
            .unwrap();
        assert_eq!(page.pagination.total, 0);
    }

    #[tokio::test]
    async fn test_price_is_snapshotted() {
        let f = setup().await;
        let detail = f.engine.create_order("waiter-1", request(&f)).await.unwrap();

        sqlx::query("UPDATE menu_items SET price_cents = 9999 WHERE id = ?1")
            .bind(&f.pasta)
            .execute(f.db.pool())
            .await
            .unwrap();

        let reloaded = f.engine.get_order(&detail.order.id).await.unwrap();
        assert_eq!(reloaded.order.total_cents, 3450);
    }

    #[tokio::test]
    async fn test_line_edits_keep_total_consistent() {
        let f = setup().await;
        let detail = f.engine.create_order("waiter-1", request(&f)).await.unwrap();
        let order_id = detail.order.id.clone();

        let added = f.engine.add_line(&order_id, line(&f.soda, 2)).await.unwrap();
        assert_eq!(added.subtotal_cents, 700);
        stored_total_matches_lines(&f.engine, &order_id).await;

        let updated = f
            .engine
            .update_line(
                &order_id,
                &added.id,
                LineUpdate {
                    quantity: Some(3),
                    notes: Some("no ice".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.subtotal_cents, 1050);
        assert_eq!(updated.notes.as_deref(), Some("no ice"));
        stored_total_matches_lines(&f.engine, &order_id).await;

        let after_remove = f.engine.remove_line(&order_id, &added.id).await.unwrap();
        assert_eq!(after_remove.order.total_cents, 3450);
        assert_eq!(after_remove.lines.len(), 2);
        stored_total_matches_lines(&f.engine, &order_id).await;
    }

    #[tokio::test]
    async fn test_last_line_cannot_be_removed() {
        let f = setup().await;
        let detail = f
            .engine
            .create_order(
                "waiter-1",
                CreateOrderRequest {
                    table_id: f.table.id.clone(),
                    items: vec![line(&f.pasta, 1)],
                    notes: None,
                },
            )
            .await
            .unwrap();

        let err = f
            .engine
            .remove_line(&detail.order.id, &detail.lines[0].id)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Core(CoreError::LastLineUndeletable { .. })
        ));
        stored_total_matches_lines(&f.engine, &detail.order.id).await;
    }

    #[tokio::test]
    async fn test_removed_line_cannot_be_updated() {
        let f = setup().await;
        let detail = f.engine.create_order("waiter-1", request(&f)).await.unwrap();
        let gone = &detail.lines[1];

        f.engine.remove_line(&detail.order.id, &gone.id).await.unwrap();
        let err = f
            .engine
            .update_line(
                &detail.order.id,
                &gone.id,
                LineUpdate {
                    quantity: Some(2),
                    notes: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Core(CoreError::OrderLineNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_lines_frozen_after_pending() {
        let f = setup().await;
        let detail = f.engine.create_order("waiter-1", request(&f)).await.unwrap();
        let order_id = detail.order.id.clone();

        f.engine
            .advance_status(&order_id, cmd(OrderStatus::Preparing, None))
            .await
            .unwrap();

        let err = f.engine.add_line(&order_id, line(&f.soda, 1)).await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::Core(CoreError::OrderNotModifiable {
                current: OrderStatus::Preparing,
                ..
            })
        ));

        let err = f
            .engine
            .remove_line(&order_id, &detail.lines[0].id)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Core(CoreError::OrderNotModifiable { .. })
        ));
    }

    #[tokio::test]
    async fn test_status_pipeline_and_invalid_jump() {
        let f = setup().await;
        let detail = f.engine.create_order("waiter-1", request(&f)).await.unwrap();
        let id = detail.order.id.clone();

        f.engine
            .advance_status(&id, cmd(OrderStatus::Preparing, None))
            .await
            .unwrap();

        let err = f
            .engine
            .advance_status(&id, cmd(OrderStatus::Delivered, None))
            .await
            .unwrap_err();
        match err {
            EngineError::Core(CoreError::InvalidOrderTransition {
                current,
                requested,
                allowed,
            }) => {
                assert_eq!(current, OrderStatus::Preparing);
                assert_eq!(requested, OrderStatus::Delivered);
                assert_eq!(allowed, vec![OrderStatus::Ready]);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        // Rejected transition never mutates status.
        let still = f.engine.get_order(&id).await.unwrap();
        assert_eq!(still.order.status, OrderStatus::Preparing);

        f.engine
            .advance_status(&id, cmd(OrderStatus::Ready, None))
            .await
            .unwrap();
        let delivered = f
            .engine
            .advance_status(&id, cmd(OrderStatus::Delivered, None))
            .await
            .unwrap();
        assert_eq!(delivered.status, OrderStatus::Delivered);

        assert!(f
            .engine
            .advance_status(&id, cmd(OrderStatus::Cancelled, Some("late")))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_cancel_records_reason() {
        let f = setup().await;
        let detail = f.engine.create_order("waiter-1", request(&f)).await.unwrap();

        let cancelled = f
            .engine
            .advance_status(&detail.order.id, cmd(OrderStatus::Cancelled, Some("guest left")))
            .await
            .unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert_eq!(cancelled.cancel_reason.as_deref(), Some("guest left"));
    }

    #[tokio::test]
    async fn test_list_orders_filters_and_paginates() {
        let f = setup().await;
        for _ in 0..3 {
            f.engine.create_order("waiter-1", request(&f)).await.unwrap();
        }
        let last = f.engine.create_order("waiter-2", request(&f)).await.unwrap();

        let page = f
            .engine
            .list_orders(&OrderFilter::default(), PageRequest::new(1, 2))
            .await
            .unwrap();
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.pagination.total, 4);
        assert_eq!(page.pagination.total_pages, 2);
        assert_eq!(page.data[0].id, last.order.id);

        let by_waiter = OrderFilter {
            waiter_id: Some("waiter-2".to_string()),
            ..Default::default()
        };
        let page = f
            .engine
            .list_orders(&by_waiter, PageRequest::new(1, 20))
            .await
            .unwrap();
        assert_eq!(page.pagination.total, 1);

        let today = OrderFilter {
            date: Some(Utc::now().date_naive()),
            status: Some(OrderStatus::Pending),
            ..Default::default()
        };
        let page = f
            .engine
            .list_orders(&today, PageRequest::new(1, 20))
            .await
            .unwrap();
        assert_eq!(page.pagination.total, 4);
    }

    #[tokio::test]
    async fn test_list_orders_with_degenerate_page_size() {
        let f = setup().await;
        f.engine.create_order("waiter-1", request(&f)).await.unwrap();

        for page in [PageRequest::new(1, 0), PageRequest::new(-1, -1)] {
            let result = f
                .engine
                .list_orders(&OrderFilter::default(), page)
                .await
                .unwrap();
            assert_eq!(result.data.len(), 1);
            assert_eq!(result.pagination.page, 1);
            assert_eq!(result.pagination.page_size, 20);
            assert_eq!(result.pagination.total_pages, 1);
        }
    }

    #[tokio::test]
    async fn test_kitchen_view() {
        let f = setup().await;
        let first = f.engine.create_order("waiter-1", request(&f)).await.unwrap();
        let second = f.engine.create_order("waiter-1", request(&f)).await.unwrap();
        let third = f.engine.create_order("waiter-1", request(&f)).await.unwrap();

        f.engine
            .advance_status(&second.order.id, cmd(OrderStatus::Preparing, None))
            .await
            .unwrap();
        f.engine
            .advance_status(&third.order.id, cmd(OrderStatus::Cancelled, Some("dup")))
            .await
            .unwrap();

        let view = f.engine.kitchen_view().await.unwrap();
        assert_eq!(view.summary.pending, 1);
        assert_eq!(view.summary.preparing, 1);
        assert_eq!(view.summary.total, 2);
        assert_eq!(view.pending[0].order.id, first.order.id);
        assert_eq!(view.pending[0].lines.len(), 2);
    }

    // A catalog that never touches storage.
    struct FixedCatalog(Vec<CatalogItem>);

    #[async_trait]
    impl MenuCatalog for FixedCatalog {
        async fn get_items(&self, ids: &[String]) -> crate::DbResult<Vec<CatalogItem>> {
            Ok(self
                .0
                .iter()
                .filter(|i| ids.contains(&i.id))
                .cloned()
                .collect())
        }
    }

    #[tokio::test]
    async fn test_engine_accepts_any_catalog() {
        let f = setup().await;
        let burger = Uuid::new_v4().to_string();
        let engine = OrderEngine::new(
            f.db.pool().clone(),
            FixedCatalog(vec![CatalogItem {
                id: burger.clone(),
                name: "Burger".to_string(),
                price_cents: 1005,
                available: true,
            }]),
        );

        let detail = engine
            .create_order(
                "waiter-1",
                CreateOrderRequest {
                    table_id: f.table.id.clone(),
                    items: vec![line(&burger, 3)],
                    notes: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(detail.order.total().to_decimal_string(), "30.15");

        let err = engine
            .add_line(&detail.order.id, line(&f.pasta, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Core(CoreError::MenuItemNotFound(_))));
    }
}
