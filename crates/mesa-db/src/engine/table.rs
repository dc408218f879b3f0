//! # Table Registry
//!
//! Owns table rows and the only path that changes a table's status.
//!
//! ## Compare-And-Swap
//! ```text
//! Waiter A: transition(#1, AVAILABLE → OCCUPIED) ──┐
//!                                                  ├──► single UPDATE ... WHERE status = 'available'
//! Waiter B: transition(#1, AVAILABLE → OCCUPIED) ──┘
//!
//! A: Ok(Table { status: OCCUPIED })
//! B: Err(TableConflict { expected: AVAILABLE, current: OCCUPIED })
//! ```

use chrono::Utc;
use mesa_core::{CoreError, NewTable, Table, TableStatus};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::EngineResult;
use crate::repository::tables;

/// Applies a CAS transition on an already-open connection or transaction.
///
/// On a miss the current row is re-read on the same connection so the
/// conflict reports the status that actually won.
pub(crate) async fn transition_on(
    conn: &mut SqliteConnection,
    id: &str,
    from: TableStatus,
    to: TableStatus,
) -> EngineResult<Table> {
    if let Some(table) = tables::compare_and_set(&mut *conn, id, from, to).await? {
        info!(table_id = %id, number = table.number, from = %from, to = %to, "Table transitioned");
        return Ok(table);
    }

    match tables::get(&mut *conn, id).await? {
        Some(table) => {
            debug!(table_id = %id, expected = %from, current = %table.status, "Table transition conflict");
            Err(CoreError::TableConflict {
                table_id: id.to_string(),
                expected: from,
                current: table.status,
            }
            .into())
        }
        None => Err(CoreError::TableNotFound(id.to_string()).into()),
    }
}

/// Table reads, creation and status transitions.
#[derive(Debug, Clone)]
pub struct TableRegistry {
    pool: SqlitePool,
}

impl TableRegistry {
    pub fn new(pool: SqlitePool) -> Self {
        TableRegistry { pool }
    }

    /// Gets a table by ID.
    ///
    /// ## Errors
    /// `TableNotFound` if no row has this id.
    pub async fn get_by_id(&self, id: &str) -> EngineResult<Table> {
        tables::get(&self.pool, id)
            .await?
            .ok_or_else(|| CoreError::TableNotFound(id.to_string()).into())
    }

    /// All tables by number, optionally only those in `status`.
    pub async fn list(&self, status: Option<TableStatus>) -> EngineResult<Vec<Table>> {
        Ok(tables::list(&self.pool, status).await?)
    }

    /// AVAILABLE tables with `capacity >= min_capacity`, smallest first
    /// (capacity, then number) so the first entry wastes the fewest seats.
    pub async fn list_available(&self, min_capacity: Option<i64>) -> EngineResult<Vec<Table>> {
        Ok(tables::list_available(&self.pool, min_capacity).await?)
    }

    /// Moves a table from `from` to `to` if, and only if, it is in `from`
    /// at the instant of the write.
    ///
    /// ## Errors
    /// - `TableConflict` carrying the actual current status
    /// - `TableNotFound`
    pub async fn transition(
        &self,
        id: &str,
        from: TableStatus,
        to: TableStatus,
    ) -> EngineResult<Table> {
        let mut conn = self.pool.acquire().await?;
        transition_on(&mut conn, id, from, to).await
    }

    /// Creates a table. New tables start AVAILABLE.
    ///
    /// ## Errors
    /// - Validation (number ≥ 1, capacity 1-50, location length)
    /// - `DuplicateTableNumber` when the number is taken
    pub async fn create(&self, input: NewTable) -> EngineResult<Table> {
        input.validate()?;

        let now = Utc::now();
        let table = Table {
            id: Uuid::new_v4().to_string(),
            number: input.number,
            capacity: input.capacity,
            location: input
                .location
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty()),
            status: TableStatus::Available,
            created_at: now,
            updated_at: now,
        };

        match tables::insert(&self.pool, &table).await {
            Ok(()) => {}
            Err(e) if e.is_unique_violation_on("tables.number") => {
                return Err(CoreError::DuplicateTableNumber(table.number).into());
            }
            Err(e) => return Err(e.into()),
        }

        info!(table_id = %table.id, number = table.number, capacity = table.capacity, "Table created");
        Ok(table)
    }

    /// Takes an AVAILABLE table out of service.
    pub async fn set_maintenance(&self, id: &str) -> EngineResult<Table> {
        self.transition(id, TableStatus::Available, TableStatus::Maintenance)
            .await
    }

    /// Puts a table under maintenance back into service.
    pub async fn restore(&self, id: &str) -> EngineResult<Table> {
        self.transition(id, TableStatus::Maintenance, TableStatus::Available)
            .await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    async fn setup() -> TableRegistry {
        Database::new(DbConfig::in_memory()).await.unwrap().tables()
    }

    fn new_table(number: i64, capacity: i64) -> NewTable {
        NewTable {
            number,
            capacity,
            location: None,
        }
    }

    #[tokio::test]
    async fn test_create_starts_available() {
        let registry = setup().await;
        let table = registry.create(new_table(1, 4)).await.unwrap();

        assert_eq!(table.status, TableStatus::Available);
        let loaded = registry.get_by_id(&table.id).await.unwrap();
        assert_eq!(loaded.number, 1);
    }

    #[tokio::test]
    async fn test_duplicate_number_rejected() {
        let registry = setup().await;
        registry.create(new_table(7, 4)).await.unwrap();

        let err = registry.create(new_table(7, 2)).await.unwrap_err();
        assert!(matches!(
            err,
            crate::EngineError::Core(CoreError::DuplicateTableNumber(7))
        ));
    }

    #[tokio::test]
    async fn test_transition_is_compare_and_swap() {
        let registry = setup().await;
        let table = registry.create(new_table(1, 4)).await.unwrap();

        let occupied = registry
            .transition(&table.id, TableStatus::Available, TableStatus::Occupied)
            .await
            .unwrap();
        assert_eq!(occupied.status, TableStatus::Occupied);

        let err = registry
            .transition(&table.id, TableStatus::Available, TableStatus::Occupied)
            .await
            .unwrap_err();
        match err {
            crate::EngineError::Core(CoreError::TableConflict {
                expected, current, ..
            }) => {
                assert_eq!(expected, TableStatus::Available);
                assert_eq!(current, TableStatus::Occupied);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_transition_unknown_table() {
        let registry = setup().await;
        let err = registry
            .transition(
                &Uuid::new_v4().to_string(),
                TableStatus::Available,
                TableStatus::Occupied,
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::EngineError::Core(CoreError::TableNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_available_orders_by_capacity_then_number() {
        let registry = setup().await;
        let six = registry.create(new_table(1, 6)).await.unwrap();
        let four_b = registry.create(new_table(3, 4)).await.unwrap();
        let four_a = registry.create(new_table(2, 4)).await.unwrap();
        let two = registry.create(new_table(4, 2)).await.unwrap();
        registry.set_maintenance(&two.id).await.unwrap();

        let ids: Vec<String> = registry
            .list_available(Some(3))
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![four_a.id, four_b.id, six.id]);

        let all = registry.list_available(None).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_maintenance_round_trip() {
        let registry = setup().await;
        let table = registry.create(new_table(1, 4)).await.unwrap();

        registry.set_maintenance(&table.id).await.unwrap();
        let listed = registry.list(Some(TableStatus::Maintenance)).await.unwrap();
        assert_eq!(listed.len(), 1);

        let restored = registry.restore(&table.id).await.unwrap();
        assert_eq!(restored.status, TableStatus::Available);
        assert!(registry.restore(&table.id).await.is_err());
    }
}
