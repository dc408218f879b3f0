//! # Mesa Server
//!
//! REST API over the table, order and reservation engines.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Server Routes                                   │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  /tables       │  │  /orders       │  │  /reservations             ││
//! │  │                │  │                │  │                            ││
//! │  │ • assign       │  │ • create       │  │ • create                   ││
//! │  │ • release      │  │ • items CRUD   │  │ • confirm/complete/cancel  ││
//! │  │ • maintenance  │  │ • status       │  │ • check-availability       ││
//! │  └────────────────┘  │ • kitchen      │  └────────────────────────────┘│
//! │                      └────────────────┘                                 │
//! │  ┌────────────────┐  ┌────────────────┐                                │
//! │  │  /menu-items   │  │  /health       │                                │
//! │  └────────────────┘  └────────────────┘                                │
//! │                                                                         │
//! │  AppState: one Database, one instance of each engine, shared by clone  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod identity;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use mesa_db::{Database, OrderEngine, ReservationEngine, SqliteMenuCatalog, TableRegistry};
use tower_http::trace::TraceLayer;

// Re-exports
pub use config::ServerConfig;
pub use error::{ApiError, ApiResult};

/// Shared application state. Engines are constructed once at startup.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub tables: TableRegistry,
    pub menu: SqliteMenuCatalog,
    pub orders: OrderEngine<SqliteMenuCatalog>,
    pub reservations: ReservationEngine,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(db: Database, config: ServerConfig) -> Self {
        AppState {
            tables: db.tables(),
            menu: db.menu(),
            orders: db.orders(),
            reservations: db.reservations(),
            db,
            config: Arc::new(config),
        }
    }
}

/// Builds the full router with request tracing.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::tables::router())
        .merge(routes::orders::router())
        .merge(routes::reservations::router())
        .merge(routes::menu::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
