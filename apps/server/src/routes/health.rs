//! Health check.
//!
//! ```json
//! { "status": "ok", "version": "0.1.0", "database": true,
//!   "migrations": { "embedded": 1, "applied": 1 } }
//! ```

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use mesa_db::migrations::migration_status;
use serde::Serialize;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    database: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    migrations: Option<MigrationInfo>,
}

#[derive(Debug, Serialize)]
pub struct MigrationInfo {
    embedded: usize,
    applied: usize,
}

/// GET /health - 200 when the database answers, 503 otherwise
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database = state.db.health_check().await;
    let migrations = if database {
        migration_status(state.db.pool())
            .await
            .ok()
            .map(|(embedded, applied)| MigrationInfo { embedded, applied })
    } else {
        None
    };

    let status = if database {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthResponse {
            status: if database { "ok" } else { "error" },
            version: env!("CARGO_PKG_VERSION"),
            database,
            migrations,
        }),
    )
}
