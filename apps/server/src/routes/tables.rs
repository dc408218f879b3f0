//! Table routes.
//!
//! Every status change goes through the registry's compare-and-swap, so two
//! hosts seating the same table get exactly one 200 and one 409.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use mesa_core::validation::validate_id;
use mesa_core::{NewTable, Table, TableStatus};
use serde::Deserialize;

use crate::error::ApiResult;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tables", get(list_tables).post(create_table))
        .route("/tables/available", get(list_available))
        .route("/tables/{id}", get(get_table))
        .route("/tables/{id}/assign", post(assign))
        .route("/tables/{id}/release", post(release))
        .route("/tables/{id}/maintenance", post(maintenance))
        .route("/tables/{id}/restore", post(restore))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<TableStatus>,
}

#[derive(Debug, Deserialize)]
pub struct AvailableQuery {
    pub min_capacity: Option<i64>,
}

async fn list_tables(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Table>>> {
    let Query(query) = query?;
    Ok(Json(state.tables.list(query.status).await?))
}

async fn list_available(
    State(state): State<AppState>,
    query: Result<Query<AvailableQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Table>>> {
    let Query(query) = query?;
    Ok(Json(state.tables.list_available(query.min_capacity).await?))
}

async fn create_table(
    State(state): State<AppState>,
    body: Result<Json<NewTable>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Table>)> {
    let Json(input) = body?;
    let table = state.tables.create(input).await?;
    Ok((StatusCode::CREATED, Json(table)))
}

async fn get_table(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Table>> {
    validate_id("table_id", &id)?;
    Ok(Json(state.tables.get_by_id(&id).await?))
}

/// POST /tables/{id}/assign - AVAILABLE to OCCUPIED
async fn assign(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Table>> {
    Ok(Json(state.orders.assign_table(&id).await?))
}

/// POST /tables/{id}/release - OCCUPIED to AVAILABLE
async fn release(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Table>> {
    Ok(Json(state.orders.release_table(&id).await?))
}

async fn maintenance(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Table>> {
    validate_id("table_id", &id)?;
    Ok(Json(state.tables.set_maintenance(&id).await?))
}

async fn restore(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Table>> {
    validate_id("table_id", &id)?;
    Ok(Json(state.tables.restore(&id).await?))
}
