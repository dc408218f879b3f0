use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use mesa_core::{MenuItem, NewMenuItem};
use serde::Deserialize;

use crate::error::ApiResult;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/menu-items", get(list_items).post(create_item))
        .route("/menu-items/{id}/availability", put(set_availability))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityRequest {
    pub available: bool,
}

async fn list_items(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<MenuItem>>> {
    let Query(query) = query?;
    Ok(Json(state.menu.list(query.category.as_deref()).await?))
}

async fn create_item(
    State(state): State<AppState>,
    body: Result<Json<NewMenuItem>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<MenuItem>)> {
    let Json(input) = body?;
    let item = state.menu.create(input).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Kitchen toggles an item when it sells out or comes back.
async fn set_availability(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<AvailabilityRequest>, JsonRejection>,
) -> ApiResult<Json<MenuItem>> {
    let Json(request) = body?;
    Ok(Json(state.menu.set_available(&id, request.available).await?))
}
