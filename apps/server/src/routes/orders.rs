//! Order routes.
//!
//! `page` and `page_size` are taken as raw strings and normalised with
//! [`PageRequest::from_raw`], so junk values fall back to defaults instead of
//! rejecting the request.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::NaiveDate;
use mesa_core::order::{
    CreateOrderRequest, KitchenView, LineUpdate, NewOrderLine, OrderFilter, OrderStatusCommand,
    StatusChangeRequest,
};
use mesa_core::pagination::{Page, PageRequest};
use mesa_core::validation::validate_id;
use mesa_core::{Order, OrderDetail, OrderLine, OrderStatus};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::ApiResult;
use crate::identity::Identity;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders).post(create_order))
        .route("/orders/kitchen", get(kitchen))
        .route("/orders/{id}", get(get_order))
        .route("/orders/{id}/status", put(change_status))
        .route("/orders/{id}/items", post(add_line))
        .route(
            "/orders/{id}/items/{line_id}",
            put(update_line).delete(remove_line),
        )
}

#[derive(Debug, Default, Deserialize)]
pub struct ListOrdersQuery {
    pub status: Option<OrderStatus>,
    pub table_id: Option<String>,
    pub waiter_id: Option<String>,
    pub date: Option<NaiveDate>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

/// POST /orders - opens an order for the calling waiter
async fn create_order(
    State(state): State<AppState>,
    identity: Identity,
    body: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<OrderDetail>)> {
    let Json(request) = body?;
    let detail = state.orders.create_order(&identity.user_id, request).await?;
    info!(
        order_id = %detail.order.id,
        waiter_id = %identity.user_id,
        role = identity.role.as_deref().unwrap_or("unknown"),
        "Order opened"
    );
    Ok((StatusCode::CREATED, Json(detail)))
}

async fn list_orders(
    State(state): State<AppState>,
    query: Result<Query<ListOrdersQuery>, QueryRejection>,
) -> ApiResult<Json<Page<Order>>> {
    let Query(query) = query?;
    let orders = &state.config.orders;
    let page = PageRequest::from_raw(
        query.page.as_deref(),
        query.page_size.as_deref(),
        orders.default_page_size,
        orders.max_page_size,
    );

    if let Some(table_id) = &query.table_id {
        validate_id("table_id", table_id)?;
    }

    let filter = OrderFilter {
        status: query.status,
        table_id: query.table_id,
        waiter_id: query.waiter_id,
        date: query.date,
    };

    debug!(?filter, page = page.page(), page_size = page.page_size(), "Listing orders");
    Ok(Json(state.orders.list_orders(&filter, page).await?))
}

async fn kitchen(State(state): State<AppState>) -> ApiResult<Json<KitchenView>> {
    Ok(Json(state.orders.kitchen_view().await?))
}

async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<OrderDetail>> {
    Ok(Json(state.orders.get_order(&id).await?))
}

/// PUT /orders/{id}/status
///
/// Cancelling requires a non-empty `reason`; that is checked before the
/// order is even looked up.
async fn change_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<StatusChangeRequest>, JsonRejection>,
) -> ApiResult<Json<Order>> {
    let Json(request) = body?;
    let command = OrderStatusCommand::try_from(request)?;
    Ok(Json(state.orders.advance_status(&id, command).await?))
}

async fn add_line(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<NewOrderLine>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<OrderLine>)> {
    let Json(line) = body?;
    let line = state.orders.add_line(&id, line).await?;
    Ok((StatusCode::CREATED, Json(line)))
}

async fn update_line(
    State(state): State<AppState>,
    Path((id, line_id)): Path<(String, String)>,
    body: Result<Json<LineUpdate>, JsonRejection>,
) -> ApiResult<Json<OrderLine>> {
    let Json(update) = body?;
    Ok(Json(state.orders.update_line(&id, &line_id, update).await?))
}

async fn remove_line(
    State(state): State<AppState>,
    Path((id, line_id)): Path<(String, String)>,
) -> ApiResult<Json<OrderDetail>> {
    Ok(Json(state.orders.remove_line(&id, &line_id).await?))
}
