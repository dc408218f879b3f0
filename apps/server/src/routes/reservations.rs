//! Reservation routes.

use axum::body::Bytes;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::NaiveDate;
use mesa_core::reservation::{
    AvailabilityQuery, CancelRequest, ReservationAction, ReservationRequest, ReservationUpdate,
};
use mesa_core::{Reservation, ReservationStatus, Table};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/reservations",
            get(list_reservations).post(create_reservation),
        )
        .route("/reservations/check-availability", post(check_availability))
        .route(
            "/reservations/{id}",
            get(get_reservation).put(update_reservation),
        )
        .route("/reservations/{id}/{action}", put(apply_action))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub date: Option<NaiveDate>,
    pub status: Option<ReservationStatus>,
}

async fn create_reservation(
    State(state): State<AppState>,
    body: Result<Json<ReservationRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Reservation>)> {
    let Json(request) = body?;
    let reservation = state.reservations.create(request).await?;
    Ok((StatusCode::CREATED, Json(reservation)))
}

async fn list_reservations(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Reservation>>> {
    let Query(query) = query?;
    Ok(Json(
        state.reservations.list(query.date, query.status).await?,
    ))
}

/// POST /reservations/check-availability - tables free for the slot
async fn check_availability(
    State(state): State<AppState>,
    body: Result<Json<AvailabilityQuery>, JsonRejection>,
) -> ApiResult<Json<Vec<Table>>> {
    let Json(query) = body?;
    Ok(Json(state.reservations.check_availability(query).await?))
}

async fn get_reservation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Reservation>> {
    Ok(Json(state.reservations.get(&id).await?))
}

async fn update_reservation(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<ReservationUpdate>, JsonRejection>,
) -> ApiResult<Json<Reservation>> {
    let Json(update) = body?;
    Ok(Json(state.reservations.update(&id, update).await?))
}

/// PUT /reservations/{id}/{confirm|complete|cancel}
///
/// Only `cancel` reads the body, and an empty body is accepted so that a
/// missing reason surfaces as the engine's validation error.
async fn apply_action(
    State(state): State<AppState>,
    Path((id, action)): Path<(String, String)>,
    body: Bytes,
) -> ApiResult<Json<Reservation>> {
    let action: ReservationAction = action.parse()?;

    let reservation = match action {
        ReservationAction::Confirm => state.reservations.confirm(&id).await?,
        ReservationAction::Complete => state.reservations.complete(&id).await?,
        ReservationAction::Cancel => {
            let request = parse_cancel(&body)?;
            state
                .reservations
                .cancel(&id, request.reason.as_deref())
                .await?
        }
    };

    Ok(Json(reservation))
}

fn parse_cancel(body: &[u8]) -> ApiResult<CancelRequest> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(CancelRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| ApiError::bad_request(format!("Invalid cancel body: {e}")))
}
