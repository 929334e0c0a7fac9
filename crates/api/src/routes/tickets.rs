use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use encore_core::reservation;
use encore_db::models::Event;
use encore_db::queries::{bookings, events};
use encore_types::api::{
    BookingResponse, CreateBookingRequest, SeatLockRequest, SeatLockResponse, TicketView,
    UserBookingItem,
};
use encore_types::{validate_grade, validate_receipt_method, AppError};
use serde::Deserialize;
use validator::Validate;

use crate::middleware::{AppState, AuthUser};
use crate::response::{db_error, ApiError, ApiResult};

const QUEUE_TOKEN_HEADER: &str = "X-Queue-Token";

#[derive(Deserialize)]
pub struct TicketsQuery {
    pub schedule_id: Option<i64>,
}

/// Projected seat map for an event, token-gated when the event is hot.
pub async fn get_event_tickets(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
    Query(query): Query<TicketsQuery>,
    AuthUser(user): AuthUser,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<TicketView>>> {
    let event = find_event(&state, event_id).await?;
    require_queue_token(&state, &event, user.id, &headers).await?;

    let views =
        reservation::list_event_tickets(&state.db, &state.cache, &event, query.schedule_id).await?;

    Ok(Json(views))
}

/// Hold seats ahead of the booking form. Optional; the commit re-checks.
pub async fn lock_seats(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    headers: HeaderMap,
    Json(payload): Json<SeatLockRequest>,
) -> ApiResult<Json<SeatLockResponse>> {
    payload
        .validate()
        .map_err(|e| ApiError(AppError::Validation(e.to_string())))?;

    let event = find_event(&state, payload.event_id).await?;
    require_queue_token(&state, &event, user.id, &headers).await?;

    let response = reservation::lock_seats(&state.db, &state.locks, &payload, user.id).await?;

    Ok(Json(response))
}

/// Atomic multi-seat booking commit.
pub async fn create_bookings(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    headers: HeaderMap,
    Json(payload): Json<CreateBookingRequest>,
) -> ApiResult<Json<Vec<BookingResponse>>> {
    payload
        .validate()
        .map_err(|e| ApiError(AppError::Validation(e.to_string())))?;
    validate_receipt_method(&payload.receipt_method)
        .map_err(|e| ApiError(AppError::Validation(e)))?;
    for seat in &payload.seats {
        validate_grade(&seat.grade).map_err(|e| ApiError(AppError::Validation(e)))?;
    }

    let event = find_event(&state, payload.event_id).await?;
    require_queue_token(&state, &event, user.id, &headers).await?;

    let created = reservation::create_bookings(
        &state.db,
        &state.locks,
        &state.cache,
        &payload,
        user.id,
    )
    .await?;

    Ok(Json(created.into_iter().map(Into::into).collect()))
}

/// The current user's bookings, grouped into reservations.
pub async fn my_bookings(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<Vec<UserBookingItem>>> {
    let rows = bookings::list_user_bookings_detailed(&state.db, user.id)
        .await
        .map_err(db_error)?;

    Ok(Json(reservation::group_user_bookings(&rows)))
}

async fn find_event(state: &AppState, event_id: i64) -> Result<Event, ApiError> {
    let event = events::find_by_id(&state.db, event_id)
        .await
        .map_err(db_error)?
        .ok_or_else(|| AppError::NotFound("Event".to_string()))?;

    Ok(event)
}

async fn require_queue_token(
    state: &AppState,
    event: &Event,
    user_id: i64,
    headers: &HeaderMap,
) -> Result<(), ApiError> {
    if !event.queue_gated() {
        return Ok(());
    }

    let token = headers
        .get(QUEUE_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or(ApiError(AppError::QueueTokenMissing))?;

    if !state.queue.validate_token(event.id, user_id, token).await {
        return Err(ApiError(AppError::QueueTokenInvalid));
    }

    Ok(())
}
