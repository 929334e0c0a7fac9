use axum::extract::{Path, State};
use axum::Json;
use encore_core::{QueueConfig, QueueOutcome};
use encore_db::queries::events;
use encore_types::api::QueueStatusResponse;
use encore_types::AppError;

use crate::middleware::{AppState, AuthUser};
use crate::response::{db_error, ApiResult};

/// Join the admission queue for an event.
///
/// Events that are not queue-gated hand out a token immediately; everyone
/// else is placed in the waiter set and told where they stand.
pub async fn enter_queue(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<QueueStatusResponse>> {
    let event = events::find_by_id(&state.db, event_id)
        .await
        .map_err(db_error)?
        .ok_or_else(|| AppError::NotFound("Event".to_string()))?;

    if !event.queue_gated() {
        let queue_token = state.queue.mint_token(event.id, user.id).await?;
        return Ok(Json(QueueStatusResponse {
            in_queue: false,
            queue_token: Some(queue_token),
            position: Some(0),
            total: 0,
            estimated_wait_time: None,
            batch_size: state.queue.cfg.batch_size,
            batch_interval: state.queue.cfg.batch_interval,
        }));
    }

    let outcome = state.queue.enter(event.id, user.id).await?;

    Ok(Json(outcome_response(outcome, &state.queue.cfg)))
}

/// Poll queue state without (re)joining.
pub async fn queue_status(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<QueueStatusResponse>> {
    let outcome = state.queue.status(event_id, user.id).await?;

    Ok(Json(outcome_response(outcome, &state.queue.cfg)))
}

fn outcome_response(outcome: QueueOutcome, cfg: &QueueConfig) -> QueueStatusResponse {
    match outcome {
        QueueOutcome::Released { queue_token, total } => QueueStatusResponse {
            in_queue: false,
            queue_token: Some(queue_token),
            position: Some(0),
            total,
            estimated_wait_time: None,
            batch_size: cfg.batch_size,
            batch_interval: cfg.batch_interval,
        },
        QueueOutcome::Waiting {
            position,
            total,
            estimated_wait_time,
        } => QueueStatusResponse {
            in_queue: true,
            queue_token: None,
            position: Some(position),
            total,
            estimated_wait_time: Some(estimated_wait_time),
            batch_size: cfg.batch_size,
            batch_interval: cfg.batch_interval,
        },
        QueueOutcome::NotInQueue { total } => QueueStatusResponse {
            in_queue: false,
            queue_token: None,
            position: None,
            total,
            estimated_wait_time: None,
            batch_size: cfg.batch_size,
            batch_interval: cfg.batch_interval,
        },
    }
}
