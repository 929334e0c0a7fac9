use axum::extract::{Query, State};
use axum::Json;
use encore_db::queries::events;
use encore_types::api::EventSummary;
use serde::Deserialize;

use crate::middleware::AppState;
use crate::response::{db_error, ApiResult};

#[derive(Deserialize)]
pub struct EventListQuery {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    20
}

/// Public event catalog. Sits behind the rate limiter and a short page
/// cache; this is the read path that feeds the booking funnel.
pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<EventListQuery>,
) -> ApiResult<Json<Vec<EventSummary>>> {
    let skip = query.skip.max(0);
    let limit = query.limit.clamp(1, 100);

    if let Some(cached) = state.cache.event_list(skip, limit).await {
        if let Ok(events) = serde_json::from_value::<Vec<EventSummary>>(cached) {
            return Ok(Json(events));
        }
    }

    let events = events::list(&state.db, skip, limit)
        .await
        .map_err(db_error)?;
    let summaries: Vec<EventSummary> = events.into_iter().map(Into::into).collect();

    if let Ok(payload) = serde_json::to_value(&summaries) {
        state.cache.put_event_list(skip, limit, &payload).await;
    }

    Ok(Json(summaries))
}
