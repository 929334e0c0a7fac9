use serde::Serialize;
use utoipa::ToSchema;

/// Shared response shape of `POST /queue/enter/{event_id}` and
/// `GET /queue/status/{event_id}`.
///
/// `position` is 1-based while waiting, 0 when a token was just issued and
/// absent when the caller never entered the queue.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct QueueStatusResponse {
    pub in_queue: bool,
    pub queue_token: Option<String>,
    pub position: Option<i64>,
    pub total: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_wait_time: Option<i64>,
    pub batch_size: i64,
    pub batch_interval: i64,
}
