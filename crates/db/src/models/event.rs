use chrono::{DateTime, Utc};
use encore_types::enums::{EventGenre, ReceiptMethod, TicketGrade};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub genre: Option<EventGenre>,
    pub sub_genre: Option<String>,
    pub is_hot: bool,
    pub queue_enabled: bool,
    pub venue_id: i64,
    pub ticket_receipt_method: Option<ReceiptMethod>,
    pub poster_image: Option<String>,
    pub sales_open_at: Option<DateTime<Utc>>,
    pub sales_end_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Event {
    /// Whether admission to this event's seats goes through the queue.
    pub fn queue_gated(&self) -> bool {
        self.is_hot || self.queue_enabled
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EventSchedule {
    pub id: i64,
    pub event_id: i64,
    pub start_at: DateTime<Utc>,
    pub end_at: Option<DateTime<Utc>>,
    pub running_minutes: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Grade and price for one row of seats. `schedule_id = NULL` means the
/// entry applies to every schedule of the event.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EventSeatGrade {
    pub id: i64,
    pub event_id: i64,
    pub schedule_id: Option<i64>,
    pub row_label: String,
    pub grade: TicketGrade,
    pub price: f64,
    pub created_at: DateTime<Utc>,
}
