use encore_types::enums::TicketGrade;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A concrete seat instance. Rows are materialized lazily on the first
/// booking attempt, so the table may be empty for an event that still
/// sells seats through its grade catalog.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Ticket {
    pub id: i64,
    pub event_id: i64,
    pub schedule_id: Option<i64>,
    pub seat_section: Option<String>,
    pub seat_row: Option<String>,
    pub seat_number: Option<i32>,
    pub grade: TicketGrade,
    pub price: f64,
}
