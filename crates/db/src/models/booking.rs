use chrono::{DateTime, Utc};
use encore_types::enums::{BookingStatus, TicketGrade};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Booking {
    pub id: i64,
    pub user_id: i64,
    pub ticket_id: i64,
    pub schedule_id: Option<i64>,
    pub status: BookingStatus,
    pub total_price: f64,
    pub payment_method: Option<String>,
    pub transaction_id: Option<String>,
    pub booked_at: DateTime<Utc>,
}

/// Joined row backing the booking-history endpoint: booking plus its
/// ticket, event, venue name and the event's first schedule.
#[derive(Debug, Clone, FromRow)]
pub struct UserBookingRow {
    pub booking_id: i64,
    pub ticket_id: i64,
    pub event_id: i64,
    pub event_title: String,
    pub poster_image: Option<String>,
    pub event_location: Option<String>,
    pub venue_name: Option<String>,
    pub schedule_start: Option<DateTime<Utc>>,
    pub seat_row: Option<String>,
    pub seat_number: Option<i32>,
    pub grade: TicketGrade,
    pub status: BookingStatus,
    pub total_price: f64,
    pub booked_at: DateTime<Utc>,
}
