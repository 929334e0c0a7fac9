use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::enums::{BookingStatus, TicketGrade};

/// One entry of the projected seat map.
///
/// `id` is `None` for seats that exist only in the grade catalog and have
/// not been materialized as ticket rows yet.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TicketView {
    pub id: Option<i64>,
    pub event_id: i64,
    pub seat_section: Option<String>,
    pub seat_row: Option<String>,
    pub seat_number: Option<i32>,
    pub grade: TicketGrade,
    pub price: f64,
    pub available: bool,
}

/// A seat addressed by its row label and number within the row.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct SeatRef {
    pub row: String,
    pub number: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SeatLockRequest {
    pub event_id: i64,
    pub schedule_id: Option<i64>,
    #[validate(length(min = 1))]
    pub seats: Vec<SeatRef>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LockedSeat {
    pub row: String,
    pub number: i32,
    pub ticket_id: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SeatLockResponse {
    pub success: bool,
    pub message: String,
    pub locked_seats: Vec<LockedSeat>,
}

/// Seat chosen on a booking request. `grade` stays a string here so an
/// unknown value is rejected with a readable 400 during commit validation.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct SeatSelection {
    pub row: String,
    pub number: i32,
    pub grade: String,
    pub price: f64,
    pub seat_section: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBookingRequest {
    pub event_id: i64,
    pub schedule_id: Option<i64>,
    #[validate(length(min = 1))]
    pub seats: Vec<SeatSelection>,
    #[validate(range(min = 0.0))]
    pub total_price: f64,
    /// "delivery" or "on_site"; checked against the valid values at the
    /// API boundary
    pub receipt_method: String,
    #[schema(value_type = Object)]
    pub delivery_info: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookingResponse {
    pub id: i64,
    pub user_id: i64,
    pub ticket_id: i64,
    pub status: BookingStatus,
    pub total_price: f64,
    pub booked_at: DateTime<Utc>,
}

/// Row of the user's booking history, grouped into reservations by
/// same-second booking batches.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserBookingItem {
    pub id: i64,
    pub booking_id: i64,
    pub event_id: i64,
    pub event_title: String,
    pub event_poster_image: Option<String>,
    pub venue_name: Option<String>,
    pub schedule_date: Option<String>,
    pub schedule_time: Option<String>,
    pub seat_row: Option<String>,
    pub seat_number: Option<i32>,
    pub grade: TicketGrade,
    pub price: f64,
    pub status: BookingStatus,
    pub booked_at: DateTime<Utc>,
    pub reservation_number: String,
    pub quantity: i32,
}
