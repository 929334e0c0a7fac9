//! Grouped booking history.
//!
//! A multi-seat commit inserts its bookings in one transaction, so they
//! share a timestamp. Rows booked in the same second for the same event
//! form one reservation, numbered `M{first booking id:09}`.

use std::collections::HashMap;

use encore_db::models::UserBookingRow;
use encore_types::api::UserBookingItem;

pub fn group_user_bookings(rows: &[UserBookingRow]) -> Vec<UserBookingItem> {
    let mut reservation_numbers: HashMap<(i64, i64), String> = HashMap::new();
    let mut items = Vec::with_capacity(rows.len());

    for row in rows {
        let group = (row.event_id, row.booked_at.timestamp());
        let reservation_number = reservation_numbers
            .entry(group)
            .or_insert_with(|| format!("M{:09}", row.booking_id))
            .clone();

        items.push(UserBookingItem {
            id: row.ticket_id,
            booking_id: row.booking_id,
            event_id: row.event_id,
            event_title: row.event_title.clone(),
            event_poster_image: row.poster_image.clone(),
            venue_name: row.venue_name.clone().or_else(|| row.event_location.clone()),
            schedule_date: row
                .schedule_start
                .map(|start| start.format("%Y.%m.%d").to_string()),
            schedule_time: row
                .schedule_start
                .map(|start| start.format("%H:%M").to_string()),
            seat_row: row.seat_row.clone(),
            seat_number: row.seat_number,
            grade: row.grade,
            price: row.total_price,
            status: row.status,
            booked_at: row.booked_at,
            reservation_number,
            quantity: 1,
        });
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use encore_types::enums::{BookingStatus, TicketGrade};

    fn row(booking_id: i64, event_id: i64, epoch: i64) -> UserBookingRow {
        UserBookingRow {
            booking_id,
            ticket_id: booking_id + 100,
            event_id,
            event_title: "옥탑방 고양이".to_string(),
            poster_image: None,
            event_location: Some("대학로".to_string()),
            venue_name: None,
            schedule_start: Utc.timestamp_opt(1_767_225_600, 0).single(),
            seat_row: Some("1열".to_string()),
            seat_number: Some(5),
            grade: TicketGrade::VIP,
            status: BookingStatus::Pending,
            total_price: 100_000.0,
            booked_at: Utc.timestamp_opt(epoch, 0).unwrap(),
        }
    }

    #[test]
    fn test_same_second_bookings_share_reservation() {
        let rows = vec![row(12, 3, 1_700_000_000), row(13, 3, 1_700_000_000)];
        let items = group_user_bookings(&rows);

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].reservation_number, "M000000012");
        assert_eq!(items[1].reservation_number, "M000000012");
    }

    #[test]
    fn test_distinct_batches_get_distinct_numbers() {
        let rows = vec![row(12, 3, 1_700_000_000), row(14, 3, 1_700_000_030)];
        let items = group_user_bookings(&rows);

        assert_eq!(items[0].reservation_number, "M000000012");
        assert_eq!(items[1].reservation_number, "M000000014");
    }

    #[test]
    fn test_same_second_different_events_split() {
        let rows = vec![row(12, 3, 1_700_000_000), row(13, 4, 1_700_000_000)];
        let items = group_user_bookings(&rows);

        assert_ne!(items[0].reservation_number, items[1].reservation_number);
    }

    #[test]
    fn test_display_fields() {
        let items = group_user_bookings(&[row(12, 3, 1_700_000_000)]);
        let item = &items[0];

        assert_eq!(item.id, 112);
        assert_eq!(item.venue_name.as_deref(), Some("대학로"));
        assert_eq!(item.schedule_date.as_deref(), Some("2026.01.01"));
        assert_eq!(item.schedule_time.as_deref(), Some("00:00"));
        assert_eq!(item.quantity, 1);
    }
}
