//! Seat-map projection.
//!
//! The ticket table is lazily materialized, so the displayed map is the
//! grade catalog expanded to `seats_per_row` entries per row, overlaid
//! with whatever real tickets (and their bookings) exist. Virtual seats
//! carry `id = None` and become real rows on first booking.

use std::collections::{BTreeSet, HashMap, HashSet};

use encore_db::models::{Event, EventSeatGrade, Ticket};
use encore_db::queries::{bookings, events, tickets};
use encore_kv::ReadCache;
use encore_types::api::TicketView;
use encore_types::enums::TicketGrade;
use encore_types::{AppError, Result};
use serde_json::Value;
use sqlx::PgPool;

use crate::db_err;

const DEFAULT_SEATS_PER_ROW: i32 = 20;
const DEFAULT_SECTION: &str = "9구역";

/// Project the seat map for an event, read-through cached per schedule.
/// The caller has already resolved the event and enforced the token gate.
pub async fn list_event_tickets(
    pool: &PgPool,
    cache: &ReadCache,
    event: &Event,
    schedule_id: Option<i64>,
) -> Result<Vec<TicketView>> {
    if let Some(sid) = schedule_id {
        events::find_schedule(pool, sid, event.id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| AppError::NotFound("Schedule".to_string()))?;
    }

    if let Some(cached) = cache.event_seats(event.id, schedule_id).await {
        if let Ok(views) = serde_json::from_value::<Vec<TicketView>>(cached) {
            return Ok(views);
        }
    }

    let venue = events::find_venue(pool, event.venue_id)
        .await
        .map_err(db_err)?;
    let event_tickets = tickets::list_for_event(pool, event.id, schedule_id)
        .await
        .map_err(db_err)?;
    let grades = events::list_seat_grades(pool, event.id, schedule_id)
        .await
        .map_err(db_err)?;

    let ticket_ids: Vec<i64> = event_tickets.iter().map(|t| t.id).collect();
    let booked: HashSet<i64> = bookings::booked_ticket_ids(pool, &ticket_ids, schedule_id)
        .await
        .map_err(db_err)?
        .into_iter()
        .collect();

    let views = project_seat_map(
        event.id,
        venue.as_ref().map(|v| &v.seat_map),
        &event_tickets,
        &grades,
        &booked,
    );

    if let Ok(payload) = serde_json::to_value(&views) {
        cache.put_event_seats(event.id, schedule_id, &payload).await;
    }

    Ok(views)
}

/// Pure projection of catalog rows, real tickets and live bookings into
/// the displayed seat list.
pub fn project_seat_map(
    event_id: i64,
    venue_seat_map: Option<&Value>,
    tickets: &[Ticket],
    grades: &[EventSeatGrade],
    booked: &HashSet<i64>,
) -> Vec<TicketView> {
    let (mut section, seats_per_row) = venue_defaults(venue_seat_map);

    if section.is_none() {
        section = tickets.iter().find_map(|t| t.seat_section.clone());
    }
    let section = section.unwrap_or_else(|| DEFAULT_SECTION.to_string());

    if tickets.is_empty() {
        if grades.is_empty() {
            return Vec::new();
        }

        let mut views = Vec::new();
        for grade in grades {
            let row = format!("{}열", grade.row_label);
            for number in 1..=seats_per_row {
                views.push(TicketView {
                    id: None,
                    event_id,
                    seat_section: Some(section.clone()),
                    seat_row: Some(row.clone()),
                    seat_number: Some(number),
                    grade: grade.grade,
                    price: grade.price,
                    available: true,
                });
            }
        }
        return views;
    }

    struct RowInfo {
        grade: TicketGrade,
        price: f64,
        section: Option<String>,
    }

    let mut ticket_by_seat: HashMap<(&str, i32), &Ticket> = HashMap::new();
    let mut row_info: HashMap<&str, RowInfo> = HashMap::new();
    for ticket in tickets {
        if let (Some(row), Some(number)) = (ticket.seat_row.as_deref(), ticket.seat_number) {
            ticket_by_seat.insert((row, number), ticket);
            row_info.entry(row).or_insert_with(|| RowInfo {
                grade: ticket.grade,
                price: ticket.price,
                section: ticket.seat_section.clone(),
            });
        }
    }

    let mut grade_rows: HashMap<String, &EventSeatGrade> = HashMap::new();
    for grade in grades {
        grade_rows.entry(format!("{}열", grade.row_label)).or_insert(grade);
    }

    let mut all_rows: BTreeSet<String> = grade_rows.keys().cloned().collect();
    all_rows.extend(row_info.keys().map(|row| row.to_string()));

    let mut views = Vec::new();
    for row in &all_rows {
        let (row_grade, row_price, row_section) = match row_info.get(row.as_str()) {
            Some(info) => (
                info.grade,
                info.price,
                info.section.clone().unwrap_or_else(|| section.clone()),
            ),
            None => match grade_rows.get(row) {
                Some(grade) => (grade.grade, grade.price, section.clone()),
                None => (TicketGrade::A, 0.0, section.clone()),
            },
        };

        for number in 1..=seats_per_row {
            match ticket_by_seat.get(&(row.as_str(), number)) {
                Some(ticket) => views.push(TicketView {
                    id: Some(ticket.id),
                    event_id,
                    seat_section: ticket
                        .seat_section
                        .clone()
                        .or_else(|| Some(row_section.clone())),
                    seat_row: ticket.seat_row.clone(),
                    seat_number: ticket.seat_number,
                    grade: ticket.grade,
                    price: ticket.price,
                    available: !booked.contains(&ticket.id),
                }),
                None => views.push(TicketView {
                    id: None,
                    event_id,
                    seat_section: Some(row_section.clone()),
                    seat_row: Some(row.clone()),
                    seat_number: Some(number),
                    grade: row_grade,
                    price: row_price,
                    available: true,
                }),
            }
        }
    }

    views
}

fn venue_defaults(seat_map: Option<&Value>) -> (Option<String>, i32) {
    let mut section = None;
    let mut seats_per_row = DEFAULT_SEATS_PER_ROW;

    if let Some(map) = seat_map.and_then(Value::as_object) {
        section = map
            .get("sections")
            .and_then(Value::as_array)
            .and_then(|sections| sections.first())
            .and_then(Value::as_str)
            .or_else(|| map.get("default_section").and_then(Value::as_str))
            .or_else(|| map.get("section").and_then(Value::as_str))
            .map(str::to_string);

        if let Some(n) = map.get("seats_per_row").and_then(Value::as_i64) {
            seats_per_row = n as i32;
        }
    }

    (section, seats_per_row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn grade(row_label: &str, grade: TicketGrade, price: f64) -> EventSeatGrade {
        EventSeatGrade {
            id: 1,
            event_id: 3,
            schedule_id: None,
            row_label: row_label.to_string(),
            grade,
            price,
            created_at: Utc::now(),
        }
    }

    fn ticket(id: i64, row: &str, number: i32, grade: TicketGrade, price: f64) -> Ticket {
        Ticket {
            id,
            event_id: 3,
            schedule_id: None,
            seat_section: None,
            seat_row: Some(row.to_string()),
            seat_number: Some(number),
            grade,
            price,
        }
    }

    #[test]
    fn test_empty_catalog_yields_empty_map() {
        let views = project_seat_map(3, None, &[], &[], &HashSet::new());
        assert!(views.is_empty());
    }

    #[test]
    fn test_grades_only_expands_rows() {
        let grades = vec![
            grade("1", TicketGrade::VIP, 100_000.0),
            grade("2", TicketGrade::R, 80_000.0),
        ];
        let views = project_seat_map(3, None, &[], &grades, &HashSet::new());

        assert_eq!(views.len(), 40);
        assert!(views.iter().all(|v| v.id.is_none() && v.available));
        assert_eq!(views[0].seat_row.as_deref(), Some("1열"));
        assert_eq!(views[0].seat_section.as_deref(), Some("9구역"));
        assert_eq!(views[0].grade, TicketGrade::VIP);
        assert_eq!(views[39].seat_row.as_deref(), Some("2열"));
        assert_eq!(views[39].price, 80_000.0);
    }

    #[test]
    fn test_venue_seat_map_overrides_defaults() {
        let seat_map = json!({"default_section": "A구역", "seats_per_row": 3});
        let grades = vec![grade("1", TicketGrade::S, 50_000.0)];
        let views = project_seat_map(3, Some(&seat_map), &[], &grades, &HashSet::new());

        assert_eq!(views.len(), 3);
        assert!(views
            .iter()
            .all(|v| v.seat_section.as_deref() == Some("A구역")));
    }

    #[test]
    fn test_sections_list_takes_first_entry() {
        let seat_map = json!({"sections": ["B구역", "C구역"], "seats_per_row": 2});
        let grades = vec![grade("1", TicketGrade::A, 10_000.0)];
        let views = project_seat_map(3, Some(&seat_map), &[], &grades, &HashSet::new());

        assert_eq!(views[0].seat_section.as_deref(), Some("B구역"));
    }

    #[test]
    fn test_real_tickets_overlay_grade_grid() {
        let seat_map = json!({"seats_per_row": 4});
        let grades = vec![grade("1", TicketGrade::VIP, 100_000.0)];
        let tickets = vec![ticket(11, "1열", 2, TicketGrade::VIP, 100_000.0)];
        let booked: HashSet<i64> = [11].into_iter().collect();

        let views = project_seat_map(3, Some(&seat_map), &tickets, &grades, &booked);

        assert_eq!(views.len(), 4);
        let sold = views.iter().find(|v| v.seat_number == Some(2)).unwrap();
        assert_eq!(sold.id, Some(11));
        assert!(!sold.available);
        let open: Vec<_> = views.iter().filter(|v| v.available).collect();
        assert_eq!(open.len(), 3);
        assert!(open.iter().all(|v| v.id.is_none()));
    }

    #[test]
    fn test_ticket_rows_outside_catalog_are_kept() {
        let seat_map = json!({"seats_per_row": 2});
        let tickets = vec![ticket(21, "7열", 1, TicketGrade::S, 60_000.0)];

        let views = project_seat_map(3, Some(&seat_map), &tickets, &[], &HashSet::new());

        assert_eq!(views.len(), 2);
        assert_eq!(views[0].id, Some(21));
        assert_eq!(views[0].grade, TicketGrade::S);
        // the virtual neighbor inherits the row's grade and price
        assert_eq!(views[1].id, None);
        assert_eq!(views[1].grade, TicketGrade::S);
        assert_eq!(views[1].price, 60_000.0);
    }

    #[test]
    fn test_section_falls_back_to_ticket_section() {
        let mut first = ticket(31, "1열", 1, TicketGrade::A, 10_000.0);
        first.seat_section = Some("지정석".to_string());
        let views = project_seat_map(3, None, &[first], &[], &HashSet::new());

        assert!(views
            .iter()
            .all(|v| v.seat_section.as_deref() == Some("지정석")));
    }
}
