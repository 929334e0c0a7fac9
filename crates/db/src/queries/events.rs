use crate::models::{Event, EventSchedule, EventSeatGrade, Venue};
use anyhow::Result;
use sqlx::PgPool;

/// Get event by ID
pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Event>> {
    let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(event)
}

/// List events for the public catalog, newest first
pub async fn list(pool: &PgPool, skip: i64, limit: i64) -> Result<Vec<Event>> {
    let events = sqlx::query_as::<_, Event>(
        r#"
        SELECT * FROM events
        ORDER BY created_at DESC, id DESC
        OFFSET $1 LIMIT $2
        "#,
    )
    .bind(skip)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(events)
}

/// Get venue by ID
pub async fn find_venue(pool: &PgPool, id: i64) -> Result<Option<Venue>> {
    let venue = sqlx::query_as::<_, Venue>("SELECT * FROM venues WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(venue)
}

/// Get a schedule, checking that it belongs to the given event
pub async fn find_schedule(
    pool: &PgPool,
    schedule_id: i64,
    event_id: i64,
) -> Result<Option<EventSchedule>> {
    let schedule = sqlx::query_as::<_, EventSchedule>(
        "SELECT * FROM event_schedules WHERE id = $1 AND event_id = $2",
    )
    .bind(schedule_id)
    .bind(event_id)
    .fetch_optional(pool)
    .await?;

    Ok(schedule)
}

/// Seat grades applying to an event, optionally narrowed to one schedule.
/// Unscoped entries (schedule_id NULL) apply to every schedule and are
/// always included.
pub async fn list_seat_grades(
    pool: &PgPool,
    event_id: i64,
    schedule_id: Option<i64>,
) -> Result<Vec<EventSeatGrade>> {
    let grades = match schedule_id {
        Some(sid) => {
            sqlx::query_as::<_, EventSeatGrade>(
                r#"
                SELECT * FROM event_seat_grades
                WHERE event_id = $1 AND (schedule_id = $2 OR schedule_id IS NULL)
                ORDER BY row_label ASC
                "#,
            )
            .bind(event_id)
            .bind(sid)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, EventSeatGrade>(
                r#"
                SELECT * FROM event_seat_grades
                WHERE event_id = $1
                ORDER BY row_label ASC
                "#,
            )
            .bind(event_id)
            .fetch_all(pool)
            .await?
        }
    };

    Ok(grades)
}
