use crate::models::{Booking, UserBookingRow};
use anyhow::Result;
use sqlx::PgPool;

/// Whether a live (pending or confirmed) booking already claims the ticket.
/// A schedule-less booking blocks the seat for every schedule, so the
/// schedule filter also matches NULL.
pub async fn active_exists_for_ticket(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ticket_id: i64,
    schedule_id: Option<i64>,
) -> Result<bool> {
    let exists = match schedule_id {
        Some(sid) => {
            sqlx::query_scalar::<_, bool>(
                r#"
                SELECT EXISTS(
                    SELECT 1 FROM bookings
                    WHERE ticket_id = $1
                      AND status IN ('pending', 'confirmed')
                      AND (schedule_id = $2 OR schedule_id IS NULL)
                )
                "#,
            )
            .bind(ticket_id)
            .bind(sid)
            .fetch_one(&mut **tx)
            .await?
        }
        None => {
            sqlx::query_scalar::<_, bool>(
                r#"
                SELECT EXISTS(
                    SELECT 1 FROM bookings
                    WHERE ticket_id = $1
                      AND status IN ('pending', 'confirmed')
                )
                "#,
            )
            .bind(ticket_id)
            .fetch_one(&mut **tx)
            .await?
        }
    };

    Ok(exists)
}

/// Create a pending booking. Must run inside the booking transaction.
pub async fn insert(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    user_id: i64,
    ticket_id: i64,
    schedule_id: Option<i64>,
    total_price: f64,
) -> Result<Booking> {
    let booking = sqlx::query_as::<_, Booking>(
        r#"
        INSERT INTO bookings (user_id, ticket_id, schedule_id, status, total_price)
        VALUES ($1, $2, $3, 'pending', $4)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(ticket_id)
    .bind(schedule_id)
    .bind(total_price)
    .fetch_one(&mut **tx)
    .await?;

    Ok(booking)
}

/// Ticket ids among `ticket_ids` that carry a live booking
pub async fn booked_ticket_ids(
    pool: &PgPool,
    ticket_ids: &[i64],
    schedule_id: Option<i64>,
) -> Result<Vec<i64>> {
    if ticket_ids.is_empty() {
        return Ok(Vec::new());
    }

    let ids = match schedule_id {
        Some(sid) => {
            sqlx::query_scalar::<_, i64>(
                r#"
                SELECT DISTINCT ticket_id FROM bookings
                WHERE ticket_id = ANY($1)
                  AND status IN ('pending', 'confirmed')
                  AND (schedule_id = $2 OR schedule_id IS NULL)
                "#,
            )
            .bind(ticket_ids)
            .bind(sid)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_scalar::<_, i64>(
                r#"
                SELECT DISTINCT ticket_id FROM bookings
                WHERE ticket_id = ANY($1)
                  AND status IN ('pending', 'confirmed')
                "#,
            )
            .bind(ticket_ids)
            .fetch_all(pool)
            .await?
        }
    };

    Ok(ids)
}

/// User's bookings joined with ticket, event, venue and the event's first
/// schedule, newest first. Feeds the grouped booking-history view.
pub async fn list_user_bookings_detailed(
    pool: &PgPool,
    user_id: i64,
) -> Result<Vec<UserBookingRow>> {
    let rows = sqlx::query_as::<_, UserBookingRow>(
        r#"
        SELECT
            b.id AS booking_id,
            t.id AS ticket_id,
            e.id AS event_id,
            e.title AS event_title,
            e.poster_image,
            e.location AS event_location,
            v.name AS venue_name,
            s.start_at AS schedule_start,
            t.seat_row,
            t.seat_number,
            t.grade,
            b.status,
            b.total_price,
            b.booked_at
        FROM bookings b
        JOIN tickets t ON t.id = b.ticket_id
        JOIN events e ON e.id = t.event_id
        LEFT JOIN venues v ON v.id = e.venue_id
        LEFT JOIN LATERAL (
            SELECT es.start_at
            FROM event_schedules es
            WHERE es.event_id = e.id
            ORDER BY es.start_at ASC
            LIMIT 1
        ) s ON true
        WHERE b.user_id = $1
        ORDER BY b.booked_at DESC, b.id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
