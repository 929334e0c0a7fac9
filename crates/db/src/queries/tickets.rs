use crate::models::Ticket;
use anyhow::Result;
use encore_types::enums::TicketGrade;
use sqlx::{PgPool, Postgres, QueryBuilder};

fn seat_filter<'a>(
    qb: &mut QueryBuilder<'a, Postgres>,
    event_id: i64,
    schedule_id: Option<i64>,
    row: &'a str,
    number: i32,
) {
    qb.push(" WHERE event_id = ");
    qb.push_bind(event_id);
    qb.push(" AND seat_row = ");
    qb.push_bind(row);
    qb.push(" AND seat_number = ");
    qb.push_bind(number);
    if let Some(sid) = schedule_id {
        qb.push(" AND schedule_id = ");
        qb.push_bind(sid);
    }
}

/// Find the ticket materialized for a seat, if any
pub async fn find_by_seat(
    pool: &PgPool,
    event_id: i64,
    schedule_id: Option<i64>,
    row: &str,
    number: i32,
) -> Result<Option<Ticket>> {
    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM tickets");
    seat_filter(&mut qb, event_id, schedule_id, row, number);

    let ticket = qb.build_query_as::<Ticket>().fetch_optional(pool).await?;

    Ok(ticket)
}

/// Find the ticket for a seat with a row-level exclusive lock.
/// Must run inside the booking transaction.
pub async fn find_by_seat_for_update(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    event_id: i64,
    schedule_id: Option<i64>,
    row: &str,
    number: i32,
) -> Result<Option<Ticket>> {
    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM tickets");
    seat_filter(&mut qb, event_id, schedule_id, row, number);
    qb.push(" FOR UPDATE");

    let ticket = qb
        .build_query_as::<Ticket>()
        .fetch_optional(&mut **tx)
        .await?;

    Ok(ticket)
}

/// List all tickets of an event, optionally narrowed to one schedule
pub async fn list_for_event(
    pool: &PgPool,
    event_id: i64,
    schedule_id: Option<i64>,
) -> Result<Vec<Ticket>> {
    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM tickets WHERE event_id = ");
    qb.push_bind(event_id);
    if let Some(sid) = schedule_id {
        qb.push(" AND schedule_id = ");
        qb.push_bind(sid);
    }

    let tickets = qb.build_query_as::<Ticket>().fetch_all(pool).await?;

    Ok(tickets)
}

/// Materialize a ticket row for a seat. Must run inside the booking
/// transaction so the new row is covered by the commit.
#[allow(clippy::too_many_arguments)]
pub async fn insert(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    event_id: i64,
    schedule_id: Option<i64>,
    seat_section: Option<&str>,
    row: &str,
    number: i32,
    grade: TicketGrade,
    price: f64,
) -> Result<Ticket> {
    let ticket = sqlx::query_as::<_, Ticket>(
        r#"
        INSERT INTO tickets (event_id, schedule_id, seat_section, seat_row, seat_number, grade, price)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(event_id)
    .bind(schedule_id)
    .bind(seat_section)
    .bind(row)
    .bind(number)
    .bind(grade)
    .bind(price)
    .fetch_one(&mut **tx)
    .await?;

    Ok(ticket)
}
