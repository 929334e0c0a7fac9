//! Atomic multi-seat booking commit.
//!
//! Phase one takes the distributed seat locks in request order and rejects
//! on any foreign holder without touching Postgres. Phase two re-checks
//! everything under row-level `FOR UPDATE` locks inside one transaction;
//! a lock lost to TTL expiry or a store restart is therefore harmless.

use std::str::FromStr;

use encore_db::models::Booking;
use encore_db::queries::{bookings, events, tickets};
use encore_kv::{ReadCache, SeatLocks};
use encore_types::api::{CreateBookingRequest, SeatSelection};
use encore_types::enums::TicketGrade;
use encore_types::{AppError, Result};
use sqlx::PgPool;

use super::{release_all, resolve_ticket_id, seat_key};
use crate::db_err;

/// Book every seat in the request for `user_id`, all-or-nothing.
///
/// The caller has already resolved the event and enforced the queue-token
/// gate. Locks acquired here are released on every exit path; DB side
/// effects roll back before an error is returned.
pub async fn create_bookings(
    pool: &PgPool,
    locks: &SeatLocks,
    cache: &ReadCache,
    request: &CreateBookingRequest,
    user_id: i64,
) -> Result<Vec<Booking>> {
    if let Some(schedule_id) = request.schedule_id {
        events::find_schedule(pool, schedule_id, request.event_id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| AppError::NotFound("Schedule".to_string()))?;
    }

    let locked = fast_lock_phase(pool, locks, cache, request, user_id).await?;

    let result = commit_phase(pool, request, user_id).await;

    if result.is_ok() {
        cache
            .invalidate_seat_maps(request.event_id, request.schedule_id)
            .await;
        for seat in &request.seats {
            cache
                .put_seat_status(
                    request.event_id,
                    request.schedule_id,
                    &seat_key(&seat.row, seat.number),
                    false,
                )
                .await;
        }
    }

    release_all(locks, &locked).await;

    result
}

async fn fast_lock_phase(
    pool: &PgPool,
    locks: &SeatLocks,
    cache: &ReadCache,
    request: &CreateBookingRequest,
    user_id: i64,
) -> Result<Vec<i64>> {
    let mut locked: Vec<i64> = Vec::new();

    for seat in &request.seats {
        match lock_one(pool, locks, cache, request, user_id, seat).await {
            Ok(ticket_id) => locked.push(ticket_id),
            Err(e) => {
                release_all(locks, &locked).await;
                return Err(e);
            }
        }
    }

    Ok(locked)
}

async fn lock_one(
    pool: &PgPool,
    locks: &SeatLocks,
    cache: &ReadCache,
    request: &CreateBookingRequest,
    user_id: i64,
    seat: &SeatSelection,
) -> Result<i64> {
    let ticket_id = resolve_ticket_id(
        pool,
        request.event_id,
        request.schedule_id,
        &seat.row,
        seat.number,
    )
    .await?;

    // seats the cache already knows are sold fail before any lock churn
    if let Some(false) = cache
        .seat_status(
            request.event_id,
            request.schedule_id,
            &seat_key(&seat.row, seat.number),
        )
        .await
    {
        return Err(AppError::AlreadyBooked(format!(
            "Seat {}-{} is already booked",
            seat.row, seat.number
        )));
    }

    let acquired = match locks.owner(ticket_id).await? {
        // a lock this user took during seat selection is reused
        Some(owner) if owner == user_id => true,
        Some(_) => false,
        None => locks.try_lock(ticket_id, user_id).await?,
    };

    if !acquired {
        return Err(AppError::SeatHeldByOther(format!(
            "좌석 {}-{}번이 다른 사용자에 의해 처리 중입니다. 다시 시도하시거나 다른 좌석을 선택해주세요.",
            seat.row, seat.number
        )));
    }

    Ok(ticket_id)
}

async fn commit_phase(
    pool: &PgPool,
    request: &CreateBookingRequest,
    user_id: i64,
) -> Result<Vec<Booking>> {
    let mut tx = pool.begin().await?;
    let mut created = Vec::with_capacity(request.seats.len());

    for seat in &request.seats {
        let existing = tickets::find_by_seat_for_update(
            &mut tx,
            request.event_id,
            request.schedule_id,
            &seat.row,
            seat.number,
        )
        .await
        .map_err(db_err)?;

        let ticket = match existing {
            Some(ticket) => ticket,
            None => {
                let grade = TicketGrade::from_str(&seat.grade)
                    .map_err(|_| AppError::Validation(format!("Invalid grade: {}", seat.grade)))?;
                tickets::insert(
                    &mut tx,
                    request.event_id,
                    request.schedule_id,
                    seat.seat_section.as_deref(),
                    &seat.row,
                    seat.number,
                    grade,
                    seat.price,
                )
                .await
                .map_err(db_err)?
            }
        };

        if bookings::active_exists_for_ticket(&mut tx, ticket.id, request.schedule_id)
            .await
            .map_err(db_err)?
        {
            return Err(AppError::AlreadyBooked(format!(
                "Seat {}-{} is already booked",
                seat.row, seat.number
            )));
        }

        let booking = bookings::insert(&mut tx, user_id, ticket.id, request.schedule_id, seat.price)
            .await
            .map_err(db_err)?;
        created.push(booking);
    }

    tx.commit().await?;

    Ok(created)
}
