//! Pre-commit seat holds for the seat-selection UI.

use encore_kv::SeatLocks;
use encore_types::api::{LockedSeat, SeatLockRequest, SeatLockResponse};
use encore_types::Result;
use sqlx::PgPool;

use super::{release_all, resolve_ticket_id};

/// Hold every requested seat for `user_id`, all-or-nothing.
///
/// A lock already held by the same user counts as acquired, so a retried
/// request does not deadlock against itself. Conflicts are a soft failure
/// (`success = false`), not an error: the UI treats them as "pick another
/// seat". The final commit re-checks everything, so holding is optional.
pub async fn lock_seats(
    pool: &PgPool,
    locks: &SeatLocks,
    request: &SeatLockRequest,
    user_id: i64,
) -> Result<SeatLockResponse> {
    let mut locked: Vec<LockedSeat> = Vec::new();

    for seat in &request.seats {
        let ticket_id = match resolve_ticket_id(
            pool,
            request.event_id,
            request.schedule_id,
            &seat.row,
            seat.number,
        )
        .await
        {
            Ok(ticket_id) => ticket_id,
            Err(e) => {
                release_ids(locks, &locked).await;
                return Err(e);
            }
        };

        let mut acquired = match locks.try_lock(ticket_id, user_id).await {
            Ok(acquired) => acquired,
            Err(e) => {
                release_ids(locks, &locked).await;
                return Err(e);
            }
        };

        if !acquired {
            // re-entry by the user who already holds this seat
            match locks.owner(ticket_id).await {
                Ok(Some(owner)) if owner == user_id => acquired = true,
                Ok(_) => {}
                Err(e) => {
                    release_ids(locks, &locked).await;
                    return Err(e);
                }
            }
        }

        if !acquired {
            release_ids(locks, &locked).await;
            return Ok(SeatLockResponse {
                success: false,
                message: format!(
                    "좌석 {}-{}번이 다른 사용자에 의해 처리 중입니다.",
                    seat.row, seat.number
                ),
                locked_seats: Vec::new(),
            });
        }

        locked.push(LockedSeat {
            row: seat.row.clone(),
            number: seat.number,
            ticket_id,
        });
    }

    Ok(SeatLockResponse {
        success: true,
        message: format!("{}개의 좌석이 잠금되었습니다.", locked.len()),
        locked_seats: locked,
    })
}

async fn release_ids(locks: &SeatLocks, locked: &[LockedSeat]) {
    let ids: Vec<i64> = locked.iter().map(|seat| seat.ticket_id).collect();
    release_all(locks, &ids).await;
}
