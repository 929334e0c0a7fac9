//! Two-phase seat reservation: a fast distributed lock rejects concurrent
//! selections in O(ms) without touching Postgres, and a row-locked
//! transaction is the authoritative correctness layer underneath it.

pub mod create;
pub mod history;
pub mod lock;
pub mod seat_map;
pub mod utils;

pub use create::create_bookings;
pub use history::group_user_bookings;
pub use lock::lock_seats;
pub use seat_map::list_event_tickets;
pub use utils::{seat_key, synthetic_ticket_id};

use encore_db::queries::tickets;
use encore_kv::SeatLocks;
use encore_types::Result;
use sqlx::PgPool;

use crate::db_err;

/// Lock-namespace id for a seat: the materialized ticket's row id when one
/// exists, otherwise the deterministic negative synthetic id.
pub(crate) async fn resolve_ticket_id(
    pool: &PgPool,
    event_id: i64,
    schedule_id: Option<i64>,
    row: &str,
    number: i32,
) -> Result<i64> {
    let existing = tickets::find_by_seat(pool, event_id, schedule_id, row, number)
        .await
        .map_err(db_err)?;

    Ok(match existing {
        Some(ticket) => ticket.id,
        None => synthetic_ticket_id(event_id, schedule_id, row, number),
    })
}

/// Unconditional release of every lock this request acquired. Runs on all
/// exit paths, success and failure alike.
pub(crate) async fn release_all(locks: &SeatLocks, ticket_ids: &[i64]) {
    for ticket_id in ticket_ids {
        locks.unlock(*ticket_id, None).await;
    }
}
