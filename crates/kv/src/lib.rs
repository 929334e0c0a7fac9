//! Typed access to the in-memory store.
//!
//! Every component that touches Redis receives a [`KvClient`] by
//! constructor injection; nothing in this workspace talks to a global
//! connection.

pub mod cache;
pub mod lock;
pub mod rate;

pub use cache::ReadCache;
pub use lock::SeatLocks;
pub use rate::RateLimiter;

use encore_types::AppError;
use redis::aio::ConnectionManager;
use redis::Client;

#[derive(Clone)]
pub struct KvClient {
    conn: ConnectionManager,
}

impl KvClient {
    /// Connect and build the shared connection manager. The manager
    /// reconnects on its own, so a clone of this handle stays valid for
    /// the life of the process.
    pub async fn connect(redis_url: &str) -> Result<Self, AppError> {
        let client = Client::open(redis_url)
            .map_err(|e| AppError::Store(format!("invalid Redis URL: {e}")))?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| AppError::Store(format!("Redis connection failed: {e}")))?;

        Ok(Self { conn })
    }

    /// Cheap per-call connection handle.
    pub fn connection(&self) -> ConnectionManager {
        self.conn.clone()
    }

    pub async fn ping(&self) -> bool {
        let mut conn = self.connection();
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .is_ok()
    }
}

/// Store errors on critical paths surface as 500s.
pub(crate) fn store_err(e: redis::RedisError) -> AppError {
    AppError::Store(e.to_string())
}
