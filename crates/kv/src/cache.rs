//! Short-TTL read caches for the public read paths.
//!
//! Cache failures are absorbed: a broken store must never take the read
//! path down with it, so every operation here degrades to a miss.

use crate::KvClient;
use redis::AsyncCommands;
use serde_json::Value;

pub const EVENT_LIST_TTL_SECS: u64 = 300;
pub const EVENT_SEATS_TTL_SECS: u64 = 60;
pub const SEAT_STATUS_TTL_SECS: u64 = 300;

#[derive(Clone)]
pub struct ReadCache {
    kv: KvClient,
}

impl ReadCache {
    pub fn new(kv: KvClient) -> Self {
        Self { kv }
    }

    fn schedule_part(schedule_id: Option<i64>) -> String {
        match schedule_id {
            Some(sid) => sid.to_string(),
            None => "all".to_string(),
        }
    }

    fn event_seats_key(event_id: i64, schedule_id: Option<i64>) -> String {
        format!("event_seats:{event_id}:{}", Self::schedule_part(schedule_id))
    }

    fn seat_status_key(event_id: i64, schedule_id: Option<i64>, seat_key: &str) -> String {
        format!(
            "seat_status:{event_id}:{}:{seat_key}",
            Self::schedule_part(schedule_id)
        )
    }

    fn event_list_key(skip: i64, limit: i64) -> String {
        format!("events:all:{skip}:{limit}")
    }

    /// Cached projected seat map for an event/schedule, if fresh.
    pub async fn event_seats(&self, event_id: i64, schedule_id: Option<i64>) -> Option<Value> {
        self.get_json(&Self::event_seats_key(event_id, schedule_id))
            .await
    }

    pub async fn put_event_seats(&self, event_id: i64, schedule_id: Option<i64>, seats: &Value) {
        self.put_json(
            &Self::event_seats_key(event_id, schedule_id),
            seats,
            EVENT_SEATS_TTL_SECS,
        )
        .await;
    }

    /// Cached availability of a single seat. `Some(false)` is trustworthy
    /// because entries are only written on commit and there is no cancel
    /// flow that could flip a seat back.
    pub async fn seat_status(
        &self,
        event_id: i64,
        schedule_id: Option<i64>,
        seat_key: &str,
    ) -> Option<bool> {
        let key = Self::seat_status_key(event_id, schedule_id, seat_key);
        let mut conn = self.kv.connection();
        match conn.get::<_, Option<String>>(&key).await {
            Ok(value) => value.map(|v| v == "1"),
            Err(e) => {
                tracing::debug!(key, error = %e, "seat status cache read failed");
                None
            }
        }
    }

    pub async fn put_seat_status(
        &self,
        event_id: i64,
        schedule_id: Option<i64>,
        seat_key: &str,
        available: bool,
    ) {
        let key = Self::seat_status_key(event_id, schedule_id, seat_key);
        let mut conn = self.kv.connection();
        let payload = if available { "1" } else { "0" };
        if let Err(e) = conn
            .set_ex::<_, _, ()>(&key, payload, SEAT_STATUS_TTL_SECS)
            .await
        {
            tracing::debug!(key, error = %e, "seat status cache write failed");
        }
    }

    /// Drop every cached seat view of the event, or of one schedule when
    /// given. Runs after each committed booking.
    pub async fn invalidate_seat_maps(&self, event_id: i64, schedule_id: Option<i64>) {
        let status_pattern = match schedule_id {
            Some(sid) => format!("seat_status:{event_id}:{sid}:*"),
            None => format!("seat_status:{event_id}:*"),
        };
        self.delete_pattern(&status_pattern).await;
        self.delete_pattern(&format!("event_seats:{event_id}:*"))
            .await;
    }

    /// Cached event-catalog page, if fresh.
    pub async fn event_list(&self, skip: i64, limit: i64) -> Option<Value> {
        self.get_json(&Self::event_list_key(skip, limit)).await
    }

    pub async fn put_event_list(&self, skip: i64, limit: i64, events: &Value) {
        self.put_json(
            &Self::event_list_key(skip, limit),
            events,
            EVENT_LIST_TTL_SECS,
        )
        .await;
    }

    async fn get_json(&self, key: &str) -> Option<Value> {
        let mut conn = self.kv.connection();
        match conn.get::<_, Option<String>>(key).await {
            Ok(Some(raw)) => serde_json::from_str(&raw).ok(),
            Ok(None) => None,
            Err(e) => {
                tracing::debug!(key, error = %e, "cache read failed");
                None
            }
        }
    }

    async fn put_json(&self, key: &str, value: &Value, ttl_secs: u64) {
        let mut conn = self.kv.connection();
        if let Err(e) = conn
            .set_ex::<_, _, ()>(key, value.to_string(), ttl_secs)
            .await
        {
            tracing::debug!(key, error = %e, "cache write failed");
        }
    }

    async fn delete_pattern(&self, pattern: &str) {
        let mut conn = self.kv.connection();
        let keys: Vec<String> = match conn.keys(pattern).await {
            Ok(keys) => keys,
            Err(e) => {
                tracing::debug!(pattern, error = %e, "cache invalidation scan failed");
                return;
            }
        };
        if keys.is_empty() {
            return;
        }
        if let Err(e) = conn.del::<_, ()>(keys).await {
            tracing::debug!(pattern, error = %e, "cache invalidation delete failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        assert_eq!(ReadCache::event_seats_key(3, Some(7)), "event_seats:3:7");
        assert_eq!(ReadCache::event_seats_key(3, None), "event_seats:3:all");
        assert_eq!(
            ReadCache::seat_status_key(3, Some(7), "1-5"),
            "seat_status:3:7:1-5"
        );
        assert_eq!(
            ReadCache::seat_status_key(3, None, "1-5"),
            "seat_status:3:all:1-5"
        );
        assert_eq!(ReadCache::event_list_key(0, 20), "events:all:0:20");
    }
}
