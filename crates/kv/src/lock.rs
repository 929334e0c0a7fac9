//! Per-seat distributed lock.
//!
//! Lock values are `"{user_id}:{nonce}"`. The user prefix lets a retrying
//! request from the same user re-enter instead of self-deadlocking; the
//! nonce keeps the value unique so a conditional delete never releases a
//! lock that another request re-acquired after TTL expiry.

use crate::{store_err, KvClient};
use encore_types::Result;
use redis::AsyncCommands;
use uuid::Uuid;

/// Deletes the lock only while the stored value still carries the given
/// `"{user_id}:"` prefix.
const UNLOCK_IF_OWNER: &str = r#"
local value = redis.call('GET', KEYS[1])
if value and string.sub(value, 1, string.len(ARGV[1])) == ARGV[1] then
    return redis.call('DEL', KEYS[1])
end
return 0
"#;

#[derive(Clone)]
pub struct SeatLocks {
    kv: KvClient,
    ttl_secs: u64,
}

impl SeatLocks {
    pub fn new(kv: KvClient, ttl_secs: u64) -> Self {
        Self { kv, ttl_secs }
    }

    fn key(ticket_id: i64) -> String {
        format!("seat_lock:{ticket_id}")
    }

    /// Try to take the lock for `user_id`. Non-blocking; returns false
    /// when any holder (including the same user) already has it.
    pub async fn try_lock(&self, ticket_id: i64, user_id: i64) -> Result<bool> {
        let mut conn = self.kv.connection();
        let value = format!("{user_id}:{}", Uuid::new_v4());

        let set: Option<String> = redis::cmd("SET")
            .arg(Self::key(ticket_id))
            .arg(value)
            .arg("NX")
            .arg("EX")
            .arg(self.ttl_secs)
            .query_async(&mut conn)
            .await
            .map_err(store_err)?;

        Ok(set.is_some())
    }

    /// User currently holding the lock, if any. A malformed value counts
    /// as no owner.
    pub async fn owner(&self, ticket_id: i64) -> Result<Option<i64>> {
        let mut conn = self.kv.connection();
        let value: Option<String> = conn
            .get(Self::key(ticket_id))
            .await
            .map_err(store_err)?;

        match value {
            None => Ok(None),
            Some(value) => match parse_owner(&value) {
                Some(user_id) => Ok(Some(user_id)),
                None => {
                    tracing::warn!(ticket_id, %value, "malformed seat lock value");
                    Ok(None)
                }
            },
        }
    }

    /// Release the lock. With `user_id` the delete is conditional on that
    /// user still owning it; without, unconditional. Runs on cleanup
    /// paths, so failures are logged rather than propagated.
    pub async fn unlock(&self, ticket_id: i64, user_id: Option<i64>) {
        let mut conn = self.kv.connection();
        let result: redis::RedisResult<i64> = match user_id {
            Some(uid) => {
                redis::Script::new(UNLOCK_IF_OWNER)
                    .key(Self::key(ticket_id))
                    .arg(format!("{uid}:"))
                    .invoke_async(&mut conn)
                    .await
            }
            None => conn.del(Self::key(ticket_id)).await,
        };

        if let Err(e) = result {
            tracing::warn!(ticket_id, error = %e, "failed to release seat lock");
        }
    }
}

fn parse_owner(value: &str) -> Option<i64> {
    value.split_once(':')?.0.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_owner() {
        assert_eq!(
            parse_owner("42:7f1c2a34-0000-0000-0000-000000000000"),
            Some(42)
        );
        assert_eq!(parse_owner("42:"), Some(42));
        assert_eq!(parse_owner("no-colon-nonce"), None);
        assert_eq!(parse_owner("abc:nonce"), None);
        assert_eq!(parse_owner(""), None);
    }

    #[test]
    fn test_lock_key_namespace() {
        assert_eq!(SeatLocks::key(17), "seat_lock:17");
        // synthetic ids are negative and must stay in the same namespace
        assert_eq!(SeatLocks::key(-934_215), "seat_lock:-934215");
    }
}
