//! Fair admission queue with periodic batched release.
//!
//! Per event the store holds a waiter sorted set (score = enqueue time), a
//! monotone batch cursor and the last-advance timestamp. All three are
//! mutated only by the batch-advance script, so concurrent pollers can
//! never over-advance the cursor; that script is the sole source of
//! admission fairness.

use encore_kv::KvClient;
use encore_types::{AppError, Result};
use redis::AsyncCommands;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::auth::{constant_time_eq, opaque_token};
use crate::config::Settings;

/// Advances the batch cursor at most once per interval.
///
/// KEYS: last-advance timestamp, cursor, waiter set.
/// ARGV: batch interval (s), batch size, current time.
/// Returns the cursor in effect after the call, as a string.
const BATCH_ADVANCE: &str = r#"
local last_time_key = KEYS[1]
local cursor_key = KEYS[2]
local queue_key = KEYS[3]
local batch_interval = tonumber(ARGV[1])
local batch_size = tonumber(ARGV[2])
local now = tonumber(ARGV[3])

local last_time = tonumber(redis.call('GET', last_time_key) or '0')
if (now - last_time) < batch_interval then
    return redis.call('GET', cursor_key) or '0'
end

local cursor = tonumber(redis.call('GET', cursor_key) or '0')

local members
if cursor == 0 then
    members = redis.call('ZRANGEBYSCORE', queue_key, '-inf', '+inf', 'WITHSCORES', 'LIMIT', 0, batch_size)
else
    members = redis.call('ZRANGEBYSCORE', queue_key, '(' .. tostring(cursor), '+inf', 'WITHSCORES', 'LIMIT', 0, batch_size)
end

if #members == 0 then
    -- nothing to admit; refresh the timestamp so idle events are not
    -- re-scanned on every poll
    redis.call('SET', last_time_key, tostring(now))
    redis.call('EXPIRE', last_time_key, 86400)
    return redis.call('GET', cursor_key) or '0'
end

local new_cursor = members[#members]

redis.call('SET', cursor_key, tostring(new_cursor))
redis.call('EXPIRE', cursor_key, 86400)
redis.call('SET', last_time_key, tostring(now))
redis.call('EXPIRE', last_time_key, 86400)

return tostring(new_cursor)
"#;

#[derive(Debug, Clone, Copy)]
pub struct QueueConfig {
    pub batch_size: i64,
    pub batch_interval: i64,
    pub token_ttl: u64,
}

impl QueueConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            batch_size: settings.queue_batch_size,
            batch_interval: settings.queue_batch_interval,
            token_ttl: settings.queue_token_ttl,
        }
    }
}

#[derive(Debug)]
pub enum QueueOutcome {
    /// Past the cursor: token issued, removed from the waiter set.
    Released { queue_token: String, total: i64 },
    /// Still behind the cursor.
    Waiting {
        position: i64,
        total: i64,
        estimated_wait_time: i64,
    },
    /// Status probe for a user who never entered (or already passed).
    NotInQueue { total: i64 },
}

#[derive(Clone)]
pub struct QueueEngine {
    kv: KvClient,
    pub cfg: QueueConfig,
}

impl QueueEngine {
    pub fn new(kv: KvClient, cfg: QueueConfig) -> Self {
        Self { kv, cfg }
    }

    fn queue_key(event_id: i64) -> String {
        format!("queue:event:{event_id}")
    }

    fn cursor_key(event_id: i64) -> String {
        format!("queue_batch_cursor:event:{event_id}")
    }

    fn last_time_key(event_id: i64) -> String {
        format!("queue_batch_last_time:event:{event_id}")
    }

    fn history_key(event_id: i64) -> String {
        format!("queue_history:event:{event_id}")
    }

    fn token_key(event_id: i64, user_id: i64) -> String {
        format!("queue_token:event:{event_id}:user:{user_id}")
    }

    /// Join the waiter set (keeping the original position on repeat calls),
    /// opportunistically advance the batch, and either release the user
    /// with a token or report their place in line.
    pub async fn enter(&self, event_id: i64, user_id: i64) -> Result<QueueOutcome> {
        let mut conn = self.kv.connection();
        let queue_key = Self::queue_key(event_id);
        let member = user_id.to_string();

        let existing: Option<f64> = conn
            .zscore(&queue_key, &member)
            .await
            .map_err(kv_err)?;
        if existing.is_none() {
            let _: i64 = conn
                .zadd(&queue_key, &member, now_secs())
                .await
                .map_err(kv_err)?;
        }

        let cursor = self.advance_batch(event_id).await?;

        if self.released(event_id, user_id, cursor).await? {
            return self.release(event_id, user_id).await;
        }

        let rank: Option<i64> = conn.zrank(&queue_key, &member).await.map_err(kv_err)?;
        let total: i64 = conn.zcard(&queue_key).await.map_err(kv_err)?;
        let position = rank.map(|r| r + 1).unwrap_or(total);
        let estimated_wait_time = self.estimated_wait(event_id, position).await;

        Ok(QueueOutcome::Waiting {
            position,
            total,
            estimated_wait_time,
        })
    }

    /// Poll without joining: advances the batch, then reports the caller's
    /// state. A user who is not in the waiter set is simply not in queue.
    pub async fn status(&self, event_id: i64, user_id: i64) -> Result<QueueOutcome> {
        let mut conn = self.kv.connection();
        let queue_key = Self::queue_key(event_id);
        let member = user_id.to_string();

        let cursor = self.advance_batch(event_id).await?;

        let rank: Option<i64> = conn.zrank(&queue_key, &member).await.map_err(kv_err)?;
        let total: i64 = conn.zcard(&queue_key).await.map_err(kv_err)?;

        let Some(rank) = rank else {
            return Ok(QueueOutcome::NotInQueue { total });
        };

        if self.released(event_id, user_id, cursor).await? {
            return self.release(event_id, user_id).await;
        }

        let position = rank + 1;
        let estimated_wait_time = self.estimated_wait(event_id, position).await;

        Ok(QueueOutcome::Waiting {
            position,
            total,
            estimated_wait_time,
        })
    }

    /// Run the batch-advance script. Returns the cursor now in effect.
    pub async fn advance_batch(&self, event_id: i64) -> Result<f64> {
        let mut conn = self.kv.connection();
        let cursor: String = redis::Script::new(BATCH_ADVANCE)
            .key(Self::last_time_key(event_id))
            .key(Self::cursor_key(event_id))
            .key(Self::queue_key(event_id))
            .arg(self.cfg.batch_interval)
            .arg(self.cfg.batch_size)
            .arg(now_secs())
            .invoke_async(&mut conn)
            .await
            .map_err(kv_err)?;

        cursor
            .parse()
            .map_err(|_| AppError::Store(format!("batch cursor is not numeric: {cursor}")))
    }

    /// Mint and store an admission token for `(event, user)`.
    pub async fn mint_token(&self, event_id: i64, user_id: i64) -> Result<String> {
        let token = opaque_token();
        let mut conn = self.kv.connection();
        conn.set_ex::<_, _, ()>(Self::token_key(event_id, user_id), &token, self.cfg.token_ttl)
            .await
            .map_err(kv_err)?;

        Ok(token)
    }

    /// O(1) token check: direct read, constant-time compare. Any store
    /// trouble reads as invalid.
    pub async fn validate_token(&self, event_id: i64, user_id: i64, presented: &str) -> bool {
        let mut conn = self.kv.connection();
        let stored: Option<String> = match conn.get(Self::token_key(event_id, user_id)).await {
            Ok(stored) => stored,
            Err(_) => return false,
        };

        stored
            .map(|stored| constant_time_eq(&stored, presented))
            .unwrap_or(false)
    }

    async fn release(&self, event_id: i64, user_id: i64) -> Result<QueueOutcome> {
        let mut conn = self.kv.connection();
        let queue_key = Self::queue_key(event_id);

        let queue_token = self.mint_token(event_id, user_id).await?;
        let _: i64 = conn
            .zrem(&queue_key, user_id.to_string())
            .await
            .map_err(kv_err)?;
        self.record_processing(event_id).await;
        let total: i64 = conn.zcard(&queue_key).await.map_err(kv_err)?;

        Ok(QueueOutcome::Released { queue_token, total })
    }

    async fn released(&self, event_id: i64, user_id: i64, cursor: f64) -> Result<bool> {
        if cursor <= 0.0 {
            return Ok(false);
        }

        let mut conn = self.kv.connection();
        let score: Option<f64> = conn
            .zscore(Self::queue_key(event_id), user_id.to_string())
            .await
            .map_err(kv_err)?;

        Ok(score.map(|score| score <= cursor).unwrap_or(false))
    }

    /// Record an admission for throughput stats, trimming entries older
    /// than an hour. Stats are best-effort.
    async fn record_processing(&self, event_id: i64) {
        let mut conn = self.kv.connection();
        let key = Self::history_key(event_id);
        let now = now_secs();

        let result: redis::RedisResult<()> = async {
            conn.zadd::<_, _, _, i64>(&key, now.to_string(), now).await?;
            conn.zrembyscore::<_, _, _, i64>(&key, 0f64, now - 3600.0)
                .await?;
            conn.expire::<_, bool>(&key, 86400).await?;
            Ok(())
        }
        .await;

        if let Err(e) = result {
            tracing::debug!(event_id, error = %e, "failed to record queue admission");
        }
    }

    /// Admissions per second over the last minute; 0 when idle or on error.
    async fn recent_rate(&self, event_id: i64) -> f64 {
        let mut conn = self.kv.connection();
        let now = now_secs();

        match conn
            .zcount::<_, _, _, i64>(Self::history_key(event_id), now - 60.0, now)
            .await
        {
            Ok(count) if count > 0 => count as f64 / 60.0,
            _ => 0.0,
        }
    }

    async fn estimated_wait(&self, event_id: i64, position: i64) -> i64 {
        let recent_rate = self.recent_rate(event_id).await;
        estimate_wait(
            position,
            self.cfg.batch_size,
            self.cfg.batch_interval,
            recent_rate,
        )
    }
}

/// Batch-based wait estimate in whole seconds.
///
/// The batch term alone answers "how many intervals until my batch"; when
/// recent throughput is known it is blended 60/40 with the measured rate,
/// which damps transient spikes while still tracking sustained change.
pub fn estimate_wait(position: i64, batch_size: i64, batch_interval: i64, recent_rate: f64) -> i64 {
    let batches_ahead = ((position - 1).max(0) as f64 / batch_size as f64).ceil();
    let base = batches_ahead * batch_interval as f64;

    let estimate = if recent_rate > 0.0 {
        base * 0.6 + (position as f64 / recent_rate) * 0.4
    } else {
        base
    };

    estimate.max(0.0) as i64
}

fn now_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_secs_f64()
}

fn kv_err(e: redis::RedisError) -> AppError {
    AppError::Store(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_front_of_line() {
        assert_eq!(estimate_wait(1, 50, 10, 0.0), 0);
    }

    #[test]
    fn test_estimate_next_batch() {
        // anyone behind position 1 but within the first full batch waits
        // one interval
        assert_eq!(estimate_wait(2, 50, 10, 0.0), 10);
        assert_eq!(estimate_wait(51, 50, 10, 0.0), 10);
        assert_eq!(estimate_wait(101, 50, 10, 0.0), 20);
    }

    #[test]
    fn test_estimate_blends_measured_rate() {
        // base = ceil(99/50) * 10 = 20; rate term = 100 / 1.0 = 100
        assert_eq!(estimate_wait(100, 50, 10, 1.0), 52);
    }

    #[test]
    fn test_estimate_never_negative() {
        assert_eq!(estimate_wait(0, 50, 10, 0.0), 0);
        assert_eq!(estimate_wait(-3, 50, 10, 5.0), 0);
    }

    #[test]
    fn test_key_layout() {
        assert_eq!(QueueEngine::queue_key(9), "queue:event:9");
        assert_eq!(QueueEngine::cursor_key(9), "queue_batch_cursor:event:9");
        assert_eq!(
            QueueEngine::last_time_key(9),
            "queue_batch_last_time:event:9"
        );
        assert_eq!(QueueEngine::history_key(9), "queue_history:event:9");
        assert_eq!(QueueEngine::token_key(9, 4), "queue_token:event:9:user:4");
    }
}
