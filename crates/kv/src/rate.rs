//! Fixed-window request counter per client IP.

use crate::{store_err, KvClient};
use encore_types::Result;
use redis::AsyncCommands;

#[derive(Clone)]
pub struct RateLimiter {
    kv: KvClient,
    max_requests: i64,
    window_secs: u64,
}

impl RateLimiter {
    pub fn new(kv: KvClient, max_requests: i64, window_secs: u64) -> Self {
        Self {
            kv,
            max_requests,
            window_secs,
        }
    }

    pub fn window_secs(&self) -> u64 {
        self.window_secs
    }

    fn key(ip: &str) -> String {
        format!("rate_limit:{ip}")
    }

    /// Count one request from `ip`; returns whether it is still within
    /// the window's allowance. The caller decides what a store error
    /// means; the middleware fails open.
    pub async fn hit(&self, ip: &str) -> Result<bool> {
        let mut conn = self.kv.connection();
        let key = Self::key(ip);

        let count: i64 = conn.incr(&key, 1).await.map_err(store_err)?;
        if count == 1 {
            let _: bool = conn
                .expire(&key, self.window_secs as i64)
                .await
                .map_err(store_err)?;
        }

        Ok(count <= self.max_requests)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_key() {
        assert_eq!(RateLimiter::key("10.0.0.7"), "rate_limit:10.0.0.7");
    }
}
