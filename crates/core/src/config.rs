use anyhow::{bail, Context, Result};
use std::fmt::Display;
use std::str::FromStr;

/// Process configuration, read once at startup and carried in app state.
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub redis_url: String,
    pub secret_key: String,
    pub access_token_expire_minutes: i64,
    pub refresh_token_expire_days: i64,
    /// TTL for seat locks, seconds
    pub seat_lock_timeout: u64,
    /// Waiters admitted per batch
    pub queue_batch_size: i64,
    /// Seconds between batches
    pub queue_batch_interval: i64,
    /// TTL for queue tokens, seconds
    pub queue_token_ttl: u64,
    pub rate_limit_max: i64,
    pub rate_limit_window: u64,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database_url: std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            redis_url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string()),
            secret_key: std::env::var("SECRET_KEY").context("SECRET_KEY must be set")?,
            access_token_expire_minutes: parse_or(
                std::env::var("ACCESS_TOKEN_EXPIRE_MINUTES").ok(),
                "ACCESS_TOKEN_EXPIRE_MINUTES",
                30,
            )?,
            refresh_token_expire_days: parse_or(
                std::env::var("REFRESH_TOKEN_EXPIRE_DAYS").ok(),
                "REFRESH_TOKEN_EXPIRE_DAYS",
                7,
            )?,
            seat_lock_timeout: parse_or(
                std::env::var("SEAT_LOCK_TIMEOUT").ok(),
                "SEAT_LOCK_TIMEOUT",
                120,
            )?,
            queue_batch_size: parse_or(
                std::env::var("QUEUE_BATCH_SIZE").ok(),
                "QUEUE_BATCH_SIZE",
                50,
            )?,
            queue_batch_interval: parse_or(
                std::env::var("QUEUE_BATCH_INTERVAL").ok(),
                "QUEUE_BATCH_INTERVAL",
                10,
            )?,
            queue_token_ttl: parse_or(
                std::env::var("QUEUE_TOKEN_TTL").ok(),
                "QUEUE_TOKEN_TTL",
                600,
            )?,
            rate_limit_max: parse_or(std::env::var("RATE_LIMIT_MAX").ok(), "RATE_LIMIT_MAX", 10)?,
            rate_limit_window: parse_or(
                std::env::var("RATE_LIMIT_WINDOW").ok(),
                "RATE_LIMIT_WINDOW",
                1,
            )?,
        })
    }
}

fn parse_or<T>(raw: Option<String>, name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match raw {
        None => Ok(default),
        Some(raw) => match raw.parse() {
            Ok(value) => Ok(value),
            Err(e) => bail!("invalid {name}={raw}: {e}"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_or_default() {
        assert_eq!(parse_or::<i64>(None, "X", 50).unwrap(), 50);
    }

    #[test]
    fn test_parse_or_value() {
        assert_eq!(parse_or::<i64>(Some("25".into()), "X", 50).unwrap(), 25);
        assert_eq!(parse_or::<u64>(Some("0".into()), "X", 1).unwrap(), 0);
    }

    #[test]
    fn test_parse_or_invalid() {
        assert!(parse_or::<i64>(Some("ten".into()), "X", 50).is_err());
    }
}
