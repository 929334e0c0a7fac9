use crate::models::RefreshToken;
use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

/// Store a newly issued refresh token
pub async fn insert(
    pool: &PgPool,
    token: &str,
    user_id: i64,
    expires_at: DateTime<Utc>,
) -> Result<RefreshToken> {
    let refresh_token = sqlx::query_as::<_, RefreshToken>(
        r#"
        INSERT INTO refresh_tokens (token, user_id, expires_at)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(token)
    .bind(user_id)
    .bind(expires_at)
    .fetch_one(pool)
    .await?;

    Ok(refresh_token)
}

/// Find refresh token by its opaque value
pub async fn find_by_token(pool: &PgPool, token: &str) -> Result<Option<RefreshToken>> {
    let refresh_token =
        sqlx::query_as::<_, RefreshToken>("SELECT * FROM refresh_tokens WHERE token = $1")
            .bind(token)
            .fetch_optional(pool)
            .await?;

    Ok(refresh_token)
}

/// Revoke a refresh token. Idempotent.
pub async fn revoke(pool: &PgPool, token: &str) -> Result<()> {
    sqlx::query("UPDATE refresh_tokens SET is_revoked = true WHERE token = $1")
        .bind(token)
        .execute(pool)
        .await?;

    Ok(())
}
