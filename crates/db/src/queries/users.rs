use crate::models::User;
use anyhow::Result;
use sqlx::PgPool;

/// Find user by email
pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

/// Find user by ID
pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

/// Whether the email is already registered
pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool> {
    let exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(pool)
            .await?;

    Ok(exists)
}

/// Whether the username is taken by someone other than `exclude_user_id`
pub async fn username_taken(
    pool: &PgPool,
    username: &str,
    exclude_user_id: Option<i64>,
) -> Result<bool> {
    let taken = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM users WHERE username = $1 AND id != COALESCE($2, -1))",
    )
    .bind(username)
    .bind(exclude_user_id)
    .fetch_one(pool)
    .await?;

    Ok(taken)
}

/// Create a new user account
pub async fn insert(
    pool: &PgPool,
    email: &str,
    username: &str,
    password_hash: &str,
) -> Result<User> {
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (email, username, password_hash)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(email)
    .bind(username)
    .bind(password_hash)
    .fetch_one(pool)
    .await?;

    Ok(user)
}

/// Update profile fields; absent fields keep their current value
#[allow(clippy::too_many_arguments)]
pub async fn update_profile(
    pool: &PgPool,
    id: i64,
    username: Option<&str>,
    phone1: Option<&str>,
    phone2: Option<&str>,
    phone3: Option<&str>,
    postal_code: Option<&str>,
    address: Option<&str>,
    detail_address: Option<&str>,
) -> Result<User> {
    let user = sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET username = COALESCE($2, username),
            phone1 = COALESCE($3, phone1),
            phone2 = COALESCE($4, phone2),
            phone3 = COALESCE($5, phone3),
            postal_code = COALESCE($6, postal_code),
            address = COALESCE($7, address),
            detail_address = COALESCE($8, detail_address),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(username)
    .bind(phone1)
    .bind(phone2)
    .bind(phone3)
    .bind(postal_code)
    .bind(address)
    .bind(detail_address)
    .fetch_one(pool)
    .await?;

    Ok(user)
}
