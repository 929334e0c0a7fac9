use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use encore_core::auth::{
    create_access_token, generate_refresh_token, hash_password, verify_password,
};
use encore_db::queries::{refresh_tokens, users};
use encore_types::api::{
    LoginRequest, RefreshRequest, RegisterRequest, TokenResponse, UpdateProfileRequest,
    UserResponse,
};
use encore_types::AppError;
use serde_json::{json, Value};
use validator::Validate;

use crate::middleware::{AppState, AuthUser};
use crate::response::{db_error, ApiError, ApiResult};

/// Create a new account
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    payload
        .validate()
        .map_err(|e| ApiError(AppError::Validation(e.to_string())))?;

    if users::email_exists(&state.db, &payload.email)
        .await
        .map_err(db_error)?
    {
        return Err(AppError::BadRequest("Email already registered".to_string()).into());
    }

    if users::username_taken(&state.db, &payload.username, None)
        .await
        .map_err(db_error)?
    {
        return Err(AppError::BadRequest("Username already taken".to_string()).into());
    }

    let password_hash = hash_password(&payload.password)?;
    let user = users::insert(&state.db, &payload.email, &payload.username, &password_hash)
        .await
        .map_err(db_error)?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Exchange credentials for an access/refresh token pair
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let user = users::find_by_email(&state.db, &payload.email)
        .await
        .map_err(db_error)?
        .ok_or_else(|| AppError::Unauthorized("Incorrect email or password".to_string()))?;

    if !verify_password(&payload.password, &user.password_hash) {
        return Err(AppError::Unauthorized("Incorrect email or password".to_string()).into());
    }

    if !user.is_active {
        return Err(AppError::Unauthorized("Inactive user".to_string()).into());
    }

    let access_token = create_access_token(
        &user.email,
        &state.settings.secret_key,
        state.settings.access_token_expire_minutes,
    )?;

    let (refresh_token, expires_at) =
        generate_refresh_token(state.settings.refresh_token_expire_days);
    refresh_tokens::insert(&state.db, &refresh_token, user.id, expires_at)
        .await
        .map_err(db_error)?;

    Ok(Json(TokenResponse::bearer(access_token, refresh_token)))
}

/// Rotate a refresh token into a fresh token pair
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let stored = refresh_tokens::find_by_token(&state.db, &payload.refresh_token)
        .await
        .map_err(db_error)?
        .ok_or_else(|| AppError::Unauthorized("Invalid refresh token".to_string()))?;

    if stored.is_revoked {
        return Err(AppError::Unauthorized("Refresh token has been revoked".to_string()).into());
    }

    if stored.expires_at < Utc::now() {
        return Err(AppError::Unauthorized("Refresh token has expired".to_string()).into());
    }

    let user = users::find_by_id(&state.db, stored.user_id)
        .await
        .map_err(db_error)?
        .filter(|user| user.is_active)
        .ok_or_else(|| AppError::Unauthorized("User not found or inactive".to_string()))?;

    let access_token = create_access_token(
        &user.email,
        &state.settings.secret_key,
        state.settings.access_token_expire_minutes,
    )?;

    let (new_refresh_token, expires_at) =
        generate_refresh_token(state.settings.refresh_token_expire_days);

    refresh_tokens::revoke(&state.db, &stored.token)
        .await
        .map_err(db_error)?;
    refresh_tokens::insert(&state.db, &new_refresh_token, user.id, expires_at)
        .await
        .map_err(db_error)?;

    Ok(Json(TokenResponse::bearer(access_token, new_refresh_token)))
}

/// Revoke a refresh token. Succeeds even for unknown tokens.
pub async fn logout(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> ApiResult<Json<Value>> {
    refresh_tokens::revoke(&state.db, &payload.refresh_token)
        .await
        .map_err(db_error)?;

    Ok(Json(json!({"message": "Successfully logged out"})))
}

/// Current user's profile
pub async fn me(AuthUser(user): AuthUser) -> Json<UserResponse> {
    Json(user.into())
}

/// Update the current user's profile
pub async fn update_me(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<UpdateProfileRequest>,
) -> ApiResult<Json<UserResponse>> {
    payload
        .validate()
        .map_err(|e| ApiError(AppError::Validation(e.to_string())))?;

    if let Some(username) = payload.username.as_deref() {
        if users::username_taken(&state.db, username, Some(user.id))
            .await
            .map_err(db_error)?
        {
            return Err(AppError::BadRequest("Username already taken".to_string()).into());
        }
    }

    let updated = users::update_profile(
        &state.db,
        user.id,
        payload.username.as_deref(),
        payload.phone1.as_deref(),
        payload.phone2.as_deref(),
        payload.phone3.as_deref(),
        payload.postal_code.as_deref(),
        payload.address.as_deref(),
        payload.detail_address.as_deref(),
    )
    .await
    .map_err(db_error)?;

    Ok(Json(updated.into()))
}
