use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    RequestPartsExt,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use encore_core::{QueueEngine, Settings};
use encore_db::{models::User, queries::users, PgPool};
use encore_kv::{RateLimiter, ReadCache, SeatLocks};
use encore_types::AppError;
use std::sync::Arc;

use crate::response::ApiError;

/// Extractor for the authenticated user (required).
/// Usage: `async fn handler(AuthUser(user): AuthUser)`
pub struct AuthUser(pub User);

/// Application state shared by all handlers. Everything here is a cheap
/// clone around a pooled connection.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub locks: SeatLocks,
    pub cache: ReadCache,
    pub queue: QueueEngine,
    pub limiter: RateLimiter,
    pub settings: Arc<Settings>,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| {
                ApiError(AppError::Unauthorized(
                    "Missing or invalid Authorization header".to_string(),
                ))
            })?;

        let app_state = AppState::from_ref(state);

        let claims =
            encore_core::auth::verify_access_token(bearer.token(), &app_state.settings.secret_key)
                .ok_or_else(|| {
                    ApiError(AppError::Unauthorized(
                        "Invalid authentication credentials".to_string(),
                    ))
                })?;

        let user = users::find_by_email(&app_state.db, &claims.sub)
            .await
            .map_err(|e| ApiError(AppError::Internal(format!("database error: {e}"))))?
            .ok_or_else(|| ApiError(AppError::NotFound("User".to_string())))?;

        if !user.is_active {
            return Err(ApiError(AppError::Forbidden("Inactive user".to_string())));
        }

        Ok(AuthUser(user))
    }
}
