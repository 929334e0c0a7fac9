//! Fixed-window rate limit on the public read paths.

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use encore_types::AppError;
use std::net::SocketAddr;

use crate::middleware::AppState;
use crate::response::ApiError;

/// Path prefixes guarded by the limiter.
const RATE_LIMITED_PREFIXES: &[&str] = &["/api/v1/events"];

/// A store failure fails open: losing Redis must not take the public
/// listing down with it.
pub async fn rate_limit(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path();
    if !RATE_LIMITED_PREFIXES
        .iter()
        .any(|prefix| path.starts_with(prefix))
    {
        return next.run(request).await;
    }

    let ip = addr.ip().to_string();
    match state.limiter.hit(&ip).await {
        Ok(true) => next.run(request).await,
        Ok(false) => ApiError(AppError::RateLimited {
            retry_after: state.limiter.window_secs(),
        })
        .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "rate limiter unavailable, failing open");
            next.run(request).await
        }
    }
}
