//! Maps `AppError` kinds onto HTTP responses.

use axum::http::header::RETRY_AFTER;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use encore_types::AppError;
use serde_json::json;

/// Newtype so `?` works in handlers: any `AppError` becomes a response.
pub struct ApiError(pub AppError);

pub type ApiResult<T> = Result<T, ApiError>;

impl From<AppError> for ApiError {
    fn from(e: AppError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }

        let body = match &self.0 {
            AppError::QueueTokenMissing => json!({
                "error": "대기열 토큰 필요",
                "message": "인기 이벤트는 대기열을 통과해야 합니다."
            }),
            AppError::QueueTokenInvalid => json!({
                "error": "대기열 토큰 무효",
                "message": "대기열 토큰이 만료되었거나 유효하지 않습니다."
            }),
            AppError::RateLimited { .. } => json!({
                "error": "Too Many Requests",
                "message": "요청이 너무 많습니다. 잠시 후 다시 시도해주세요."
            }),
            // internals are logged above, never returned
            AppError::Database(_) | AppError::Store(_) | AppError::Internal(_) => {
                json!({"detail": "Internal server error"})
            }
            other => json!({"detail": other.to_string()}),
        };

        let mut response = (status, Json(body)).into_response();

        if let AppError::RateLimited { retry_after } = self.0 {
            if let Ok(value) = HeaderValue::from_str(&retry_after.to_string()) {
                response.headers_mut().insert(RETRY_AFTER, value);
            }
        }

        response
    }
}

/// Query-layer (`anyhow`) failures surfaced directly by handlers.
pub fn db_error(e: anyhow::Error) -> ApiError {
    ApiError(AppError::Internal(format!("database error: {e}")))
}
