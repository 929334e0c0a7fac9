use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Key-value store failure on a critical path (queue admission, locking).
    /// Non-critical paths (rate limit, caches) absorb store errors instead.
    #[error("Store error: {0}")]
    Store(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Queue token required")]
    QueueTokenMissing,

    #[error("Queue token invalid")]
    QueueTokenInvalid,

    #[error("{0}")]
    SeatHeldByOther(String),

    #[error("{0}")]
    AlreadyBooked(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Too many requests")]
    RateLimited { retry_after: u64 },

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Database(_) | Self::Store(_) | Self::Internal(_) => 500,
            Self::NotFound(_) => 404,
            Self::Unauthorized(_) => 401,
            Self::Forbidden(_) | Self::QueueTokenMissing | Self::QueueTokenInvalid => 403,
            Self::SeatHeldByOther(_) => 409,
            Self::AlreadyBooked(_) | Self::BadRequest(_) | Self::Validation(_) => 400,
            Self::RateLimited { .. } => 429,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::NotFound("Event".into()).status_code(), 404);
        assert_eq!(AppError::QueueTokenMissing.status_code(), 403);
        assert_eq!(AppError::QueueTokenInvalid.status_code(), 403);
        assert_eq!(AppError::SeatHeldByOther("seat".into()).status_code(), 409);
        assert_eq!(AppError::AlreadyBooked("seat".into()).status_code(), 400);
        assert_eq!(AppError::RateLimited { retry_after: 1 }.status_code(), 429);
        assert_eq!(AppError::Store("down".into()).status_code(), 500);
    }
}
