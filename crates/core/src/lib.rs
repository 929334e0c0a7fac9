pub mod auth;
pub mod config;
pub mod queue;
pub mod reservation;

pub use config::Settings;
pub use queue::{QueueConfig, QueueEngine, QueueOutcome};

use encore_types::AppError;

/// Query helpers return `anyhow::Result`; the engines classify their
/// failures as internal errors.
pub(crate) fn db_err(e: anyhow::Error) -> AppError {
    AppError::Internal(format!("database error: {e}"))
}
