pub mod auth;
pub mod rate_limit;

pub use auth::{AppState, AuthUser};
pub use rate_limit::rate_limit;
