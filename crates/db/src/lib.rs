pub mod conversions;
pub mod models;
pub mod pool;
pub mod queries;

pub use pool::create_pool;
pub use sqlx::PgPool;
