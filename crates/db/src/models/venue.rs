use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Venue {
    pub id: i64,
    pub name: String,
    pub location: String,
    /// Free-form seat layout document; the seat-map projection reads
    /// `sections` / `default_section` / `section` and `seats_per_row`.
    pub seat_map: serde_json::Value,
    pub capacity: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}
