use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::enums::{EventGenre, ReceiptMethod};

/// Listing entry for the public event catalog. Cached per page.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EventSummary {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub genre: Option<EventGenre>,
    pub sub_genre: Option<String>,
    pub is_hot: bool,
    pub poster_image: Option<String>,
    pub venue_id: i64,
    pub ticket_receipt_method: Option<ReceiptMethod>,
    pub sales_open_at: Option<DateTime<Utc>>,
    pub sales_end_at: Option<DateTime<Utc>>,
}
