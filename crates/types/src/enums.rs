use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

/// Seat grade of a ticket row. Stored as the native `ticket_grade` enum.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, sqlx::Type,
)]
#[sqlx(type_name = "ticket_grade")]
pub enum TicketGrade {
    VIP,
    R,
    S,
    A,
}

impl FromStr for TicketGrade {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "VIP" => Ok(Self::VIP),
            "R" => Ok(Self::R),
            "S" => Ok(Self::S),
            "A" => Ok(Self::A),
            _ => Err(()),
        }
    }
}

impl TicketGrade {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VIP => "VIP",
            Self::R => "R",
            Self::S => "S",
            Self::A => "A",
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type, Default,
)]
#[sqlx(type_name = "booking_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Event genre. The canonical Korean labels are the stored values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "event_genre")]
pub enum EventGenre {
    #[sqlx(rename = "뮤지컬")]
    #[serde(rename = "뮤지컬")]
    Musical,
    #[sqlx(rename = "연극")]
    #[serde(rename = "연극")]
    Play,
    #[sqlx(rename = "콘서트")]
    #[serde(rename = "콘서트")]
    Concert,
}

/// How tickets for an event can be received, as configured by the organizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "receipt_method")]
pub enum ReceiptMethod {
    #[sqlx(rename = "배송")]
    #[serde(rename = "배송")]
    Delivery,
    #[sqlx(rename = "현장수령")]
    #[serde(rename = "현장수령")]
    OnSite,
    #[sqlx(rename = "배송,현장수령")]
    #[serde(rename = "배송,현장수령")]
    Both,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticket_grade_round_trip() {
        for s in ["VIP", "R", "S", "A"] {
            let grade: TicketGrade = s.parse().unwrap();
            assert_eq!(grade.as_str(), s);
        }
        assert!("B".parse::<TicketGrade>().is_err());
        assert!("vip".parse::<TicketGrade>().is_err());
    }

    #[test]
    fn test_booking_status_serde_matches_stored_values() {
        assert_eq!(
            serde_json::to_string(&BookingStatus::Pending).unwrap(),
            "\"pending\""
        );
        let status: BookingStatus = serde_json::from_str("\"confirmed\"").unwrap();
        assert_eq!(status, BookingStatus::Confirmed);
        assert_eq!(BookingStatus::Cancelled.as_str(), "cancelled");
    }

    #[test]
    fn test_genre_uses_korean_labels() {
        assert_eq!(
            serde_json::to_string(&EventGenre::Musical).unwrap(),
            "\"뮤지컬\""
        );
        let genre: EventGenre = serde_json::from_str("\"콘서트\"").unwrap();
        assert_eq!(genre, EventGenre::Concert);
    }

    #[test]
    fn test_receipt_method_uses_korean_labels() {
        assert_eq!(
            serde_json::to_string(&ReceiptMethod::Both).unwrap(),
            "\"배송,현장수령\""
        );
        let method: ReceiptMethod = serde_json::from_str("\"현장수령\"").unwrap();
        assert_eq!(method, ReceiptMethod::OnSite);
    }
}
