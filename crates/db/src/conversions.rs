//! Conversion implementations from DB models to API response types.

use crate::models::{Booking, Event, User};
use encore_types::api::{BookingResponse, EventSummary, UserResponse};

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            is_active: user.is_active,
            is_admin: user.is_admin,
            phone1: user.phone1,
            phone2: user.phone2,
            phone3: user.phone3,
            postal_code: user.postal_code,
            address: user.address,
            detail_address: user.detail_address,
            created_at: user.created_at,
        }
    }
}

impl From<Booking> for BookingResponse {
    fn from(booking: Booking) -> Self {
        Self {
            id: booking.id,
            user_id: booking.user_id,
            ticket_id: booking.ticket_id,
            status: booking.status,
            total_price: booking.total_price,
            booked_at: booking.booked_at,
        }
    }
}

impl From<Event> for EventSummary {
    fn from(event: Event) -> Self {
        Self {
            id: event.id,
            title: event.title,
            description: event.description,
            location: event.location,
            genre: event.genre,
            sub_genre: event.sub_genre,
            is_hot: event.is_hot,
            poster_image: event.poster_image,
            venue_id: event.venue_id,
            ticket_receipt_method: event.ticket_receipt_method,
            sales_open_at: event.sales_open_at,
            sales_end_at: event.sales_end_at,
        }
    }
}
