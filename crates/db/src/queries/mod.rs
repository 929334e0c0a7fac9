pub mod bookings;
pub mod events;
pub mod refresh_tokens;
pub mod tickets;
pub mod users;
