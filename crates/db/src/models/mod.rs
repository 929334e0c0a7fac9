pub mod booking;
pub mod event;
pub mod refresh_token;
pub mod ticket;
pub mod user;
pub mod venue;

pub use booking::{Booking, UserBookingRow};
pub use event::{Event, EventSchedule, EventSeatGrade};
pub use refresh_token::RefreshToken;
pub use ticket::Ticket;
pub use user::User;
pub use venue::Venue;
