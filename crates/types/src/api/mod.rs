pub mod auth;
pub mod events;
pub mod queue;
pub mod tickets;

pub use auth::{
    LoginRequest, RefreshRequest, RegisterRequest, TokenResponse, UpdateProfileRequest,
    UserResponse,
};
pub use events::EventSummary;
pub use queue::QueueStatusResponse;
pub use tickets::{
    BookingResponse, CreateBookingRequest, LockedSeat, SeatLockRequest, SeatLockResponse,
    SeatRef, SeatSelection, TicketView, UserBookingItem,
};
