//! Booking domain entities.

pub mod model;
pub mod status;

pub use model::{Booking, NewBooking};
pub use status::{BookingStatus, PaymentMethod, PaymentStatus, PriceType};
