//! Repository traits implemented by storage engines.

pub mod bookings;
pub mod courts;
pub mod free_slots;
pub mod loyalty;
pub mod tournaments;

pub use bookings::BookingStore;
pub use courts::CourtStore;
pub use free_slots::FreeSlotLedger;
pub use loyalty::LoyaltyLedger;
pub use tournaments::{RegistrationStore, TournamentStore};
