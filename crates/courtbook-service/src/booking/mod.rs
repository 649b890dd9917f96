//! Booking services.

pub mod coordinator;

pub use coordinator::{
    CreateBookingRequest, CreatedBooking, ReconcileDisposition, ReconcileOutcome, ReconcileTarget,
    ReservationCoordinator, SettlementMethod, SweepSummary,
};
