//! # courtbook-store
//!
//! Repository traits consumed by the service layer, together with an
//! in-memory storage engine implementing them. The traits carry the
//! storage-level guarantees the domain depends on — unique active slots,
//! atomic counter updates, compare-and-set payment confirmation — so any
//! backing store (SQL, document, in-memory) slots in behind the same
//! interface.

pub mod memory;
pub mod traits;

pub use traits::{
    BookingStore, CourtStore, FreeSlotLedger, LoyaltyLedger, RegistrationStore, TournamentStore,
};
