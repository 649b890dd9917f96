//! In-memory storage engine.
//!
//! Single-node implementations of the repository traits, suitable for
//! tests and embedded deployments. Compound invariants (the unique slot
//! index, ledger atomicity) are held under a `tokio::sync::Mutex`;
//! independent per-key counters use `dashmap` entries. No lock is ever
//! held across an await point that leaves the store.

pub mod bookings;
pub mod courts;
pub mod free_slots;
pub mod loyalty;
pub mod tournaments;

pub use bookings::MemoryBookingStore;
pub use courts::MemoryCourtStore;
pub use free_slots::MemoryFreeSlotLedger;
pub use loyalty::MemoryLoyaltyLedger;
pub use tournaments::{MemoryRegistrationStore, MemoryTournamentStore};
