//! Free-slot quota domain entities.

pub mod model;

pub use model::FreeSlotRecord;
