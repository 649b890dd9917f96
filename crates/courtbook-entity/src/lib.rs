//! # courtbook-entity
//!
//! Domain entity models for Courtbook. Every struct in this crate
//! represents a stored record or a domain value object. All entities
//! derive `Debug`, `Clone`, `Serialize`, and `Deserialize`.

pub mod booking;
pub mod bracket;
pub mod court;
pub mod free_slot;
pub mod loyalty;
pub mod tournament;
pub mod user;
