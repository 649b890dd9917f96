//! # courtbook-worker
//!
//! Background maintenance for Courtbook: the reservation expiry sweep,
//! booking completion and reminders, and tournament status evaluation.
//! Each concern is a [`RecurringTask`] the runner ticks on its own
//! interval until shutdown.

pub mod jobs;
pub mod runner;

pub use runner::{RecurringTask, TaskRunner};
