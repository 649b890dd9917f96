//! # courtbook-service
//!
//! Business logic for Courtbook: slot pricing, availability, the
//! reservation coordinator state machine, the payment gateway adapter,
//! the bracket engine, the tournament status clock, and notification
//! dispatch. Services hold `Arc`'d repository traits from
//! `courtbook-store` and surface every failure as a typed
//! [`courtbook_core::AppError`].

pub mod availability;
pub mod booking;
pub mod bracket;
pub mod context;
pub mod gateway;
pub mod notification;
pub mod pricing;
pub mod tournament;

pub use context::RequestContext;
