//! # courtbook-core
//!
//! Core crate for Courtbook. Contains port traits, configuration schemas,
//! typed identifiers, pagination types, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Courtbook crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
