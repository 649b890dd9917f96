//! User domain enums.
//!
//! Identity itself is an external collaborator; the core only consumes
//! the authenticated user id and role.

pub mod role;

pub use role::UserRole;
