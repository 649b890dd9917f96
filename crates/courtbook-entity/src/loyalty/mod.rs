//! Loyalty point domain entities.

pub mod model;

pub use model::{LoyaltyAccount, LoyaltyTransaction, TransactionKind};
