//! Loyalty account and transaction models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use courtbook_core::types::id::{BookingId, TransactionId, UserId};

/// Direction of a loyalty transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Points added to the balance.
    Credit,
    /// Points removed from the balance.
    Debit,
}

impl TransactionKind {
    /// Return the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Credit => "credit",
            Self::Debit => "debit",
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A user's loyalty point balance.
///
/// The balance always equals the signed sum of the user's committed
/// transactions and never goes negative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoyaltyAccount {
    /// The account owner.
    pub user_id: UserId,
    /// Current point balance, never negative.
    pub points_balance: i64,
}

/// One entry in the loyalty transaction log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoyaltyTransaction {
    /// Unique transaction identifier.
    pub id: TransactionId,
    /// The account owner.
    pub user_id: UserId,
    /// Credit or debit.
    pub kind: TransactionKind,
    /// Points moved; always positive.
    pub points: i64,
    /// Why the transaction happened.
    pub reason: String,
    /// The booking this transaction settles or rewards, if any.
    pub related_booking_id: Option<BookingId>,
    /// When the transaction was committed.
    pub created_at: DateTime<Utc>,
}
