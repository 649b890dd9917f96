//! Loyalty ledger trait.

use async_trait::async_trait;

use courtbook_core::result::AppResult;
use courtbook_core::types::id::{BookingId, UserId};
use courtbook_entity::loyalty::LoyaltyTransaction;

/// Point balance and transaction log.
///
/// Every mutation appends a transaction and adjusts the balance in one
/// atomic unit; concurrent redemptions must not lose updates. A missing
/// account reads as a zero balance rather than an error.
#[async_trait]
pub trait LoyaltyLedger: Send + Sync + 'static {
    /// The user's committed balance.
    async fn balance(&self, user_id: UserId) -> AppResult<i64>;

    /// Add points to the balance.
    async fn credit(
        &self,
        user_id: UserId,
        points: i64,
        reason: &str,
        related_booking_id: Option<BookingId>,
    ) -> AppResult<LoyaltyTransaction>;

    /// Remove points from the balance.
    ///
    /// Fails with `InsufficientPoints` when the resulting balance would
    /// go negative; a failed debit performs no mutation at all.
    async fn debit(
        &self,
        user_id: UserId,
        points: i64,
        reason: &str,
        related_booking_id: Option<BookingId>,
    ) -> AppResult<LoyaltyTransaction>;

    /// The user's transaction log, oldest first.
    async fn transactions(&self, user_id: UserId) -> AppResult<Vec<LoyaltyTransaction>>;
}
