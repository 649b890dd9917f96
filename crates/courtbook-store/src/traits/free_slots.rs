//! Free-slot ledger trait.

use async_trait::async_trait;
use chrono::NaiveDate;

use courtbook_core::result::AppResult;
use courtbook_core::types::id::UserId;

/// Per-user, per-day counter of complimentary bookings.
///
/// A missing record means the full daily limit is available; the ledger
/// lazily initializes it on first consumption. `consume_one` must be a
/// single atomic upsert-and-decrement so two concurrent bookings by the
/// same user cannot both spend the last slot.
#[async_trait]
pub trait FreeSlotLedger: Send + Sync + 'static {
    /// Complimentary bookings the user still has on `date`.
    async fn remaining(&self, user_id: UserId, date: NaiveDate) -> AppResult<u32>;

    /// Spend one complimentary booking, returning the remainder.
    ///
    /// Fails with `Conflict` when the quota is exhausted; the counter is
    /// floored at zero and never goes negative.
    async fn consume_one(&self, user_id: UserId, date: NaiveDate) -> AppResult<u32>;
}
