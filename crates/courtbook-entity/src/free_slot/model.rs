//! Per-user daily free-slot counter.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use courtbook_core::types::id::UserId;

/// Remaining complimentary bookings for one user on one day.
///
/// At most one record exists per (user, date). The absence of a record
/// means the full daily limit is still available; the ledger lazily
/// creates the record on first consumption.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreeSlotRecord {
    /// The quota owner.
    pub user_id: UserId,
    /// The calendar day the quota applies to.
    pub date: NaiveDate,
    /// Complimentary bookings left today, floored at zero.
    pub slots_remaining: u32,
}
