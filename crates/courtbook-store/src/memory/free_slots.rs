//! In-memory free-slot ledger.

use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;

use courtbook_core::error::AppError;
use courtbook_core::result::AppResult;
use courtbook_core::types::id::UserId;

use crate::traits::FreeSlotLedger;

/// In-memory [`FreeSlotLedger`].
///
/// Counters are keyed per (user, day); the dashmap entry API makes the
/// lazy-initialize-then-decrement a single atomic step per key, so two
/// concurrent bookings cannot both spend the last slot.
pub struct MemoryFreeSlotLedger {
    daily_limit: u32,
    records: DashMap<(UserId, NaiveDate), u32>,
}

impl MemoryFreeSlotLedger {
    /// Create an empty ledger with the given daily limit.
    pub fn new(daily_limit: u32) -> Self {
        Self {
            daily_limit,
            records: DashMap::new(),
        }
    }
}

#[async_trait]
impl FreeSlotLedger for MemoryFreeSlotLedger {
    async fn remaining(&self, user_id: UserId, date: NaiveDate) -> AppResult<u32> {
        Ok(self
            .records
            .get(&(user_id, date))
            .map_or(self.daily_limit, |r| *r))
    }

    async fn consume_one(&self, user_id: UserId, date: NaiveDate) -> AppResult<u32> {
        let mut entry = self
            .records
            .entry((user_id, date))
            .or_insert(self.daily_limit);
        if *entry == 0 {
            return Err(AppError::conflict(format!(
                "No free bookings left for {date}"
            )));
        }
        *entry -= 1;
        Ok(*entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    #[tokio::test]
    async fn test_absent_record_reads_full_limit() {
        let ledger = MemoryFreeSlotLedger::new(2);
        assert_eq!(ledger.remaining(UserId::new(), day()).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_consume_decrements_to_zero_then_conflicts() {
        let ledger = MemoryFreeSlotLedger::new(2);
        let user = UserId::new();

        assert_eq!(ledger.consume_one(user, day()).await.unwrap(), 1);
        assert_eq!(ledger.consume_one(user, day()).await.unwrap(), 0);

        let err = ledger.consume_one(user, day()).await.unwrap_err();
        assert_eq!(err.kind, courtbook_core::error::ErrorKind::Conflict);
        assert_eq!(ledger.remaining(user, day()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_quota_is_per_day() {
        let ledger = MemoryFreeSlotLedger::new(1);
        let user = UserId::new();
        let other_day = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();

        ledger.consume_one(user, day()).await.unwrap();
        assert_eq!(ledger.remaining(user, other_day).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_consumers_cannot_overspend() {
        use std::sync::Arc;

        let ledger = Arc::new(MemoryFreeSlotLedger::new(2));
        let user = UserId::new();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let ledger = Arc::clone(&ledger);
            handles.push(tokio::spawn(
                async move { ledger.consume_one(user, day()).await },
            ));
        }

        let mut successes = 0;
        for handle in handles {
            if handle.await.expect("task panicked").is_ok() {
                successes += 1;
            }
        }
        assert_eq!(successes, 2);
        assert_eq!(ledger.remaining(user, day()).await.unwrap(), 0);
    }
}
