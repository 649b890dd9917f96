//! In-memory loyalty ledger.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use courtbook_core::error::AppError;
use courtbook_core::result::AppResult;
use courtbook_core::types::id::{BookingId, TransactionId, UserId};
use courtbook_entity::loyalty::{LoyaltyTransaction, TransactionKind};

use crate::traits::LoyaltyLedger;

#[derive(Default)]
struct Account {
    balance: i64,
    log: Vec<LoyaltyTransaction>,
}

/// In-memory [`LoyaltyLedger`].
///
/// All accounts live under one mutex; every credit or debit appends to
/// the log and adjusts the balance while holding it, so the balance is
/// always the signed sum of the committed log.
#[derive(Default)]
pub struct MemoryLoyaltyLedger {
    accounts: Mutex<HashMap<UserId, Account>>,
}

impl MemoryLoyaltyLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    fn transaction(
        user_id: UserId,
        kind: TransactionKind,
        points: i64,
        reason: &str,
        related_booking_id: Option<BookingId>,
    ) -> LoyaltyTransaction {
        LoyaltyTransaction {
            id: TransactionId::new(),
            user_id,
            kind,
            points,
            reason: reason.to_string(),
            related_booking_id,
            created_at: Utc::now(),
        }
    }
}

#[async_trait]
impl LoyaltyLedger for MemoryLoyaltyLedger {
    async fn balance(&self, user_id: UserId) -> AppResult<i64> {
        let accounts = self.accounts.lock().await;
        Ok(accounts.get(&user_id).map_or(0, |a| a.balance))
    }

    async fn credit(
        &self,
        user_id: UserId,
        points: i64,
        reason: &str,
        related_booking_id: Option<BookingId>,
    ) -> AppResult<LoyaltyTransaction> {
        if points <= 0 {
            return Err(AppError::validation("Credit amount must be positive"));
        }
        let mut accounts = self.accounts.lock().await;
        let account = accounts.entry(user_id).or_default();
        let txn = Self::transaction(
            user_id,
            TransactionKind::Credit,
            points,
            reason,
            related_booking_id,
        );
        account.balance += points;
        account.log.push(txn.clone());
        Ok(txn)
    }

    async fn debit(
        &self,
        user_id: UserId,
        points: i64,
        reason: &str,
        related_booking_id: Option<BookingId>,
    ) -> AppResult<LoyaltyTransaction> {
        if points <= 0 {
            return Err(AppError::validation("Debit amount must be positive"));
        }
        let mut accounts = self.accounts.lock().await;
        let account = accounts.entry(user_id).or_default();
        if account.balance < points {
            return Err(AppError::insufficient_points(format!(
                "Balance {} is below the required {} points",
                account.balance, points
            )));
        }
        let txn = Self::transaction(
            user_id,
            TransactionKind::Debit,
            points,
            reason,
            related_booking_id,
        );
        account.balance -= points;
        account.log.push(txn.clone());
        Ok(txn)
    }

    async fn transactions(&self, user_id: UserId) -> AppResult<Vec<LoyaltyTransaction>> {
        let accounts = self.accounts.lock().await;
        Ok(accounts.get(&user_id).map_or_else(Vec::new, |a| a.log.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_balance_equals_signed_sum_of_log() {
        let ledger = MemoryLoyaltyLedger::new();
        let user = UserId::new();

        ledger.credit(user, 100, "signup bonus", None).await.unwrap();
        ledger.debit(user, 30, "redemption", None).await.unwrap();
        ledger.credit(user, 15, "booking reward", None).await.unwrap();

        let log = ledger.transactions(user).await.unwrap();
        let sum: i64 = log
            .iter()
            .map(|t| match t.kind {
                TransactionKind::Credit => t.points,
                TransactionKind::Debit => -t.points,
            })
            .sum();
        assert_eq!(ledger.balance(user).await.unwrap(), sum);
        assert_eq!(sum, 85);
    }

    #[tokio::test]
    async fn test_failed_debit_mutates_nothing() {
        let ledger = MemoryLoyaltyLedger::new();
        let user = UserId::new();
        ledger.credit(user, 20, "signup bonus", None).await.unwrap();

        let err = ledger.debit(user, 50, "redemption", None).await.unwrap_err();
        assert_eq!(err.kind, courtbook_core::error::ErrorKind::InsufficientPoints);

        assert_eq!(ledger.balance(user).await.unwrap(), 20);
        assert_eq!(ledger.transactions(user).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_account_reads_zero() {
        let ledger = MemoryLoyaltyLedger::new();
        assert_eq!(ledger.balance(UserId::new()).await.unwrap(), 0);
    }
}
