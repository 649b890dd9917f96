//! Reservation expiry sweep.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use courtbook_core::result::AppResult;
use courtbook_service::booking::ReservationCoordinator;

use crate::runner::RecurringTask;

/// Releases lapsed unpaid reservations (bookings and registrations).
///
/// Stands in for a storage-level TTL index: any record whose expiry
/// timestamp has passed without payment is cancelled/withdrawn. Paid
/// records cleared their timestamp when payment confirmed, so the sweep
/// can never touch them.
pub struct ExpirySweepTask {
    coordinator: Arc<ReservationCoordinator>,
    interval: Duration,
}

impl ExpirySweepTask {
    /// Create the sweep task.
    pub fn new(coordinator: Arc<ReservationCoordinator>, interval_seconds: u64) -> Self {
        Self {
            coordinator,
            interval: Duration::from_secs(interval_seconds),
        }
    }
}

#[async_trait]
impl RecurringTask for ExpirySweepTask {
    fn name(&self) -> &'static str {
        "reservation_expiry_sweep"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn run(&self, now: DateTime<Utc>) -> AppResult<()> {
        let summary = self.coordinator.expire_due(now).await?;
        debug!(
            bookings = summary.bookings,
            registrations = summary.registrations,
            "Expiry sweep tick"
        );
        Ok(())
    }
}
