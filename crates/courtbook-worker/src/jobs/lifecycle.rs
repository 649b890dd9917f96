//! Booking completion and reminder pass.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use courtbook_core::result::AppResult;
use courtbook_service::booking::ReservationCoordinator;

use crate::runner::RecurringTask;

/// Moves played-out confirmed bookings to completed and sends
/// upcoming-booking reminders exactly once per booking.
pub struct BookingLifecycleTask {
    coordinator: Arc<ReservationCoordinator>,
    interval: Duration,
}

impl BookingLifecycleTask {
    /// Create the lifecycle task.
    pub fn new(coordinator: Arc<ReservationCoordinator>, interval_seconds: u64) -> Self {
        Self {
            coordinator,
            interval: Duration::from_secs(interval_seconds),
        }
    }
}

#[async_trait]
impl RecurringTask for BookingLifecycleTask {
    fn name(&self) -> &'static str {
        "booking_lifecycle"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn run(&self, now: DateTime<Utc>) -> AppResult<()> {
        let completed = self.coordinator.complete_finished(now).await?;
        let reminded = self.coordinator.send_due_reminders(now).await?;
        debug!(completed, reminded, "Booking lifecycle tick");
        Ok(())
    }
}
