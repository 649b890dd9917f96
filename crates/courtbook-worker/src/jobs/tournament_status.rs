//! Tournament status evaluation tick.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use courtbook_core::result::AppResult;
use courtbook_service::tournament::TournamentService;

use crate::runner::RecurringTask;

/// Re-derives every tournament's status from the clock, firing
/// transition notifications exactly once and triggering bracket
/// generation when a deadline passes with enough teams.
pub struct TournamentStatusTask {
    service: Arc<TournamentService>,
    interval: Duration,
}

impl TournamentStatusTask {
    /// Create the status evaluation task.
    pub fn new(service: Arc<TournamentService>, interval_seconds: u64) -> Self {
        Self {
            service,
            interval: Duration::from_secs(interval_seconds),
        }
    }
}

#[async_trait]
impl RecurringTask for TournamentStatusTask {
    fn name(&self) -> &'static str {
        "tournament_status"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn run(&self, now: DateTime<Utc>) -> AppResult<()> {
        let transitions = self.service.evaluate_statuses(now).await?;
        debug!(transitions, "Tournament status tick");
        Ok(())
    }
}
