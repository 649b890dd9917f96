//! Tracing-backed notification port.

use async_trait::async_trait;
use tracing::info;

use courtbook_core::result::AppResult;
use courtbook_core::traits::notifier::{NotificationPort, Notice};

/// Notification port that writes every notice to the log.
///
/// Stands in for the real delivery integration (push/email), which is an
/// external collaborator of this core.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

impl LogNotifier {
    /// Create a new log notifier.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationPort for LogNotifier {
    async fn notify(&self, notice: Notice) -> AppResult<()> {
        info!(
            user_id = %notice.user_id,
            category = %notice.category,
            title = %notice.title,
            "Notification dispatched"
        );
        Ok(())
    }
}
