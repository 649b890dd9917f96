//! Recording notification port for tests and local inspection.

use async_trait::async_trait;
use tokio::sync::Mutex;

use courtbook_core::result::AppResult;
use courtbook_core::traits::notifier::{NotificationCategory, NotificationPort, Notice};

/// Notification port that records every notice it receives.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// All notices received so far, in dispatch order.
    pub async fn sent(&self) -> Vec<Notice> {
        self.notices.lock().await.clone()
    }

    /// Notices of one category, in dispatch order.
    pub async fn sent_in_category(&self, category: NotificationCategory) -> Vec<Notice> {
        self.notices
            .lock()
            .await
            .iter()
            .filter(|n| n.category == category)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl NotificationPort for RecordingNotifier {
    async fn notify(&self, notice: Notice) -> AppResult<()> {
        self.notices.lock().await.push(notice);
        Ok(())
    }
}
