//! Notification port.
//!
//! One-way, fire-and-forget interface to the delivery layer (push, email,
//! in-app — not this crate's concern). Dispatch failures are logged by the
//! caller and never block or roll back the operation that emitted them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;
use crate::types::id::UserId;

/// Category of a notification for client-side filtering and routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationCategory {
    /// A booking was confirmed.
    BookingConfirmed,
    /// A booking was cancelled or expired.
    BookingCancelled,
    /// An upcoming booking reminder.
    BookingReminder,
    /// A payment settled successfully.
    PaymentSuccess,
    /// A payment failed or was rejected.
    PaymentFailed,
    /// A tournament registration changed state.
    TournamentRegistration,
    /// A tournament status transition.
    TournamentStatus,
    /// A tournament bracket became available.
    BracketReady,
}

impl NotificationCategory {
    /// Return the category as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BookingConfirmed => "booking_confirmed",
            Self::BookingCancelled => "booking_cancelled",
            Self::BookingReminder => "booking_reminder",
            Self::PaymentSuccess => "payment_success",
            Self::PaymentFailed => "payment_failed",
            Self::TournamentRegistration => "tournament_registration",
            Self::TournamentStatus => "tournament_status",
            Self::BracketReady => "bracket_ready",
        }
    }
}

impl std::fmt::Display for NotificationCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A notification to be delivered to a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notice {
    /// The recipient user.
    pub user_id: UserId,
    /// Notification title.
    pub title: String,
    /// Notification body text.
    pub body: String,
    /// Category for filtering and routing.
    pub category: NotificationCategory,
    /// Optional deep link into the client application.
    pub deep_link: Option<String>,
}

/// Trait for the one-way notification delivery port.
#[async_trait]
pub trait NotificationPort: Send + Sync + 'static {
    /// Dispatch a notification. Best-effort; an error is a delivery
    /// failure the caller logs and otherwise ignores.
    async fn notify(&self, notice: Notice) -> AppResult<()>;
}
