//! Booking status enumerations and the legal transition table.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a booking.
///
/// Transitions are validated through [`BookingStatus::can_transition_to`]
/// at the store layer rather than by ad hoc checks in handlers, so an
/// illegal move is rejected at the single point of mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Created, awaiting payment completion. Subject to expiry.
    Pending,
    /// Settled; the slot is held.
    Confirmed,
    /// Terminal: cancelled by a user, the sweep, or a failed payment.
    Cancelled,
    /// Terminal: the booked time has passed on a confirmed booking.
    Completed,
}

impl BookingStatus {
    /// Whether the booking still occupies its slot.
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Cancelled)
    }

    /// Whether this status permits no further transition.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Completed)
    }

    /// The legal transition table.
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Confirmed)
                | (Self::Pending, Self::Cancelled)
                | (Self::Confirmed, Self::Cancelled)
                | (Self::Confirmed, Self::Completed)
        )
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = courtbook_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" => Ok(Self::Cancelled),
            "completed" => Ok(Self::Completed),
            _ => Err(courtbook_core::AppError::validation(format!(
                "Invalid booking status: '{s}'"
            ))),
        }
    }
}

/// Settlement state of the money side of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Awaiting gateway completion.
    Pending,
    /// Settled through the gateway or points.
    Paid,
    /// Refunded by the gateway.
    Refunded,
    /// Payment failed or was rejected.
    Failed,
    /// No payment is owed up front (offline / free bookings).
    Unpaid,
}

impl PaymentStatus {
    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Refunded => "refunded",
            Self::Failed => "failed",
            Self::Unpaid => "unpaid",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The settlement path a booking was created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Pay at the venue.
    Offline,
    /// External payment gateway.
    Gateway,
    /// Loyalty point redemption.
    Points,
    /// Complimentary daily quota.
    Free,
}

impl PaymentMethod {
    /// Return the method as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Offline => "offline",
            Self::Gateway => "gateway",
            Self::Points => "points",
            Self::Free => "free",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The pricing tier a booking's price was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PriceType {
    /// Standard hourly rate.
    Regular,
    /// Peak-hours rate.
    Peak,
    /// Off-peak discounted rate.
    OffPeak,
    /// Complimentary booking.
    Free,
}

impl PriceType {
    /// Return the tier as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Peak => "peak",
            Self::OffPeak => "offPeak",
            Self::Free => "free",
        }
    }
}

impl fmt::Display for PriceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_transitions() {
        assert!(BookingStatus::Pending.can_transition_to(BookingStatus::Confirmed));
        assert!(BookingStatus::Pending.can_transition_to(BookingStatus::Cancelled));
        assert!(!BookingStatus::Pending.can_transition_to(BookingStatus::Completed));
    }

    #[test]
    fn test_terminal_states_reject_everything() {
        for next in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Cancelled,
            BookingStatus::Completed,
        ] {
            assert!(!BookingStatus::Cancelled.can_transition_to(next));
            assert!(!BookingStatus::Completed.can_transition_to(next));
        }
    }

    #[test]
    fn test_cancelled_is_not_active() {
        assert!(!BookingStatus::Cancelled.is_active());
        assert!(BookingStatus::Pending.is_active());
        assert!(BookingStatus::Confirmed.is_active());
        assert!(BookingStatus::Completed.is_active());
    }
}
