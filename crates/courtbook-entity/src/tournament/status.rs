//! Tournament status enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a tournament.
///
/// The status is derived from the clock and registration count; see the
/// status clock in the service crate. `CancelledLowTeams` is sticky: once
/// reached it never reverts, even if the derivation would say otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    /// Registration is open or the start time has not been reached.
    Upcoming,
    /// The tournament is being played.
    Ongoing,
    /// The tournament finished.
    Completed,
    /// Cancelled because too few teams registered by the deadline.
    CancelledLowTeams,
}

impl TournamentStatus {
    /// Whether this status never changes again.
    pub fn is_sticky(&self) -> bool {
        matches!(self, Self::CancelledLowTeams)
    }

    /// Return the status as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Ongoing => "ongoing",
            Self::Completed => "completed",
            Self::CancelledLowTeams => "cancelled_low_teams",
        }
    }
}

impl fmt::Display for TournamentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
