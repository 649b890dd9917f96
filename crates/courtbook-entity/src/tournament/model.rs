//! Tournament entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use courtbook_core::types::id::{TournamentId, UserId};
use courtbook_core::{AppError, AppResult};

use crate::bracket::Bracket;

use super::status::TournamentStatus;

/// Allowed single-elimination bracket sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BracketSize {
    /// Eight spots (three rounds).
    Eight,
    /// Sixteen spots (four rounds).
    Sixteen,
    /// Thirty-two spots (five rounds).
    ThirtyTwo,
}

impl BracketSize {
    /// The number of bracket spots.
    pub fn spots(&self) -> u32 {
        match self {
            Self::Eight => 8,
            Self::Sixteen => 16,
            Self::ThirtyTwo => 32,
        }
    }

    /// Parse a spot count into a bracket size.
    pub fn from_spots(spots: u32) -> AppResult<Self> {
        match spots {
            8 => Ok(Self::Eight),
            16 => Ok(Self::Sixteen),
            32 => Ok(Self::ThirtyTwo),
            other => Err(AppError::validation(format!(
                "Invalid bracket size {other}, expected 8, 16 or 32"
            ))),
        }
    }
}

impl std::fmt::Display for BracketSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.spots())
    }
}

/// A single-elimination tournament.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tournament {
    /// Unique tournament identifier.
    pub id: TournamentId,
    /// The admin who organizes the tournament and receives
    /// transition notifications.
    pub organizer_id: UserId,
    /// Display name.
    pub name: String,
    /// When play starts.
    pub start_at: DateTime<Utc>,
    /// When play ends.
    pub end_at: DateTime<Utc>,
    /// Registration cutoff.
    pub registration_deadline: DateTime<Utc>,
    /// Minimum teams required to run the tournament.
    pub min_teams: u32,
    /// Bracket capacity.
    pub bracket_size: BracketSize,
    /// Players per team.
    pub team_size: u32,
    /// Registration fee in whole currency units.
    pub registration_fee: i64,
    /// Current derived status.
    pub status: TournamentStatus,
    /// Count of active (paid or fee-free) registrations.
    pub registered_teams: u32,
    /// The generated bracket, once one exists.
    pub bracket: Option<Bracket>,
    /// When the tournament was created.
    pub created_at: DateTime<Utc>,
    /// When the tournament was last modified.
    pub updated_at: DateTime<Utc>,
}

impl Tournament {
    /// Whether registration is currently possible at `now`.
    pub fn registration_open(&self, now: DateTime<Utc>) -> bool {
        now <= self.registration_deadline
            && self.status == TournamentStatus::Upcoming
            && self.registered_teams < self.bracket_size.spots()
    }
}
