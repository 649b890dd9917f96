//! Time-driven tournament status derivation.

use chrono::{DateTime, Utc};

use courtbook_entity::tournament::TournamentStatus;

/// Derive a tournament's status from the clock and registration count.
///
/// Pure function of its inputs. `CancelledLowTeams` is sticky: once a
/// tournament is cancelled for low turnout it never reverts, whatever
/// the other inputs say.
pub fn derive_status(
    now: DateTime<Utc>,
    registration_deadline: DateTime<Utc>,
    start_at: DateTime<Utc>,
    end_at: DateTime<Utc>,
    registered_teams: u32,
    min_teams: u32,
    current: TournamentStatus,
) -> TournamentStatus {
    if current.is_sticky() {
        return current;
    }
    if now > registration_deadline && registered_teams < min_teams {
        return TournamentStatus::CancelledLowTeams;
    }
    if now > end_at {
        return TournamentStatus::Completed;
    }
    if now >= start_at {
        return TournamentStatus::Ongoing;
    }
    TournamentStatus::Upcoming
}
