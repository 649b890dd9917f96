//! Single-elimination bracket model.
//!
//! Matches live in a flat arena addressed by stable [`MatchId`] indices;
//! rounds hold ordered id lists into the arena. Propagation and result
//! recording are implemented in the service-layer bracket engine and
//! operate on these ids, never on nested structures.

use serde::{Deserialize, Serialize};

use courtbook_core::types::id::RegistrationId;

/// Stable arena index of a match within its bracket.
pub type MatchId = usize;

/// One match in the bracket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BracketMatch {
    /// Arena index of this match.
    pub id: MatchId,
    /// Global 1-based match number, monotonic by round.
    pub number: u32,
    /// 1-based round the match belongs to.
    pub round: u32,
    /// Position of the match within its round.
    pub index_in_round: u32,
    /// First side; `None` is an undecided feed or a bye slot.
    pub team1: Option<RegistrationId>,
    /// Second side; `None` is an undecided feed or a bye slot.
    pub team2: Option<RegistrationId>,
    /// The winning registration, once decided.
    pub winner: Option<RegistrationId>,
    /// Whether the result is final.
    pub completed: bool,
    /// Whether one side was a bye (auto-completed at creation).
    pub has_bye: bool,
    /// Whether this is the third-place match, excluded from forward
    /// winner propagation.
    pub is_third_place: bool,
}

impl BracketMatch {
    /// The side that lost, if the match is decided between two real teams.
    ///
    /// Returns `None` for byes and undecided matches.
    pub fn loser(&self) -> Option<RegistrationId> {
        let winner = self.winner?;
        match (self.team1, self.team2) {
            (Some(a), Some(b)) if a == winner => Some(b),
            (Some(a), Some(b)) if b == winner => Some(a),
            _ => None,
        }
    }

    /// Whether `team` plays in this match.
    pub fn involves(&self, team: RegistrationId) -> bool {
        self.team1 == Some(team) || self.team2 == Some(team)
    }
}

/// A generated single-elimination bracket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bracket {
    /// Bracket capacity (8, 16 or 32).
    pub num_spots: u32,
    /// Match arena; `MatchId` indexes into this vector.
    pub matches: Vec<BracketMatch>,
    /// Ordered match ids per round, round 1 first. The third-place match,
    /// when present, is the last entry of the final round.
    pub rounds: Vec<Vec<MatchId>>,
    /// The designated third-place match, if the bracket has one.
    pub third_place: Option<MatchId>,
    /// Whether generation finished.
    pub generated: bool,
}

impl Bracket {
    /// Number of rounds, the third-place match not counting extra.
    pub fn round_count(&self) -> u32 {
        self.rounds.len() as u32
    }

    /// Look up a match by its global number.
    pub fn match_by_number(&self, number: u32) -> Option<&BracketMatch> {
        self.matches.iter().find(|m| m.number == number)
    }

    /// Ids of the non-third-place matches in the given 1-based round.
    pub fn regular_matches_in_round(&self, round: u32) -> Vec<MatchId> {
        self.rounds
            .get((round as usize).saturating_sub(1))
            .map(|ids| {
                ids.iter()
                    .copied()
                    .filter(|&id| !self.matches[id].is_third_place)
                    .collect()
            })
            .unwrap_or_default()
    }
}
