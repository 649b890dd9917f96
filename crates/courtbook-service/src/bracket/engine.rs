//! Single-elimination bracket engine.
//!
//! Generation seeds teams uniformly at random (fairness among amateur
//! teams; determinism is deliberately not offered), pads the field with
//! byes, and links rounds through a flat match arena. Propagation is a
//! per-match step over stable arena ids, safe to run incrementally when
//! later results arrive.

use rand::seq::SliceRandom;

use courtbook_core::error::AppError;
use courtbook_core::result::AppResult;
use courtbook_core::types::id::RegistrationId;
use courtbook_entity::bracket::{Bracket, BracketMatch, MatchId};
use courtbook_entity::tournament::BracketSize;

/// Generate a bracket for the given teams.
///
/// `num_spots` must be 8, 16 or 32, and the team count must be at least 2
/// and at most `num_spots`. Round 1 pairs slot `i` with slot
/// `num_spots - 1 - i`; bye pairings auto-complete with the real team as
/// winner and its slot in the next round pre-filled. A bracket with more
/// than two teams and at least two rounds carries a third-place match
/// alongside the final, excluded from forward propagation.
pub fn generate(team_ids: &[RegistrationId], num_spots: u32) -> AppResult<Bracket> {
    BracketSize::from_spots(num_spots)?;

    let team_count = team_ids.len() as u32;
    if team_count < 2 {
        return Err(AppError::validation(
            "A bracket needs at least two registered teams",
        ));
    }
    if team_count > num_spots {
        return Err(AppError::validation(format!(
            "{team_count} teams do not fit in {num_spots} bracket spots"
        )));
    }

    let mut seeded = team_ids.to_vec();
    seeded.shuffle(&mut rand::thread_rng());

    let mut slots: Vec<Option<RegistrationId>> = Vec::with_capacity(num_spots as usize);
    slots.extend(seeded.into_iter().map(Some));
    slots.resize(num_spots as usize, None);

    let total_rounds = num_spots.ilog2();
    let mut bracket = Bracket {
        num_spots,
        matches: Vec::new(),
        rounds: Vec::new(),
        third_place: None,
        generated: false,
    };

    // Round 1: pair the top half against the reversed bottom half.
    let mut number = 0u32;
    let mut round_ids: Vec<MatchId> = Vec::new();
    for i in 0..(num_spots / 2) as usize {
        let team1 = slots[i];
        let team2 = slots[num_spots as usize - 1 - i];
        if team1.is_none() && team2.is_none() {
            return Err(AppError::internal(
                "Bracket seeding paired two byes; the field is too small for the bracket size",
            ));
        }

        number += 1;
        let has_bye = team1.is_none() || team2.is_none();
        let winner = if has_bye { team1.or(team2) } else { None };
        let id = bracket.matches.len();
        bracket.matches.push(BracketMatch {
            id,
            number,
            round: 1,
            index_in_round: i as u32,
            team1,
            team2,
            winner,
            completed: has_bye,
            has_bye,
            is_third_place: false,
        });
        round_ids.push(id);
    }
    bracket.rounds.push(round_ids);

    // Placeholder matches for rounds 2..=total_rounds.
    for round in 2..=total_rounds {
        let count = (num_spots >> round) as usize;
        let mut round_ids = Vec::with_capacity(count);
        for index in 0..count {
            number += 1;
            let id = bracket.matches.len();
            bracket.matches.push(BracketMatch {
                id,
                number,
                round,
                index_in_round: index as u32,
                team1: None,
                team2: None,
                winner: None,
                completed: false,
                has_bye: false,
                is_third_place: false,
            });
            round_ids.push(id);
        }
        bracket.rounds.push(round_ids);
    }

    if team_count > 2 && total_rounds >= 2 {
        number += 1;
        let id = bracket.matches.len();
        let last_round = bracket.rounds.len() - 1;
        let index = bracket.rounds[last_round].len() as u32;
        bracket.matches.push(BracketMatch {
            id,
            number,
            round: total_rounds,
            index_in_round: index,
            team1: None,
            team2: None,
            winner: None,
            completed: false,
            has_bye: false,
            is_third_place: true,
        });
        bracket.rounds[last_round].push(id);
        bracket.third_place = Some(id);
    }

    // One forward pass settles every round-1 bye; nothing deeper can be
    // completed at generation time.
    let completed: Vec<MatchId> = bracket
        .matches
        .iter()
        .filter(|m| m.completed)
        .map(|m| m.id)
        .collect();
    for id in completed {
        propagate(&mut bracket, id)?;
    }

    bracket.generated = true;
    Ok(bracket)
}

/// Apply an externally recorded result and propagate it.
///
/// The match must have both sides decided and not be completed yet; the
/// winner must be one of the two sides. Recording a third-place result is
/// allowed and propagates nowhere.
pub fn record_result(
    bracket: &mut Bracket,
    match_number: u32,
    winner: RegistrationId,
) -> AppResult<()> {
    let m = bracket
        .match_by_number(match_number)
        .ok_or_else(|| AppError::not_found(format!("Match {match_number} not found")))?;
    let id = m.id;

    if m.completed {
        return Err(AppError::conflict(format!(
            "Match {match_number} already has a recorded result"
        )));
    }
    if m.team1.is_none() || m.team2.is_none() {
        return Err(AppError::conflict(format!(
            "Match {match_number} is not ready; both sides must be decided first"
        )));
    }
    if !m.involves(winner) {
        return Err(AppError::validation(format!(
            "Team {winner} does not play in match {match_number}"
        )));
    }

    let m = &mut bracket.matches[id];
    m.winner = Some(winner);
    m.completed = true;
    propagate(bracket, id)
}

/// Push one completed match's outcome into its descendants.
///
/// The winner of the match at in-round index `i` becomes `team1` of the
/// next round's match `i / 2` when `i` is even, `team2` otherwise. A
/// completed semifinal additionally places its loser into the
/// third-place match. No-op for incomplete and third-place matches.
fn propagate(bracket: &mut Bracket, match_id: MatchId) -> AppResult<()> {
    let m = bracket.matches[match_id].clone();
    if !m.completed || m.is_third_place {
        return Ok(());
    }
    let winner = m
        .winner
        .ok_or_else(|| AppError::internal(format!("Completed match {} has no winner", m.number)))?;

    let total_rounds = bracket.round_count();

    if m.round < total_rounds {
        let next_round = bracket.regular_matches_in_round(m.round + 1);
        let child = *next_round
            .get((m.index_in_round / 2) as usize)
            .ok_or_else(|| {
                AppError::internal(format!("Match {} has no descendant slot", m.number))
            })?;
        let child = &mut bracket.matches[child];
        if m.index_in_round % 2 == 0 {
            child.team1 = Some(winner);
        } else {
            child.team2 = Some(winner);
        }
    }

    // Semifinal losers seed the third-place match by semifinal order.
    if m.round + 1 == total_rounds {
        if let Some(third_place) = bracket.third_place {
            if let Some(loser) = m.loser() {
                let third = &mut bracket.matches[third_place];
                if m.index_in_round == 0 {
                    third.team1 = Some(loser);
                } else {
                    third.team2 = Some(loser);
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn teams(n: usize) -> Vec<RegistrationId> {
        (0..n).map(|_| RegistrationId::new()).collect()
    }

    #[test]
    fn test_rejects_invalid_spot_counts() {
        let field = teams(4);
        assert!(generate(&field, 6).is_err());
        assert!(generate(&field, 64).is_err());
    }

    #[test]
    fn test_rejects_too_few_or_too_many_teams() {
        assert!(generate(&teams(1), 8).is_err());
        assert!(generate(&teams(9), 8).is_err());
    }

    #[test]
    fn test_every_team_appears_exactly_once_in_round_one() {
        let field = teams(5);
        let bracket = generate(&field, 8).unwrap();

        let mut seen: Vec<RegistrationId> = bracket
            .regular_matches_in_round(1)
            .into_iter()
            .flat_map(|id| {
                let m = &bracket.matches[id];
                [m.team1, m.team2]
            })
            .flatten()
            .collect();
        seen.sort_by_key(|t| t.0);

        let mut expected = field.clone();
        expected.sort_by_key(|t| t.0);
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_five_teams_in_eight_spots_byes_auto_complete() {
        let bracket = generate(&teams(5), 8).unwrap();

        let round1 = bracket.regular_matches_in_round(1);
        assert_eq!(round1.len(), 4);

        let byes: Vec<_> = round1
            .iter()
            .filter(|&&id| bracket.matches[id].has_bye)
            .collect();
        let regular: Vec<_> = round1
            .iter()
            .filter(|&&id| !bracket.matches[id].has_bye)
            .collect();
        assert_eq!(byes.len(), 3);
        assert_eq!(regular.len(), 1);

        for &&id in &byes {
            let m = &bracket.matches[id];
            assert!(m.completed);
            assert!(m.winner.is_some());
        }
        let open = &bracket.matches[*regular[0]];
        assert!(!open.completed);
        assert!(open.team1.is_some() && open.team2.is_some());
    }

    #[test]
    fn test_bye_winners_are_prefilled_into_round_two() {
        let bracket = generate(&teams(5), 8).unwrap();

        for id in bracket.regular_matches_in_round(1) {
            let m = bracket.matches[id].clone();
            if !m.has_bye {
                continue;
            }
            let winner = m.winner.unwrap();
            let child_id =
                bracket.regular_matches_in_round(2)[(m.index_in_round / 2) as usize];
            let child = &bracket.matches[child_id];
            let slot = if m.index_in_round % 2 == 0 {
                child.team1
            } else {
                child.team2
            };
            assert_eq!(slot, Some(winner));
        }
    }

    #[test]
    fn test_full_field_has_no_byes_and_empty_third_place() {
        let bracket = generate(&teams(8), 8).unwrap();

        let round1 = bracket.regular_matches_in_round(1);
        assert_eq!(round1.len(), 4);
        for id in round1 {
            let m = &bracket.matches[id];
            assert!(!m.has_bye);
            assert!(!m.completed);
            assert!(m.team1.is_some() && m.team2.is_some());
        }

        let third = bracket.third_place.map(|id| &bracket.matches[id]).unwrap();
        assert!(third.team1.is_none() && third.team2.is_none());
        assert!(third.is_third_place);
    }

    #[test]
    fn test_round_structure_and_numbering() {
        let bracket = generate(&teams(16), 16).unwrap();
        assert_eq!(bracket.round_count(), 4);
        assert_eq!(bracket.regular_matches_in_round(1).len(), 8);
        assert_eq!(bracket.regular_matches_in_round(2).len(), 4);
        assert_eq!(bracket.regular_matches_in_round(3).len(), 2);
        assert_eq!(bracket.regular_matches_in_round(4).len(), 1);

        let numbers: Vec<u32> = bracket.matches.iter().map(|m| m.number).collect();
        let expected: Vec<u32> = (1..=16).collect();
        assert_eq!(numbers, expected);
        assert_eq!(bracket.matches.last().unwrap().number, 16);
        assert!(bracket.matches.last().unwrap().is_third_place);
    }

    #[test]
    fn test_recording_results_feeds_final_and_third_place() {
        let field = teams(8);
        let mut bracket = generate(&field, 8).unwrap();

        // Play round 1: team1 wins everywhere.
        for id in bracket.regular_matches_in_round(1) {
            let (number, winner) = {
                let m = &bracket.matches[id];
                (m.number, m.team1.unwrap())
            };
            record_result(&mut bracket, number, winner).unwrap();
        }

        // Play the semifinals: team2 wins both.
        let semis = bracket.regular_matches_in_round(2);
        let mut semi_losers = Vec::new();
        for id in semis {
            let (number, winner, loser) = {
                let m = &bracket.matches[id];
                (m.number, m.team2.unwrap(), m.team1.unwrap())
            };
            record_result(&mut bracket, number, winner).unwrap();
            semi_losers.push(loser);
        }

        let final_id = bracket.regular_matches_in_round(3)[0];
        let final_match = &bracket.matches[final_id];
        assert!(final_match.team1.is_some() && final_match.team2.is_some());

        let third = bracket.third_place.map(|id| &bracket.matches[id]).unwrap();
        assert_eq!(third.team1, Some(semi_losers[0]));
        assert_eq!(third.team2, Some(semi_losers[1]));
    }

    #[test]
    fn test_record_rejects_wrong_team_and_double_record() {
        let mut bracket = generate(&teams(8), 8).unwrap();
        let first = bracket.regular_matches_in_round(1)[0];
        let (number, winner) = {
            let m = &bracket.matches[first];
            (m.number, m.team1.unwrap())
        };

        let outsider = RegistrationId::new();
        assert!(record_result(&mut bracket, number, outsider).is_err());

        record_result(&mut bracket, number, winner).unwrap();
        let err = record_result(&mut bracket, number, winner).unwrap_err();
        assert_eq!(err.kind, courtbook_core::error::ErrorKind::Conflict);
    }

    #[test]
    fn test_record_rejects_unready_match() {
        let mut bracket = generate(&teams(8), 8).unwrap();
        let semi = bracket.regular_matches_in_round(2)[0];
        let number = bracket.matches[semi].number;
        let someone = RegistrationId::new();

        let err = record_result(&mut bracket, number, someone).unwrap_err();
        assert_eq!(err.kind, courtbook_core::error::ErrorKind::Conflict);
    }

    #[test]
    fn test_two_byes_pairing_is_an_internal_error() {
        // Two teams in an eight-spot bracket leave the middle pairings
        // entirely to byes.
        let err = generate(&teams(2), 8).unwrap_err();
        assert_eq!(err.kind, courtbook_core::error::ErrorKind::Internal);
    }
}
