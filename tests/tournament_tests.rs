//! Tournament registration, status clock, and bracket lifecycle.

mod common;

use common::*;

use chrono::{Duration, Utc};

use courtbook_core::error::ErrorKind;
use courtbook_core::traits::notifier::NotificationCategory;
use courtbook_entity::tournament::{RegistrationStatus, TournamentStatus};
use courtbook_service::booking::ReconcileDisposition;
use courtbook_service::tournament::RegisterTeamRequest;
use courtbook_store::{RegistrationStore, TournamentStore};

fn team(tournament_id: courtbook_core::types::id::TournamentId, name: &str) -> RegisterTeamRequest {
    RegisterTeamRequest {
        tournament_id,
        team_name: name.to_string(),
        players: vec!["p1".to_string(), "p2".to_string()],
    }
}

#[tokio::test]
async fn test_fee_free_registration_activates_immediately() {
    let env = TestEnv::new();
    let tournament = env.add_tournament(0, 2).await;

    let registered = env
        .tournament_service
        .register_team(&player(), team(tournament.id, "Lions"))
        .await
        .unwrap();

    assert_eq!(registered.registration.status, RegistrationStatus::Active);
    assert!(registered.payment_url.is_none());

    let stored = env.tournaments.get(tournament.id).await.unwrap().unwrap();
    assert_eq!(stored.registered_teams, 1);
}

#[tokio::test]
async fn test_duplicate_team_name_is_rejected() {
    let env = TestEnv::new();
    let tournament = env.add_tournament(0, 2).await;

    env.tournament_service
        .register_team(&player(), team(tournament.id, "Lions"))
        .await
        .unwrap();

    let err = env
        .tournament_service
        .register_team(&player(), team(tournament.id, "Lions"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
}

#[tokio::test]
async fn test_fee_registration_settles_through_the_gateway_once() {
    let env = TestEnv::new();
    let tournament = env.add_tournament(500, 2).await;

    let registered = env
        .tournament_service
        .register_team(&player(), team(tournament.id, "Tigers"))
        .await
        .unwrap();
    assert_eq!(
        registered.registration.status,
        RegistrationStatus::PendingPayment
    );
    let pidx = registered.registration.gateway_ref.clone().unwrap();

    // The counter only moves when payment settles.
    assert_eq!(
        env.tournaments
            .get(tournament.id)
            .await
            .unwrap()
            .unwrap()
            .registered_teams,
        0
    );

    env.gateway.complete(&pidx).await;
    let first = env.coordinator.verify_and_reconcile(&pidx).await.unwrap();
    let second = env.coordinator.verify_and_reconcile(&pidx).await.unwrap();
    assert_eq!(first.disposition, ReconcileDisposition::Confirmed);
    assert_eq!(second.disposition, ReconcileDisposition::AlreadyConfirmed);

    let stored = env
        .registrations
        .get(registered.registration.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, RegistrationStatus::Active);
    assert!(stored.reservation_expires_at.is_none());

    // Duplicate callbacks increment the team counter exactly once.
    let stored_tournament = env.tournaments.get(tournament.id).await.unwrap().unwrap();
    assert_eq!(stored_tournament.registered_teams, 1);
}

#[tokio::test]
async fn test_registration_amount_mismatch_withdraws_the_team() {
    let env = TestEnv::new();
    let tournament = env.add_tournament(600, 2).await;

    let registered = env
        .tournament_service
        .register_team(&player(), team(tournament.id, "Wolves"))
        .await
        .unwrap();
    let pidx = registered.registration.gateway_ref.clone().unwrap();

    // Expected 60000 minor units; the gateway reports 50000.
    env.gateway.complete_with_amount(&pidx, 50_000).await;
    let err = env.coordinator.verify_and_reconcile(&pidx).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::AmountMismatch);

    let stored = env
        .registrations
        .get(registered.registration.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, RegistrationStatus::Withdrawn);
    assert_eq!(
        env.tournaments
            .get(tournament.id)
            .await
            .unwrap()
            .unwrap()
            .registered_teams,
        0
    );
}

#[tokio::test]
async fn test_registration_closes_at_the_deadline() {
    let env = TestEnv::new();
    let mut tournament = env.add_tournament(0, 2).await;
    tournament.registration_deadline = Utc::now() - Duration::minutes(1);
    env.tournaments.insert(tournament.clone()).await.unwrap();

    let err = env
        .tournament_service
        .register_team(&player(), team(tournament.id, "Latecomers"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
}

#[tokio::test]
async fn test_registration_closes_when_the_bracket_is_full() {
    let env = TestEnv::new();
    let tournament = env.add_tournament(0, 2).await;

    for i in 0..8 {
        env.tournament_service
            .register_team(&player(), team(tournament.id, &format!("Team {i}")))
            .await
            .unwrap();
    }

    let err = env
        .tournament_service
        .register_team(&player(), team(tournament.id, "Ninth"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
}

#[tokio::test]
async fn test_transition_to_ongoing_notifies_exactly_once() {
    let env = TestEnv::new();
    let tournament = env.add_tournament(0, 2).await;
    env.tournament_service
        .register_team(&player(), team(tournament.id, "Alpha"))
        .await
        .unwrap();
    env.tournament_service
        .register_team(&player(), team(tournament.id, "Beta"))
        .await
        .unwrap();

    let during_play = tournament.start_at + Duration::minutes(5);
    let first = env
        .tournament_service
        .evaluate_statuses(during_play)
        .await
        .unwrap();
    let second = env
        .tournament_service
        .evaluate_statuses(during_play)
        .await
        .unwrap();
    assert_eq!(first, 1);
    assert_eq!(second, 0);

    let stored = env.tournaments.get(tournament.id).await.unwrap().unwrap();
    assert_eq!(stored.status, TournamentStatus::Ongoing);

    // Two participants plus the organizer, notified once each.
    let updates = env
        .notifier
        .sent_in_category(NotificationCategory::TournamentStatus)
        .await;
    assert_eq!(updates.len(), 3);
    assert!(updates.iter().any(|n| n.user_id == tournament.organizer_id));
}

#[tokio::test]
async fn test_low_turnout_cancels_and_stays_cancelled() {
    let env = TestEnv::new();
    let tournament = env.add_tournament(0, 4).await;
    env.tournament_service
        .register_team(&player(), team(tournament.id, "Only Team"))
        .await
        .unwrap();

    let past_deadline = tournament.registration_deadline + Duration::minutes(5);
    env.tournament_service
        .evaluate_statuses(past_deadline)
        .await
        .unwrap();

    let stored = env.tournaments.get(tournament.id).await.unwrap().unwrap();
    assert_eq!(stored.status, TournamentStatus::CancelledLowTeams);

    // The cancelled status is sticky even after the scheduled end.
    let long_after = tournament.end_at + Duration::hours(1);
    env.tournament_service
        .evaluate_statuses(long_after)
        .await
        .unwrap();
    let stored = env.tournaments.get(tournament.id).await.unwrap().unwrap();
    assert_eq!(stored.status, TournamentStatus::CancelledLowTeams);
}

#[tokio::test]
async fn test_bracket_generates_once_after_the_deadline() {
    let env = TestEnv::new();
    let tournament = env.add_tournament(0, 2).await;
    for i in 0..5 {
        env.tournament_service
            .register_team(&player(), team(tournament.id, &format!("Team {i}")))
            .await
            .unwrap();
    }

    let past_deadline = tournament.registration_deadline + Duration::minutes(5);
    env.tournament_service
        .evaluate_statuses(past_deadline)
        .await
        .unwrap();

    let stored = env.tournaments.get(tournament.id).await.unwrap().unwrap();
    let bracket = stored.bracket.expect("bracket generated");
    assert!(bracket.generated);
    assert_eq!(bracket.num_spots, 8);
    assert_eq!(bracket.regular_matches_in_round(1).len(), 4);

    // Every active team received a bracket notice; re-evaluation does
    // not regenerate or re-notify.
    let notices = env
        .notifier
        .sent_in_category(NotificationCategory::BracketReady)
        .await;
    assert_eq!(notices.len(), 5);

    env.tournament_service
        .evaluate_statuses(past_deadline + Duration::minutes(5))
        .await
        .unwrap();
    assert_eq!(
        env.notifier
            .sent_in_category(NotificationCategory::BracketReady)
            .await
            .len(),
        5
    );
}

#[tokio::test]
async fn test_bracket_fetch_generates_on_demand() {
    let env = TestEnv::new();
    let tournament = env.add_tournament(0, 2).await;

    env.tournament_service
        .register_team(&player(), team(tournament.id, "Alpha"))
        .await
        .unwrap();
    env.tournament_service
        .register_team(&player(), team(tournament.id, "Beta"))
        .await
        .unwrap();
    env.tournament_service
        .register_team(&player(), team(tournament.id, "Gamma"))
        .await
        .unwrap();

    // Close the registration window, then fetch.
    let mut closed = env.tournaments.get(tournament.id).await.unwrap().unwrap();
    closed.registration_deadline = Utc::now() - Duration::minutes(1);
    env.tournaments.insert(closed).await.unwrap();

    let bracket = env
        .tournament_service
        .bracket(tournament.id)
        .await
        .unwrap()
        .expect("bracket generated on demand");
    assert_eq!(bracket.num_spots, 8);
}

#[tokio::test]
async fn test_result_recording_requires_staff_and_updates_the_bracket() {
    let env = TestEnv::new();
    let tournament = env.add_tournament(0, 2).await;
    for i in 0..4 {
        env.tournament_service
            .register_team(&player(), team(tournament.id, &format!("Team {i}")))
            .await
            .unwrap();
    }

    let past_deadline = tournament.registration_deadline + Duration::minutes(5);
    env.tournament_service
        .evaluate_statuses(past_deadline)
        .await
        .unwrap();

    let stored = env.tournaments.get(tournament.id).await.unwrap().unwrap();
    let bracket = stored.bracket.unwrap();
    let first_id = bracket.regular_matches_in_round(1)[0];
    let first = &bracket.matches[first_id];
    let winner = first.team1.or(first.team2).unwrap();

    let err = env
        .tournament_service
        .record_match_result(&player(), tournament.id, first.number, winner)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);

    // 4 teams in 8 spots resolve round 1 entirely through byes, so the
    // first open matches are the semifinals.
    let semi = bracket
        .regular_matches_in_round(2)
        .into_iter()
        .map(|id| bracket.matches[id].clone())
        .find(|m| !m.completed)
        .expect("semifinals are open");
    let winner = semi.team1.unwrap();

    let updated = env
        .tournament_service
        .record_match_result(&staff(), tournament.id, semi.number, winner)
        .await
        .unwrap();
    let recorded = updated.match_by_number(semi.number).unwrap();
    assert!(recorded.completed);
    assert_eq!(recorded.winner, Some(winner));

    // The semifinal loser seeded the third-place match.
    let third = updated
        .third_place
        .map(|id| updated.matches[id].clone())
        .unwrap();
    assert_eq!(third.team1, Some(semi.team2.unwrap()));
}
