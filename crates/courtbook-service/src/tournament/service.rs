//! Tournament registration, status evaluation, and result recording.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use courtbook_core::config::booking::BookingConfig;
use courtbook_core::config::gateway::GatewayConfig;
use courtbook_core::error::AppError;
use courtbook_core::result::AppResult;
use courtbook_core::traits::gateway::{InitiateRequest, PaymentGateway};
use courtbook_core::traits::notifier::{NotificationCategory, NotificationPort, Notice};
use courtbook_core::types::id::{RegistrationId, TournamentId, UserId};
use courtbook_entity::booking::PaymentStatus;
use courtbook_entity::bracket::Bracket;
use courtbook_entity::tournament::{
    NewRegistration, RegistrationStatus, Tournament, TournamentRegistration, TournamentStatus,
};
use courtbook_store::{RegistrationStore, TournamentStore};

use crate::bracket as bracket_engine;
use crate::context::RequestContext;
use crate::tournament::clock;

/// Request to register a team.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterTeamRequest {
    /// The tournament to enter.
    pub tournament_id: TournamentId,
    /// Team display name, unique within the tournament.
    pub team_name: String,
    /// Player roster.
    pub players: Vec<String>,
}

/// A successfully created registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisteredTeam {
    /// The committed registration record.
    pub registration: TournamentRegistration,
    /// Gateway redirect URL when the fee requires payment.
    pub payment_url: Option<String>,
}

/// Tournament lifecycle service.
///
/// Owns registration entry, the time-driven status evaluation the worker
/// schedules, bracket generation once the deadline passes, and
/// admin-side match result recording.
pub struct TournamentService {
    tournaments: Arc<dyn TournamentStore>,
    registrations: Arc<dyn RegistrationStore>,
    gateway: Arc<dyn PaymentGateway>,
    notifier: Arc<dyn NotificationPort>,
    booking_config: BookingConfig,
    gateway_config: GatewayConfig,
}

impl TournamentService {
    /// Creates a new tournament service.
    pub fn new(
        tournaments: Arc<dyn TournamentStore>,
        registrations: Arc<dyn RegistrationStore>,
        gateway: Arc<dyn PaymentGateway>,
        notifier: Arc<dyn NotificationPort>,
        booking_config: BookingConfig,
        gateway_config: GatewayConfig,
    ) -> Self {
        Self {
            tournaments,
            registrations,
            gateway,
            notifier,
            booking_config,
            gateway_config,
        }
    }

    /// Register a team for a tournament.
    ///
    /// A fee-bearing registration is held pending with an expiry until
    /// the gateway callback settles it; a fee-free registration becomes
    /// active immediately and counts toward the team total.
    pub async fn register_team(
        &self,
        ctx: &RequestContext,
        req: RegisterTeamRequest,
    ) -> AppResult<RegisteredTeam> {
        if req.team_name.trim().is_empty() {
            return Err(AppError::validation("Team name must not be empty"));
        }
        if req.players.is_empty() {
            return Err(AppError::validation("A team needs at least one player"));
        }

        let tournament = self.require_tournament(req.tournament_id).await?;
        if req.players.len() as u32 > tournament.team_size {
            return Err(AppError::validation(format!(
                "Rosters are capped at {} players for this tournament",
                tournament.team_size
            )));
        }

        let now = Utc::now();
        if !tournament.registration_open(now) {
            return Err(AppError::conflict(
                "Registration for this tournament is closed",
            ));
        }

        let new_registration = NewRegistration {
            tournament_id: tournament.id,
            user_id: ctx.user_id,
            team_name: req.team_name.clone(),
            players: req.players.clone(),
        };

        if tournament.registration_fee == 0 {
            let registration = new_registration.into_registration(
                RegistrationStatus::Active,
                PaymentStatus::Unpaid,
                now,
            );
            let registration = self.registrations.insert(registration).await?;
            let teams = self
                .tournaments
                .increment_registered_teams(tournament.id)
                .await?;
            info!(
                registration_id = %registration.id,
                tournament_id = %tournament.id,
                teams,
                "Team registered (no fee)"
            );
            self.dispatch(Notice {
                user_id: ctx.user_id,
                title: "Registration confirmed".to_string(),
                body: format!(
                    "Team '{}' is registered for {}.",
                    registration.team_name, tournament.name
                ),
                category: NotificationCategory::TournamentRegistration,
                deep_link: Some(format!("/tournaments/{}", tournament.id)),
            })
            .await;
            return Ok(RegisteredTeam {
                registration,
                payment_url: None,
            });
        }

        let ttl = Duration::minutes(self.booking_config.reservation_ttl_minutes as i64);
        let mut registration = new_registration.into_registration(
            RegistrationStatus::PendingPayment,
            PaymentStatus::Pending,
            now,
        );
        registration.reservation_expires_at = Some(now + ttl);
        let mut registration = self.registrations.insert(registration).await?;

        let order_id = format!("tr-{}", registration.id.as_uuid().simple());
        let initiate = InitiateRequest {
            order_id: order_id.clone(),
            order_name: format!("Tournament entry: {}", tournament.name),
            amount_minor: tournament.registration_fee * 100,
            return_url: self.gateway_config.return_url.clone(),
            customer_name: None,
        };

        match self.gateway.initiate(initiate).await {
            Ok(payment) => {
                self.registrations
                    .set_gateway_ref(registration.id, &order_id, &payment.pidx)
                    .await?;
                registration.purchase_order_id = Some(order_id);
                registration.gateway_ref = Some(payment.pidx.clone());
                info!(
                    registration_id = %registration.id,
                    pidx = %payment.pidx,
                    "Registration payment initiated"
                );
                Ok(RegisteredTeam {
                    registration,
                    payment_url: Some(payment.payment_url),
                })
            }
            Err(err) => {
                self.registrations
                    .mark_payment_failed(registration.id, "gateway initiation failed", Utc::now())
                    .await?;
                warn!(
                    registration_id = %registration.id,
                    error = %err,
                    "Registration payment initiation failed"
                );
                Err(err)
            }
        }
    }

    /// Evaluate every tournament's status against the clock.
    ///
    /// Persists changed statuses through a compare-and-set so a
    /// transition fires its notifications exactly once, and generates the
    /// bracket when the deadline has passed with enough teams. Returns
    /// the number of transitions performed.
    pub async fn evaluate_statuses(&self, now: DateTime<Utc>) -> AppResult<usize> {
        let mut transitions = 0;
        for tournament in self.tournaments.list().await? {
            let derived = clock::derive_status(
                now,
                tournament.registration_deadline,
                tournament.start_at,
                tournament.end_at,
                tournament.registered_teams,
                tournament.min_teams,
                tournament.status,
            );

            if derived != tournament.status {
                let won = self
                    .tournaments
                    .update_status(tournament.id, tournament.status, derived)
                    .await?;
                if won {
                    transitions += 1;
                    info!(
                        tournament_id = %tournament.id,
                        from = %tournament.status,
                        to = %derived,
                        "Tournament status transition"
                    );
                    if matches!(
                        derived,
                        TournamentStatus::Ongoing | TournamentStatus::Completed
                    ) {
                        self.notify_transition(&tournament, derived).await?;
                    }
                }
            }

            self.maybe_generate_bracket(&tournament, derived, now).await?;
        }
        Ok(transitions)
    }

    async fn maybe_generate_bracket(
        &self,
        tournament: &Tournament,
        status: TournamentStatus,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        let deadline_passed = now > tournament.registration_deadline;
        let eligible = matches!(
            status,
            TournamentStatus::Upcoming | TournamentStatus::Ongoing
        );
        if !deadline_passed
            || !eligible
            || tournament.bracket.is_some()
            || tournament.registered_teams < tournament.min_teams
        {
            return Ok(());
        }

        let active = self.registrations.list_active(tournament.id).await?;
        let team_ids: Vec<RegistrationId> = active.iter().map(|r| r.id).collect();

        let bracket = match bracket_engine::generate(&team_ids, tournament.bracket_size.spots()) {
            Ok(b) => b,
            Err(err) => {
                warn!(
                    tournament_id = %tournament.id,
                    error = %err,
                    "Bracket generation failed"
                );
                return Ok(());
            }
        };

        // set_bracket is first-writer-wins, so two concurrent evaluations
        // publish exactly one bracket.
        if self.tournaments.set_bracket(tournament.id, bracket).await? {
            info!(tournament_id = %tournament.id, teams = team_ids.len(), "Bracket generated");
            for registration in &active {
                self.dispatch(Notice {
                    user_id: registration.user_id,
                    title: "Bracket ready".to_string(),
                    body: format!("The bracket for {} has been drawn.", tournament.name),
                    category: NotificationCategory::BracketReady,
                    deep_link: Some(format!("/tournaments/{}/bracket", tournament.id)),
                })
                .await;
            }
        }
        Ok(())
    }

    async fn notify_transition(
        &self,
        tournament: &Tournament,
        status: TournamentStatus,
    ) -> AppResult<()> {
        let body = match status {
            TournamentStatus::Ongoing => format!("{} has started.", tournament.name),
            TournamentStatus::Completed => format!("{} has finished.", tournament.name),
            _ => return Ok(()),
        };

        let participants = self.registrations.list_active(tournament.id).await?;
        let mut recipients: Vec<UserId> = participants.iter().map(|r| r.user_id).collect();
        recipients.push(tournament.organizer_id);

        for user_id in recipients {
            self.dispatch(Notice {
                user_id,
                title: "Tournament update".to_string(),
                body: body.clone(),
                category: NotificationCategory::TournamentStatus,
                deep_link: Some(format!("/tournaments/{}", tournament.id)),
            })
            .await;
        }
        Ok(())
    }

    /// Fetch a tournament's bracket, generating it on demand when the
    /// registration deadline has passed with enough teams.
    pub async fn bracket(&self, tournament_id: TournamentId) -> AppResult<Option<Bracket>> {
        let tournament = self.require_tournament(tournament_id).await?;
        if tournament.bracket.is_some() {
            return Ok(tournament.bracket);
        }
        self.maybe_generate_bracket(&tournament, tournament.status, Utc::now())
            .await?;
        Ok(self.require_tournament(tournament_id).await?.bracket)
    }

    /// Record a match result (staff only) and propagate it.
    pub async fn record_match_result(
        &self,
        ctx: &RequestContext,
        tournament_id: TournamentId,
        match_number: u32,
        winner: RegistrationId,
    ) -> AppResult<Bracket> {
        if !ctx.is_elevated() {
            return Err(AppError::authorization(
                "Only staff may record match results",
            ));
        }

        let tournament = self.require_tournament(tournament_id).await?;
        let mut bracket = tournament.bracket.ok_or_else(|| {
            AppError::conflict(format!("Tournament {tournament_id} has no bracket yet"))
        })?;

        bracket_engine::record_result(&mut bracket, match_number, winner)?;
        self.tournaments
            .update_bracket(tournament_id, bracket.clone())
            .await?;
        info!(
            tournament_id = %tournament_id,
            match_number,
            winner = %winner,
            "Match result recorded"
        );
        Ok(bracket)
    }

    async fn require_tournament(&self, id: TournamentId) -> AppResult<Tournament> {
        self.tournaments
            .get(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Tournament {id} not found")))
    }

    async fn dispatch(&self, notice: Notice) {
        if let Err(err) = self.notifier.notify(notice).await {
            warn!(error = %err, "Notification dispatch failed");
        }
    }
}
