//! In-memory tournament and registration stores.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use courtbook_core::error::AppError;
use courtbook_core::result::AppResult;
use courtbook_core::types::id::{RegistrationId, TournamentId};
use courtbook_entity::booking::PaymentStatus;
use courtbook_entity::bracket::Bracket;
use courtbook_entity::tournament::{
    RegistrationStatus, Tournament, TournamentRegistration, TournamentStatus,
};

use crate::traits::{RegistrationStore, TournamentStore};

/// In-memory [`TournamentStore`].
///
/// Status updates and the team counter are conditional updates under one
/// mutex, mirroring the expected-version semantics a database would
/// provide.
#[derive(Default)]
pub struct MemoryTournamentStore {
    tournaments: Mutex<HashMap<TournamentId, Tournament>>,
}

impl MemoryTournamentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TournamentStore for MemoryTournamentStore {
    async fn insert(&self, tournament: Tournament) -> AppResult<Tournament> {
        let mut tournaments = self.tournaments.lock().await;
        tournaments.insert(tournament.id, tournament.clone());
        Ok(tournament)
    }

    async fn get(&self, id: TournamentId) -> AppResult<Option<Tournament>> {
        let tournaments = self.tournaments.lock().await;
        Ok(tournaments.get(&id).cloned())
    }

    async fn list(&self) -> AppResult<Vec<Tournament>> {
        let tournaments = self.tournaments.lock().await;
        let mut all: Vec<Tournament> = tournaments.values().cloned().collect();
        all.sort_by_key(|t| t.start_at);
        Ok(all)
    }

    async fn update_status(
        &self,
        id: TournamentId,
        from: TournamentStatus,
        to: TournamentStatus,
    ) -> AppResult<bool> {
        let mut tournaments = self.tournaments.lock().await;
        let tournament = tournaments
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Tournament {id} not found")))?;
        if tournament.status != from {
            return Ok(false);
        }
        tournament.status = to;
        tournament.updated_at = Utc::now();
        Ok(true)
    }

    async fn increment_registered_teams(&self, id: TournamentId) -> AppResult<u32> {
        let mut tournaments = self.tournaments.lock().await;
        let tournament = tournaments
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Tournament {id} not found")))?;
        tournament.registered_teams += 1;
        tournament.updated_at = Utc::now();
        Ok(tournament.registered_teams)
    }

    async fn set_bracket(&self, id: TournamentId, bracket: Bracket) -> AppResult<bool> {
        let mut tournaments = self.tournaments.lock().await;
        let tournament = tournaments
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Tournament {id} not found")))?;
        if tournament.bracket.is_some() {
            return Ok(false);
        }
        tournament.bracket = Some(bracket);
        tournament.updated_at = Utc::now();
        Ok(true)
    }

    async fn update_bracket(&self, id: TournamentId, bracket: Bracket) -> AppResult<()> {
        let mut tournaments = self.tournaments.lock().await;
        let tournament = tournaments
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Tournament {id} not found")))?;
        if tournament.bracket.is_none() {
            return Err(AppError::conflict(format!(
                "Tournament {id} has no bracket to update"
            )));
        }
        tournament.bracket = Some(bracket);
        tournament.updated_at = Utc::now();
        Ok(())
    }
}

/// In-memory [`RegistrationStore`].
#[derive(Default)]
pub struct MemoryRegistrationStore {
    registrations: Mutex<HashMap<RegistrationId, TournamentRegistration>>,
}

impl MemoryRegistrationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RegistrationStore for MemoryRegistrationStore {
    async fn insert(
        &self,
        registration: TournamentRegistration,
    ) -> AppResult<TournamentRegistration> {
        let mut registrations = self.registrations.lock().await;
        let duplicate = registrations.values().any(|r| {
            r.tournament_id == registration.tournament_id
                && r.status != RegistrationStatus::Withdrawn
                && (r.user_id == registration.user_id || r.team_name == registration.team_name)
        });
        if duplicate {
            return Err(AppError::conflict(format!(
                "Team '{}' or its owner is already registered",
                registration.team_name
            )));
        }
        registrations.insert(registration.id, registration.clone());
        Ok(registration)
    }

    async fn get(&self, id: RegistrationId) -> AppResult<Option<TournamentRegistration>> {
        let registrations = self.registrations.lock().await;
        Ok(registrations.get(&id).cloned())
    }

    async fn find_by_gateway_ref(&self, pidx: &str) -> AppResult<Option<TournamentRegistration>> {
        let registrations = self.registrations.lock().await;
        Ok(registrations
            .values()
            .find(|r| r.gateway_ref.as_deref() == Some(pidx))
            .cloned())
    }

    async fn set_gateway_ref(
        &self,
        id: RegistrationId,
        purchase_order_id: &str,
        pidx: &str,
    ) -> AppResult<()> {
        let mut registrations = self.registrations.lock().await;
        let registration = registrations
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Registration {id} not found")))?;
        registration.purchase_order_id = Some(purchase_order_id.to_string());
        registration.gateway_ref = Some(pidx.to_string());
        Ok(())
    }

    async fn confirm_payment(&self, id: RegistrationId, now: DateTime<Utc>) -> AppResult<bool> {
        let mut registrations = self.registrations.lock().await;
        let registration = registrations
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Registration {id} not found")))?;

        if registration.payment_status == PaymentStatus::Paid {
            return Ok(false);
        }
        if registration.status == RegistrationStatus::Withdrawn {
            return Err(AppError::conflict(format!(
                "Registration {id} is withdrawn and cannot be confirmed"
            )));
        }

        registration.payment_status = PaymentStatus::Paid;
        registration.status = RegistrationStatus::Active;
        registration.reservation_expires_at = None;
        registration.updated_at = now;
        Ok(true)
    }

    async fn mark_payment_failed(
        &self,
        id: RegistrationId,
        _reason: &str,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        let mut registrations = self.registrations.lock().await;
        let registration = registrations
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Registration {id} not found")))?;
        registration.payment_status = PaymentStatus::Failed;
        registration.status = RegistrationStatus::Withdrawn;
        registration.reservation_expires_at = None;
        registration.updated_at = now;
        Ok(())
    }

    async fn sweep_expired(&self, now: DateTime<Utc>) -> AppResult<Vec<TournamentRegistration>> {
        let mut registrations = self.registrations.lock().await;
        let due: Vec<RegistrationId> = registrations
            .values()
            .filter(|r| {
                r.payment_status != PaymentStatus::Paid
                    && r.status == RegistrationStatus::PendingPayment
                    && r.reservation_expires_at.is_some_and(|at| at < now)
            })
            .map(|r| r.id)
            .collect();

        let mut swept = Vec::with_capacity(due.len());
        for id in due {
            let Some(registration) = registrations.get_mut(&id) else {
                continue;
            };
            registration.status = RegistrationStatus::Withdrawn;
            registration.payment_status = PaymentStatus::Failed;
            registration.reservation_expires_at = None;
            registration.updated_at = now;
            swept.push(registration.clone());
        }
        Ok(swept)
    }

    async fn list_active(
        &self,
        tournament_id: TournamentId,
    ) -> AppResult<Vec<TournamentRegistration>> {
        let registrations = self.registrations.lock().await;
        let mut active: Vec<TournamentRegistration> = registrations
            .values()
            .filter(|r| r.tournament_id == tournament_id && r.status == RegistrationStatus::Active)
            .cloned()
            .collect();
        active.sort_by_key(|r| r.created_at);
        Ok(active)
    }
}
