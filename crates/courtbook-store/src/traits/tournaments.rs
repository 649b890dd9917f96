//! Tournament and registration repository traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use courtbook_core::result::AppResult;
use courtbook_core::types::id::{RegistrationId, TournamentId};
use courtbook_entity::bracket::Bracket;
use courtbook_entity::tournament::{Tournament, TournamentRegistration, TournamentStatus};

/// Repository for tournament records.
#[async_trait]
pub trait TournamentStore: Send + Sync + 'static {
    /// Persist a tournament.
    async fn insert(&self, tournament: Tournament) -> AppResult<Tournament>;

    /// Find a tournament by id.
    async fn get(&self, id: TournamentId) -> AppResult<Option<Tournament>>;

    /// All tournaments, for the status evaluation job.
    async fn list(&self) -> AppResult<Vec<Tournament>>;

    /// Compare-and-set status update.
    ///
    /// Moves the tournament from `from` to `to` and returns whether this
    /// caller performed the transition. A `false` return means another
    /// evaluation got there first — the caller must not emit transition
    /// side effects.
    async fn update_status(
        &self,
        id: TournamentId,
        from: TournamentStatus,
        to: TournamentStatus,
    ) -> AppResult<bool>;

    /// Atomically increment the active team counter, returning the new
    /// count.
    async fn increment_registered_teams(&self, id: TournamentId) -> AppResult<u32>;

    /// Attach a freshly generated bracket.
    ///
    /// Returns `false` without mutating when a bracket already exists, so
    /// concurrent triggers generate at most once.
    async fn set_bracket(&self, id: TournamentId, bracket: Bracket) -> AppResult<bool>;

    /// Replace the stored bracket after a result was recorded.
    async fn update_bracket(&self, id: TournamentId, bracket: Bracket) -> AppResult<()>;
}

/// Repository for tournament registrations.
#[async_trait]
pub trait RegistrationStore: Send + Sync + 'static {
    /// Persist a new registration.
    ///
    /// Fails with `Conflict` when the user already has a non-withdrawn
    /// registration in the tournament or the team name is taken there.
    async fn insert(&self, registration: TournamentRegistration)
        -> AppResult<TournamentRegistration>;

    /// Find a registration by id.
    async fn get(&self, id: RegistrationId) -> AppResult<Option<TournamentRegistration>>;

    /// Find a registration by its gateway payment reference.
    async fn find_by_gateway_ref(&self, pidx: &str) -> AppResult<Option<TournamentRegistration>>;

    /// Record the gateway order reference and pidx on a pending
    /// registration.
    async fn set_gateway_ref(
        &self,
        id: RegistrationId,
        purchase_order_id: &str,
        pidx: &str,
    ) -> AppResult<()>;

    /// Compare-and-set payment confirmation; the registration becomes
    /// active and its expiry is cleared. Returns `false` when already
    /// paid; fails with `Conflict` when withdrawn.
    async fn confirm_payment(&self, id: RegistrationId, now: DateTime<Utc>) -> AppResult<bool>;

    /// Mark the payment failed and withdraw the registration.
    async fn mark_payment_failed(
        &self,
        id: RegistrationId,
        reason: &str,
        now: DateTime<Utc>,
    ) -> AppResult<()>;

    /// Withdraw lapsed pending registrations, returning them.
    async fn sweep_expired(&self, now: DateTime<Utc>) -> AppResult<Vec<TournamentRegistration>>;

    /// Active registrations for a tournament, oldest first.
    async fn list_active(&self, tournament_id: TournamentId)
        -> AppResult<Vec<TournamentRegistration>>;
}
