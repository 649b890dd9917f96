//! Tournament registration entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use courtbook_core::types::id::{RegistrationId, TeamId, TournamentId, UserId};

use crate::booking::PaymentStatus;

/// Lifecycle status of a team registration.
///
/// Registrations follow the same pending/expiry pattern as bookings:
/// a fee-bearing registration is held `PendingPayment` until the gateway
/// callback settles it or the expiry sweep withdraws it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    /// The team is registered.
    Active,
    /// The team withdrew or the registration lapsed.
    Withdrawn,
    /// Awaiting payment completion. Subject to expiry.
    PendingPayment,
}

impl RegistrationStatus {
    /// Return the status as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Withdrawn => "withdrawn",
            Self::PendingPayment => "pending_payment",
        }
    }
}

impl std::fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A team's entry in a tournament.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TournamentRegistration {
    /// Unique registration identifier.
    pub id: RegistrationId,
    /// The tournament entered.
    pub tournament_id: TournamentId,
    /// The user who registered the team.
    pub user_id: UserId,
    /// Unique team identifier.
    pub team_id: TeamId,
    /// Team display name.
    pub team_name: String,
    /// Player roster.
    pub players: Vec<String>,
    /// Lifecycle status.
    pub status: RegistrationStatus,
    /// Settlement state of the registration fee.
    pub payment_status: PaymentStatus,
    /// Merchant order reference sent to the gateway.
    pub purchase_order_id: Option<String>,
    /// Opaque gateway payment reference (pidx).
    pub gateway_ref: Option<String>,
    /// When an unpaid registration lapses. Cleared on payment.
    pub reservation_expires_at: Option<DateTime<Utc>>,
    /// When the registration was created.
    pub created_at: DateTime<Utc>,
    /// When the registration was last modified.
    pub updated_at: DateTime<Utc>,
}

/// Data required to create a registration record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRegistration {
    /// The tournament entered.
    pub tournament_id: TournamentId,
    /// The user registering the team.
    pub user_id: UserId,
    /// Team display name.
    pub team_name: String,
    /// Player roster.
    pub players: Vec<String>,
}

impl NewRegistration {
    /// Materialize a full registration record in its initial state.
    pub fn into_registration(
        self,
        status: RegistrationStatus,
        payment_status: PaymentStatus,
        now: DateTime<Utc>,
    ) -> TournamentRegistration {
        TournamentRegistration {
            id: RegistrationId::new(),
            tournament_id: self.tournament_id,
            user_id: self.user_id,
            team_id: TeamId::new(),
            team_name: self.team_name,
            players: self.players,
            status,
            payment_status,
            purchase_order_id: None,
            gateway_ref: None,
            reservation_expires_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}
