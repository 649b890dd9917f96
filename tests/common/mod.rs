//! Shared test helpers for integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime, Utc};
use tokio::sync::Mutex;

use courtbook_core::config::booking::BookingConfig;
use courtbook_core::config::gateway::GatewayConfig;
use courtbook_core::error::AppError;
use courtbook_core::result::AppResult;
use courtbook_core::traits::gateway::{
    GatewayPaymentStatus, InitiateRequest, InitiatedPayment, PaymentGateway, VerifiedPayment,
};
use courtbook_core::types::id::{CourtId, TournamentId, UserId};
use courtbook_entity::court::{Court, CourtPricing, RateWindow};
use courtbook_entity::tournament::{BracketSize, Tournament, TournamentStatus};
use courtbook_entity::user::UserRole;
use courtbook_service::RequestContext;
use courtbook_service::booking::{
    CreateBookingRequest, ReservationCoordinator, SettlementMethod,
};
use courtbook_service::notification::RecordingNotifier;
use courtbook_service::tournament::TournamentService;
use courtbook_store::memory::{
    MemoryBookingStore, MemoryCourtStore, MemoryFreeSlotLedger, MemoryLoyaltyLedger,
    MemoryRegistrationStore, MemoryTournamentStore,
};
use courtbook_store::{CourtStore, TournamentStore};

#[derive(Default)]
struct MockGatewayState {
    next_pidx: u64,
    fail_next_initiate: bool,
    /// Amounts captured at initiation, keyed by pidx.
    initiated_amounts: HashMap<String, i64>,
    /// Scripted verification outcomes, keyed by pidx.
    verifications: HashMap<String, Result<VerifiedPayment, AppError>>,
}

/// Scripted payment gateway for tests.
pub struct MockGateway {
    state: Mutex<MockGatewayState>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockGatewayState::default()),
        }
    }

    /// Make the next initiate call fail with a gateway error.
    pub async fn fail_next_initiate(&self) {
        self.state.lock().await.fail_next_initiate = true;
    }

    /// Script a successful verification with the exact initiated amount.
    pub async fn complete(&self, pidx: &str) {
        let mut state = self.state.lock().await;
        let amount = *state
            .initiated_amounts
            .get(pidx)
            .expect("pidx was never initiated");
        state.verifications.insert(
            pidx.to_string(),
            Ok(VerifiedPayment {
                status: GatewayPaymentStatus::Completed,
                amount_minor: amount,
                transaction_id: Some(format!("txn-{pidx}")),
            }),
        );
    }

    /// Script a successful verification reporting a tampered amount.
    pub async fn complete_with_amount(&self, pidx: &str, amount_minor: i64) {
        self.state.lock().await.verifications.insert(
            pidx.to_string(),
            Ok(VerifiedPayment {
                status: GatewayPaymentStatus::Completed,
                amount_minor,
                transaction_id: Some(format!("txn-{pidx}")),
            }),
        );
    }

    /// Script a non-success verification outcome.
    pub async fn finish_with_status(&self, pidx: &str, status: GatewayPaymentStatus) {
        let mut state = self.state.lock().await;
        let amount = state.initiated_amounts.get(pidx).copied().unwrap_or(0);
        state.verifications.insert(
            pidx.to_string(),
            Ok(VerifiedPayment {
                status,
                amount_minor: amount,
                transaction_id: None,
            }),
        );
    }

    /// Script a transport failure for verification.
    pub async fn fail_verify(&self, pidx: &str) {
        self.state.lock().await.verifications.insert(
            pidx.to_string(),
            Err(AppError::gateway("simulated gateway outage")),
        );
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn initiate(&self, request: InitiateRequest) -> AppResult<InitiatedPayment> {
        let mut state = self.state.lock().await;
        if state.fail_next_initiate {
            state.fail_next_initiate = false;
            return Err(AppError::gateway("simulated initiation failure"));
        }
        state.next_pidx += 1;
        let pidx = format!("pidx-{}", state.next_pidx);
        state
            .initiated_amounts
            .insert(pidx.clone(), request.amount_minor);
        Ok(InitiatedPayment {
            payment_url: format!("https://pay.test/{pidx}"),
            pidx,
        })
    }

    async fn verify(&self, pidx: &str) -> AppResult<VerifiedPayment> {
        let state = self.state.lock().await;
        match state.verifications.get(pidx) {
            Some(Ok(v)) => Ok(v.clone()),
            Some(Err(e)) => Err(e.clone()),
            None => Ok(VerifiedPayment {
                status: GatewayPaymentStatus::Pending,
                amount_minor: state.initiated_amounts.get(pidx).copied().unwrap_or(0),
                transaction_id: None,
            }),
        }
    }
}

/// Fully wired in-memory application for tests.
pub struct TestEnv {
    pub bookings: Arc<MemoryBookingStore>,
    pub courts: Arc<MemoryCourtStore>,
    pub loyalty: Arc<MemoryLoyaltyLedger>,
    pub free_slots: Arc<MemoryFreeSlotLedger>,
    pub tournaments: Arc<MemoryTournamentStore>,
    pub registrations: Arc<MemoryRegistrationStore>,
    pub gateway: Arc<MockGateway>,
    pub notifier: Arc<RecordingNotifier>,
    pub coordinator: Arc<ReservationCoordinator>,
    pub tournament_service: Arc<TournamentService>,
    pub booking_config: BookingConfig,
}

impl TestEnv {
    pub fn new() -> Self {
        let booking_config = BookingConfig::default();
        let gateway_config = GatewayConfig::default();

        let bookings = Arc::new(MemoryBookingStore::new());
        let courts = Arc::new(MemoryCourtStore::new());
        let loyalty = Arc::new(MemoryLoyaltyLedger::new());
        let free_slots = Arc::new(MemoryFreeSlotLedger::new(booking_config.daily_free_slots));
        let tournaments = Arc::new(MemoryTournamentStore::new());
        let registrations = Arc::new(MemoryRegistrationStore::new());
        let gateway = Arc::new(MockGateway::new());
        let notifier = Arc::new(RecordingNotifier::new());

        let coordinator = Arc::new(ReservationCoordinator::new(
            bookings.clone(),
            courts.clone(),
            loyalty.clone(),
            free_slots.clone(),
            registrations.clone(),
            tournaments.clone(),
            gateway.clone(),
            notifier.clone(),
            booking_config.clone(),
            gateway_config.clone(),
        ));
        let tournament_service = Arc::new(TournamentService::new(
            tournaments.clone(),
            registrations.clone(),
            gateway.clone(),
            notifier.clone(),
            booking_config.clone(),
            gateway_config.clone(),
        ));

        Self {
            bookings,
            courts,
            loyalty,
            free_slots,
            tournaments,
            registrations,
            gateway,
            notifier,
            coordinator,
            tournament_service,
            booking_config,
        }
    }

    /// Insert a court with standard hours (06:00-22:00) and a peak window
    /// 18:00-20:00 at 1500 over a 1000 regular rate.
    pub async fn add_court(&self, requires_prepayment: bool) -> Court {
        let court = Court {
            id: CourtId::new(),
            name: "Center Court".to_string(),
            opening_time: t(6, 0),
            closing_time: t(22, 0),
            requires_prepayment,
            pricing: CourtPricing {
                hourly_rate: 1000,
                peak: Some(RateWindow {
                    start: t(18, 0),
                    end: t(20, 0),
                    rate: Some(1500),
                }),
                off_peak: None,
            },
        };
        self.courts.insert(court).await.expect("insert court")
    }

    /// Insert an upcoming tournament. Deadline and schedule are relative
    /// to now: deadline in 1h, start in 2h, end in 8h.
    pub async fn add_tournament(&self, fee: i64, min_teams: u32) -> Tournament {
        let now = Utc::now();
        let tournament = Tournament {
            id: TournamentId::new(),
            organizer_id: UserId::new(),
            name: "Summer Cup".to_string(),
            start_at: now + chrono::Duration::hours(2),
            end_at: now + chrono::Duration::hours(8),
            registration_deadline: now + chrono::Duration::hours(1),
            min_teams,
            bracket_size: BracketSize::Eight,
            team_size: 5,
            registration_fee: fee,
            status: TournamentStatus::Upcoming,
            registered_teams: 0,
            bracket: None,
            created_at: now,
            updated_at: now,
        };
        self.tournaments
            .insert(tournament)
            .await
            .expect("insert tournament")
    }
}

pub fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

pub fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()
}

pub fn player() -> RequestContext {
    RequestContext::new(UserId::new(), UserRole::Player)
}

pub fn staff() -> RequestContext {
    RequestContext::new(UserId::new(), UserRole::Staff)
}

pub fn booking_request(
    court_id: CourtId,
    start: NaiveTime,
    end: NaiveTime,
    method: SettlementMethod,
) -> CreateBookingRequest {
    CreateBookingRequest {
        court_id,
        date: day(),
        start_time: start,
        end_time: end,
        method,
        price_estimate: None,
    }
}
