//! The reservation coordinator state machine.
//!
//! Creates bookings along one of four settlement paths, reconciles
//! asynchronous gateway callbacks back into booking and registration
//! state, handles cancellation, and drives the expiry/lifecycle passes
//! the background worker schedules.

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use courtbook_core::config::booking::BookingConfig;
use courtbook_core::config::gateway::GatewayConfig;
use courtbook_core::error::AppError;
use courtbook_core::result::AppResult;
use courtbook_core::traits::gateway::{GatewayPaymentStatus, InitiateRequest, PaymentGateway};
use courtbook_core::traits::notifier::{NotificationCategory, NotificationPort, Notice};
use courtbook_core::types::id::{BookingId, CourtId, UserId};
use courtbook_core::types::pagination::{PageRequest, PageResponse};
use courtbook_entity::booking::{
    Booking, BookingStatus, NewBooking, PaymentMethod, PaymentStatus, PriceType,
};
use courtbook_entity::court::Court;
use courtbook_entity::tournament::TournamentRegistration;
use courtbook_store::{
    BookingStore, CourtStore, FreeSlotLedger, LoyaltyLedger, RegistrationStore, TournamentStore,
};

use crate::availability::{self, Availability, UnavailableReason};
use crate::context::RequestContext;
use crate::pricing;

/// The settlement path requested for a booking.
///
/// Each variant carries only what that path needs; the coordinator
/// matches exhaustively instead of comparing method strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "method")]
pub enum SettlementMethod {
    /// Redeem loyalty points.
    Points,
    /// Spend one unit of the daily complimentary quota.
    Free,
    /// Pay through the external gateway.
    Gateway {
        /// Override for the configured post-payment return URL.
        return_url: Option<String>,
    },
    /// Pay at the venue.
    Offline,
}

/// Request to create a booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    /// The court to reserve.
    pub court_id: CourtId,
    /// Calendar day of the slot (UTC).
    pub date: NaiveDate,
    /// Slot start time.
    pub start_time: NaiveTime,
    /// Slot end time.
    pub end_time: NaiveTime,
    /// Requested settlement path.
    pub method: SettlementMethod,
    /// Client-side price estimate. Never trusted; logged on mismatch.
    pub price_estimate: Option<i64>,
}

/// A successfully created booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedBooking {
    /// The committed booking record.
    pub booking: Booking,
    /// Gateway redirect URL when the gateway path requires payment.
    pub payment_url: Option<String>,
}

/// The record a gateway callback settled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ReconcileTarget {
    /// A court booking.
    Booking(Booking),
    /// A tournament registration.
    Registration(TournamentRegistration),
}

/// How the callback was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReconcileDisposition {
    /// This call performed the pending → paid transition.
    Confirmed,
    /// The record was already paid; duplicate callback, no-op.
    AlreadyConfirmed,
    /// The gateway reported a non-success status; the record was
    /// cancelled/withdrawn.
    Rejected(GatewayPaymentStatus),
}

/// Outcome of a reconciliation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileOutcome {
    /// The settled record.
    pub target: ReconcileTarget,
    /// What this call did.
    pub disposition: ReconcileDisposition,
}

/// Counts from one expiry sweep.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SweepSummary {
    /// Bookings expired by the sweep.
    pub bookings: usize,
    /// Registrations withdrawn by the sweep.
    pub registrations: usize,
}

/// The central booking state machine.
///
/// All public operations return a typed result; nothing here is fatal to
/// the process. Gateway calls are made without holding any lock — the
/// only atomic step is the store-level compare-and-set that marks a
/// record paid.
pub struct ReservationCoordinator {
    bookings: Arc<dyn BookingStore>,
    courts: Arc<dyn CourtStore>,
    loyalty: Arc<dyn LoyaltyLedger>,
    free_slots: Arc<dyn FreeSlotLedger>,
    registrations: Arc<dyn RegistrationStore>,
    tournaments: Arc<dyn TournamentStore>,
    gateway: Arc<dyn PaymentGateway>,
    notifier: Arc<dyn NotificationPort>,
    booking_config: BookingConfig,
    gateway_config: GatewayConfig,
}

impl ReservationCoordinator {
    /// Creates a new coordinator.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        bookings: Arc<dyn BookingStore>,
        courts: Arc<dyn CourtStore>,
        loyalty: Arc<dyn LoyaltyLedger>,
        free_slots: Arc<dyn FreeSlotLedger>,
        registrations: Arc<dyn RegistrationStore>,
        tournaments: Arc<dyn TournamentStore>,
        gateway: Arc<dyn PaymentGateway>,
        notifier: Arc<dyn NotificationPort>,
        booking_config: BookingConfig,
        gateway_config: GatewayConfig,
    ) -> Self {
        Self {
            bookings,
            courts,
            loyalty,
            free_slots,
            registrations,
            tournaments,
            gateway,
            notifier,
            booking_config,
            gateway_config,
        }
    }

    /// Create a booking along the requested settlement path.
    pub async fn create_booking(
        &self,
        ctx: &RequestContext,
        req: CreateBookingRequest,
    ) -> AppResult<CreatedBooking> {
        if req.start_time >= req.end_time {
            return Err(AppError::validation("Start time must be before end time"));
        }

        let court = self
            .courts
            .get(req.court_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Court {} not found", req.court_id)))?;

        let existing = self.bookings.active_on_date(court.id, req.date).await?;
        match availability::check(&court, req.date, req.start_time, req.end_time, &existing) {
            Availability::Available => {}
            Availability::Unavailable(UnavailableReason::OutsideOperatingHours) => {
                return Err(AppError::validation(format!(
                    "Requested window is outside operating hours ({} - {})",
                    court.opening_time.format("%H:%M"),
                    court.closing_time.format("%H:%M"),
                )));
            }
            Availability::Unavailable(UnavailableReason::SlotTaken) => {
                return Err(AppError::conflict(format!(
                    "Slot {} {} on court {} is already booked",
                    req.date, req.start_time, court.id
                )));
            }
        }

        let quote = pricing::quote(&court.pricing, req.start_time);
        if let Some(estimate) = req.price_estimate {
            if estimate != quote.price {
                warn!(
                    court_id = %court.id,
                    client_price = estimate,
                    derived_price = quote.price,
                    "Client price estimate disagrees with derived price; using derived"
                );
            }
        }

        let now = Utc::now();
        match req.method {
            SettlementMethod::Points => self.settle_with_points(ctx, &req, &court, quote, now).await,
            SettlementMethod::Free => self.settle_with_free_slot(ctx, &req, &court, now).await,
            SettlementMethod::Gateway { ref return_url } => {
                let return_url = return_url.clone();
                self.settle_with_gateway(ctx, &req, &court, quote, return_url, now)
                    .await
            }
            SettlementMethod::Offline => self.settle_offline(ctx, &req, &court, quote, now).await,
        }
    }

    async fn settle_with_points(
        &self,
        ctx: &RequestContext,
        req: &CreateBookingRequest,
        court: &Court,
        quote: pricing::Quote,
        now: DateTime<Utc>,
    ) -> AppResult<CreatedBooking> {
        let divisor = self.booking_config.points_divisor.max(1);
        let points_cost = (quote.price + divisor / 2) / divisor;

        // Claim the slot first; unwind the record if the debit fails so
        // no partial booking survives.
        let mut booking = self
            .new_booking(ctx, req, court, quote.price, quote.price_type, PaymentMethod::Points)
            .into_booking(BookingStatus::Confirmed, PaymentStatus::Paid, now);
        booking.points_used = points_cost;
        let booking = self.bookings.insert(booking).await?;

        match self
            .loyalty
            .debit(
                ctx.user_id,
                points_cost,
                "court booking redemption",
                Some(booking.id),
            )
            .await
        {
            Ok(_) => {
                info!(booking_id = %booking.id, points = points_cost, "Booking settled with points");
                self.dispatch(confirmation_notice(&booking)).await;
                Ok(CreatedBooking {
                    booking,
                    payment_url: None,
                })
            }
            Err(err) => {
                self.bookings.remove(booking.id).await?;
                Err(err)
            }
        }
    }

    async fn settle_with_free_slot(
        &self,
        ctx: &RequestContext,
        req: &CreateBookingRequest,
        court: &Court,
        now: DateTime<Utc>,
    ) -> AppResult<CreatedBooking> {
        if court.requires_prepayment {
            return Err(AppError::validation(
                "This court requires prepayment; free bookings are not accepted",
            ));
        }

        let booking = self
            .new_booking(ctx, req, court, 0, PriceType::Free, PaymentMethod::Free)
            .into_booking(BookingStatus::Confirmed, PaymentStatus::Unpaid, now);
        let booking = self.bookings.insert(booking).await?;

        match self.free_slots.consume_one(ctx.user_id, req.date).await {
            Ok(remaining) => {
                info!(booking_id = %booking.id, remaining, "Booking settled from free quota");
                self.dispatch(confirmation_notice(&booking)).await;
                Ok(CreatedBooking {
                    booking,
                    payment_url: None,
                })
            }
            Err(err) => {
                self.bookings.remove(booking.id).await?;
                Err(err)
            }
        }
    }

    async fn settle_with_gateway(
        &self,
        ctx: &RequestContext,
        req: &CreateBookingRequest,
        court: &Court,
        quote: pricing::Quote,
        return_url: Option<String>,
        now: DateTime<Utc>,
    ) -> AppResult<CreatedBooking> {
        if quote.price == 0 {
            let booking = self
                .new_booking(ctx, req, court, 0, quote.price_type, PaymentMethod::Gateway)
                .into_booking(BookingStatus::Confirmed, PaymentStatus::Paid, now);
            let booking = self.bookings.insert(booking).await?;
            self.dispatch(confirmation_notice(&booking)).await;
            return Ok(CreatedBooking {
                booking,
                payment_url: None,
            });
        }

        let ttl = Duration::minutes(self.booking_config.reservation_ttl_minutes as i64);
        let mut booking = self
            .new_booking(
                ctx,
                req,
                court,
                quote.price,
                quote.price_type,
                PaymentMethod::Gateway,
            )
            .into_booking(BookingStatus::Pending, PaymentStatus::Pending, now);
        booking.reservation_expires_at = Some(now + ttl);
        let mut booking = self.bookings.insert(booking).await?;

        let order_id = format!("bk-{}", booking.id.as_uuid().simple());
        let initiate = InitiateRequest {
            order_id: order_id.clone(),
            order_name: format!("Court booking: {}", court.name),
            amount_minor: quote.price * 100,
            return_url: return_url.unwrap_or_else(|| self.gateway_config.return_url.clone()),
            customer_name: None,
        };

        match self.gateway.initiate(initiate).await {
            Ok(payment) => {
                // The reference is stored before the redirect URL leaves
                // this function, so a callback can never miss the record.
                self.bookings
                    .set_gateway_ref(booking.id, &order_id, &payment.pidx)
                    .await?;
                booking.purchase_order_id = Some(order_id);
                booking.gateway_ref = Some(payment.pidx.clone());
                info!(booking_id = %booking.id, pidx = %payment.pidx, "Gateway payment initiated");
                Ok(CreatedBooking {
                    booking,
                    payment_url: Some(payment.payment_url),
                })
            }
            Err(err) => {
                self.bookings
                    .mark_payment_failed(booking.id, "gateway initiation failed", Utc::now())
                    .await?;
                warn!(booking_id = %booking.id, error = %err, "Gateway initiation failed");
                Err(err)
            }
        }
    }

    async fn settle_offline(
        &self,
        ctx: &RequestContext,
        req: &CreateBookingRequest,
        court: &Court,
        quote: pricing::Quote,
        now: DateTime<Utc>,
    ) -> AppResult<CreatedBooking> {
        if court.requires_prepayment {
            return Err(AppError::validation(
                "This court requires prepayment; pay-at-venue bookings are not accepted",
            ));
        }

        let booking = self
            .new_booking(
                ctx,
                req,
                court,
                quote.price,
                quote.price_type,
                PaymentMethod::Offline,
            )
            .into_booking(BookingStatus::Confirmed, PaymentStatus::Unpaid, now);
        let booking = self.bookings.insert(booking).await?;
        info!(booking_id = %booking.id, "Booking confirmed for offline payment");
        self.dispatch(confirmation_notice(&booking)).await;
        Ok(CreatedBooking {
            booking,
            payment_url: None,
        })
    }

    fn new_booking(
        &self,
        ctx: &RequestContext,
        req: &CreateBookingRequest,
        court: &Court,
        price: i64,
        price_type: PriceType,
        payment_method: PaymentMethod,
    ) -> NewBooking {
        NewBooking {
            court_id: court.id,
            user_id: ctx.user_id,
            date: req.date,
            start_time: req.start_time,
            end_time: req.end_time,
            price,
            price_type,
            payment_method,
        }
    }

    /// Reconcile an asynchronous gateway callback into local state.
    ///
    /// Looks up the record the `pidx` belongs to (booking first, then
    /// tournament registration), verifies the payment with the gateway,
    /// and applies the outcome. Safe to call repeatedly with the same
    /// reference.
    pub async fn verify_and_reconcile(&self, pidx: &str) -> AppResult<ReconcileOutcome> {
        if let Some(booking) = self.bookings.find_by_gateway_ref(pidx).await? {
            return self.reconcile_booking(booking, pidx).await;
        }
        if let Some(registration) = self.registrations.find_by_gateway_ref(pidx).await? {
            return self.reconcile_registration(registration, pidx).await;
        }
        Err(AppError::not_found(format!(
            "No reservation matches gateway reference '{pidx}'"
        )))
    }

    async fn reconcile_booking(
        &self,
        booking: Booking,
        pidx: &str,
    ) -> AppResult<ReconcileOutcome> {
        if booking.payment_status == PaymentStatus::Paid {
            return Ok(ReconcileOutcome {
                target: ReconcileTarget::Booking(booking),
                disposition: ReconcileDisposition::AlreadyConfirmed,
            });
        }

        let verified = match self.gateway.verify(pidx).await {
            Ok(v) => v,
            Err(err) => {
                self.bookings
                    .mark_payment_failed(booking.id, "gateway verification failed", Utc::now())
                    .await?;
                self.dispatch(payment_failed_notice(
                    booking.user_id,
                    "We could not verify your payment; the booking was cancelled.",
                    booking.id,
                ))
                .await;
                return Err(err);
            }
        };

        if !verified.status.is_success() {
            self.bookings
                .mark_payment_failed(
                    booking.id,
                    &format!("payment {}", verified.status),
                    Utc::now(),
                )
                .await?;
            self.dispatch(payment_failed_notice(
                booking.user_id,
                &format!("Your payment ended as '{}'; the booking was cancelled.", verified.status),
                booking.id,
            ))
            .await;
            let booking = self.require_booking(booking.id).await?;
            return Ok(ReconcileOutcome {
                target: ReconcileTarget::Booking(booking),
                disposition: ReconcileDisposition::Rejected(verified.status),
            });
        }

        let expected_minor = booking.price * 100;
        if verified.amount_minor != expected_minor {
            // Deliberate anti-fraud stance: a success status with the
            // wrong amount cancels the reservation.
            self.bookings
                .mark_payment_failed(booking.id, "amount mismatch", Utc::now())
                .await?;
            warn!(
                booking_id = %booking.id,
                expected = expected_minor,
                reported = verified.amount_minor,
                "Gateway amount mismatch; cancelling booking"
            );
            self.dispatch(payment_failed_notice(
                booking.user_id,
                "The paid amount did not match the booking price; the booking was cancelled.",
                booking.id,
            ))
            .await;
            return Err(AppError::amount_mismatch(format!(
                "Expected {expected_minor} minor units, gateway reported {}",
                verified.amount_minor
            )));
        }

        let changed = self
            .bookings
            .confirm_payment(booking.id, verified.transaction_id.as_deref(), Utc::now())
            .await?;
        let booking = self.require_booking(booking.id).await?;

        if changed {
            info!(booking_id = %booking.id, "Gateway payment confirmed");
            self.award_booking_points(&booking).await;
            self.dispatch(Notice {
                user_id: booking.user_id,
                title: "Payment received".to_string(),
                body: format!(
                    "Your booking on {} at {} is confirmed.",
                    booking.date,
                    booking.start_time.format("%H:%M")
                ),
                category: NotificationCategory::PaymentSuccess,
                deep_link: Some(format!("/bookings/{}", booking.id)),
            })
            .await;
        }

        Ok(ReconcileOutcome {
            target: ReconcileTarget::Booking(booking),
            disposition: if changed {
                ReconcileDisposition::Confirmed
            } else {
                ReconcileDisposition::AlreadyConfirmed
            },
        })
    }

    async fn reconcile_registration(
        &self,
        registration: TournamentRegistration,
        pidx: &str,
    ) -> AppResult<ReconcileOutcome> {
        if registration.payment_status == PaymentStatus::Paid {
            return Ok(ReconcileOutcome {
                target: ReconcileTarget::Registration(registration),
                disposition: ReconcileDisposition::AlreadyConfirmed,
            });
        }

        let tournament = self
            .tournaments
            .get(registration.tournament_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!(
                    "Tournament {} not found",
                    registration.tournament_id
                ))
            })?;

        let verified = match self.gateway.verify(pidx).await {
            Ok(v) => v,
            Err(err) => {
                self.registrations
                    .mark_payment_failed(registration.id, "gateway verification failed", Utc::now())
                    .await?;
                self.dispatch(registration_failed_notice(&registration, &tournament.name))
                    .await;
                return Err(err);
            }
        };

        if !verified.status.is_success() {
            self.registrations
                .mark_payment_failed(
                    registration.id,
                    &format!("payment {}", verified.status),
                    Utc::now(),
                )
                .await?;
            self.dispatch(registration_failed_notice(&registration, &tournament.name))
                .await;
            let registration = self.require_registration(registration.id).await?;
            return Ok(ReconcileOutcome {
                target: ReconcileTarget::Registration(registration),
                disposition: ReconcileDisposition::Rejected(verified.status),
            });
        }

        let expected_minor = tournament.registration_fee * 100;
        if verified.amount_minor != expected_minor {
            self.registrations
                .mark_payment_failed(registration.id, "amount mismatch", Utc::now())
                .await?;
            warn!(
                registration_id = %registration.id,
                expected = expected_minor,
                reported = verified.amount_minor,
                "Gateway amount mismatch; withdrawing registration"
            );
            self.dispatch(registration_failed_notice(&registration, &tournament.name))
                .await;
            return Err(AppError::amount_mismatch(format!(
                "Expected {expected_minor} minor units, gateway reported {}",
                verified.amount_minor
            )));
        }

        let changed = self
            .registrations
            .confirm_payment(registration.id, Utc::now())
            .await?;
        let registration = self.require_registration(registration.id).await?;

        if changed {
            // Only the caller that won the compare-and-set increments the
            // team counter, so duplicate callbacks cannot double-count.
            let teams = self
                .tournaments
                .increment_registered_teams(tournament.id)
                .await?;
            info!(
                registration_id = %registration.id,
                tournament_id = %tournament.id,
                teams,
                "Tournament registration confirmed"
            );
            self.dispatch(Notice {
                user_id: registration.user_id,
                title: "Registration confirmed".to_string(),
                body: format!(
                    "Team '{}' is registered for {}.",
                    registration.team_name, tournament.name
                ),
                category: NotificationCategory::TournamentRegistration,
                deep_link: Some(format!("/tournaments/{}", tournament.id)),
            })
            .await;
        }

        Ok(ReconcileOutcome {
            target: ReconcileTarget::Registration(registration),
            disposition: if changed {
                ReconcileDisposition::Confirmed
            } else {
                ReconcileDisposition::AlreadyConfirmed
            },
        })
    }

    /// Cancel a booking on behalf of its owner or an elevated role.
    ///
    /// Cancellation is non-financial: no refund and no points return.
    pub async fn cancel_booking(
        &self,
        ctx: &RequestContext,
        booking_id: BookingId,
        reason: &str,
    ) -> AppResult<Booking> {
        let booking = self.require_booking(booking_id).await?;
        if booking.user_id != ctx.user_id && !ctx.is_elevated() {
            return Err(AppError::authorization(
                "Only the booking owner or staff may cancel a booking",
            ));
        }

        let cancelled = self
            .bookings
            .cancel(booking_id, ctx.user_id, reason, Utc::now())
            .await?;
        info!(booking_id = %booking_id, by = %ctx.user_id, "Booking cancelled");
        self.dispatch(Notice {
            user_id: cancelled.user_id,
            title: "Booking cancelled".to_string(),
            body: format!(
                "Your booking on {} at {} was cancelled: {}",
                cancelled.date,
                cancelled.start_time.format("%H:%M"),
                reason
            ),
            category: NotificationCategory::BookingCancelled,
            deep_link: Some(format!("/bookings/{booking_id}")),
        })
        .await;
        Ok(cancelled)
    }

    /// Hide a finished booking from the owner's history view.
    pub async fn delete_from_history(
        &self,
        ctx: &RequestContext,
        booking_id: BookingId,
    ) -> AppResult<()> {
        let booking = self.require_booking(booking_id).await?;
        if booking.user_id != ctx.user_id {
            return Err(AppError::authorization(
                "Only the booking owner may edit their history",
            ));
        }
        if !booking.status.is_terminal() {
            return Err(AppError::conflict(
                "Only cancelled or completed bookings can be removed from history",
            ));
        }
        self.bookings
            .set_deleted_from_history(booking_id, Utc::now())
            .await?;
        Ok(())
    }

    /// The caller's booking history.
    pub async fn list_bookings(
        &self,
        ctx: &RequestContext,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Booking>> {
        self.bookings.list_for_user(ctx.user_id, page).await
    }

    /// Expire lapsed reservations (bookings and registrations).
    ///
    /// Paid records are immune: payment confirmation cleared their expiry
    /// timestamp in the same atomic update. Idempotent.
    pub async fn expire_due(&self, now: DateTime<Utc>) -> AppResult<SweepSummary> {
        let swept_bookings = self.bookings.sweep_expired(now).await?;
        for booking in &swept_bookings {
            self.dispatch(Notice {
                user_id: booking.user_id,
                title: "Reservation expired".to_string(),
                body: format!(
                    "Your unpaid booking on {} at {} expired and was released.",
                    booking.date,
                    booking.start_time.format("%H:%M")
                ),
                category: NotificationCategory::BookingCancelled,
                deep_link: Some(format!("/bookings/{}", booking.id)),
            })
            .await;
        }

        let swept_registrations = self.registrations.sweep_expired(now).await?;
        for registration in &swept_registrations {
            self.dispatch(Notice {
                user_id: registration.user_id,
                title: "Registration expired".to_string(),
                body: format!(
                    "The unpaid registration for team '{}' expired and was withdrawn.",
                    registration.team_name
                ),
                category: NotificationCategory::TournamentRegistration,
                deep_link: Some(format!("/tournaments/{}", registration.tournament_id)),
            })
            .await;
        }

        let summary = SweepSummary {
            bookings: swept_bookings.len(),
            registrations: swept_registrations.len(),
        };
        if summary.bookings > 0 || summary.registrations > 0 {
            info!(
                bookings = summary.bookings,
                registrations = summary.registrations,
                "Expiry sweep released lapsed reservations"
            );
        }
        Ok(summary)
    }

    /// Move confirmed bookings whose end time has passed to completed.
    pub async fn complete_finished(&self, now: DateTime<Utc>) -> AppResult<usize> {
        let completed = self.bookings.complete_finished(now).await?;
        Ok(completed.len())
    }

    /// Send upcoming-booking reminders that have not been sent yet.
    pub async fn send_due_reminders(&self, now: DateTime<Utc>) -> AppResult<usize> {
        let lead = Duration::minutes(self.booking_config.reminder_lead_minutes as i64);
        let due = self.bookings.claim_due_reminders(now, lead).await?;
        for booking in &due {
            self.dispatch(Notice {
                user_id: booking.user_id,
                title: "Upcoming booking".to_string(),
                body: format!(
                    "Your court is booked today at {}.",
                    booking.start_time.format("%H:%M")
                ),
                category: NotificationCategory::BookingReminder,
                deep_link: Some(format!("/bookings/{}", booking.id)),
            })
            .await;
        }
        Ok(due.len())
    }

    async fn award_booking_points(&self, booking: &Booking) {
        let divisor = self.booking_config.points_earn_divisor.max(1);
        let earned = booking.price / divisor;
        if earned <= 0 {
            return;
        }
        if let Err(err) = self
            .loyalty
            .credit(
                booking.user_id,
                earned,
                "booking payment reward",
                Some(booking.id),
            )
            .await
        {
            warn!(booking_id = %booking.id, error = %err, "Failed to award booking points");
        }
    }

    async fn require_booking(&self, id: BookingId) -> AppResult<Booking> {
        self.bookings
            .get(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Booking {id} not found")))
    }

    async fn require_registration(
        &self,
        id: courtbook_core::types::id::RegistrationId,
    ) -> AppResult<TournamentRegistration> {
        self.registrations
            .get(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Registration {id} not found")))
    }

    async fn dispatch(&self, notice: Notice) {
        if let Err(err) = self.notifier.notify(notice).await {
            warn!(error = %err, "Notification dispatch failed");
        }
    }
}

fn confirmation_notice(booking: &Booking) -> Notice {
    Notice {
        user_id: booking.user_id,
        title: "Booking confirmed".to_string(),
        body: format!(
            "Your booking on {} at {} is confirmed.",
            booking.date,
            booking.start_time.format("%H:%M")
        ),
        category: NotificationCategory::BookingConfirmed,
        deep_link: Some(format!("/bookings/{}", booking.id)),
    }
}

fn payment_failed_notice(user_id: UserId, body: &str, booking_id: BookingId) -> Notice {
    Notice {
        user_id,
        title: "Payment failed".to_string(),
        body: body.to_string(),
        category: NotificationCategory::PaymentFailed,
        deep_link: Some(format!("/bookings/{booking_id}")),
    }
}

fn registration_failed_notice(
    registration: &TournamentRegistration,
    tournament_name: &str,
) -> Notice {
    Notice {
        user_id: registration.user_id,
        title: "Payment failed".to_string(),
        body: format!(
            "The registration payment for team '{}' in {} failed; the registration was withdrawn.",
            registration.team_name, tournament_name
        ),
        category: NotificationCategory::PaymentFailed,
        deep_link: Some(format!("/tournaments/{}", registration.tournament_id)),
    }
}
