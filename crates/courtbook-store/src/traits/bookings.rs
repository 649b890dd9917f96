//! Booking repository trait.

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};

use courtbook_core::result::AppResult;
use courtbook_core::types::id::{BookingId, CourtId, UserId};
use courtbook_core::types::pagination::{PageRequest, PageResponse};
use courtbook_entity::booking::Booking;

/// Repository for booking records.
///
/// Implementations own the exclusivity guarantee: `insert` must reject a
/// booking whose (court, date, start time) collides with an existing
/// non-cancelled booking with `ErrorKind::Conflict`, atomically with the
/// write. The availability pre-check in the service layer is advisory
/// only.
#[async_trait]
pub trait BookingStore: Send + Sync + 'static {
    /// Persist a new booking, claiming its slot.
    ///
    /// Fails with `Conflict` when the slot is already held by an active
    /// booking.
    async fn insert(&self, booking: Booking) -> AppResult<Booking>;

    /// Find a booking by id.
    async fn get(&self, id: BookingId) -> AppResult<Option<Booking>>;

    /// Find a booking by its gateway payment reference.
    async fn find_by_gateway_ref(&self, pidx: &str) -> AppResult<Option<Booking>>;

    /// All non-cancelled bookings for a court on a date.
    async fn active_on_date(&self, court_id: CourtId, date: NaiveDate) -> AppResult<Vec<Booking>>;

    /// The user's booking history, newest first, excluding entries the
    /// user deleted from history.
    async fn list_for_user(
        &self,
        user_id: UserId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Booking>>;

    /// Record the gateway order reference and pidx on a pending booking.
    async fn set_gateway_ref(
        &self,
        id: BookingId,
        purchase_order_id: &str,
        pidx: &str,
    ) -> AppResult<()>;

    /// Compare-and-set payment confirmation.
    ///
    /// In one atomic update: mark the payment paid, move the booking to
    /// confirmed, clear `reservation_expires_at`, and record the gateway
    /// transaction reference. Returns `false` without mutating when the
    /// booking is already paid (idempotent duplicate callbacks); fails
    /// with `Conflict` when the booking is in a terminal state.
    async fn confirm_payment(
        &self,
        id: BookingId,
        txn_ref: Option<&str>,
        now: DateTime<Utc>,
    ) -> AppResult<bool>;

    /// Mark the payment failed and cancel the booking (terminal).
    async fn mark_payment_failed(
        &self,
        id: BookingId,
        reason: &str,
        now: DateTime<Utc>,
    ) -> AppResult<()>;

    /// Cancel a booking, releasing its slot.
    ///
    /// Fails with `Conflict` when the booking is already cancelled or
    /// completed.
    async fn cancel(
        &self,
        id: BookingId,
        by: UserId,
        reason: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Booking>;

    /// Physically remove a booking record.
    ///
    /// Only used to unwind a slot claim when a settlement step fails
    /// before the booking was ever observable.
    async fn remove(&self, id: BookingId) -> AppResult<bool>;

    /// Hide a terminal booking from the owner's history view.
    async fn set_deleted_from_history(&self, id: BookingId, now: DateTime<Utc>) -> AppResult<bool>;

    /// Expire lapsed reservations.
    ///
    /// Cancels every booking whose `reservation_expires_at` is before
    /// `now` and whose payment is not paid, and returns them. Paid
    /// bookings are protected by the cleared expiry timestamp. Running
    /// the sweep twice is a no-op.
    async fn sweep_expired(&self, now: DateTime<Utc>) -> AppResult<Vec<Booking>>;

    /// Move confirmed bookings whose end time has passed to completed,
    /// returning them.
    async fn complete_finished(&self, now: DateTime<Utc>) -> AppResult<Vec<Booking>>;

    /// Claim confirmed bookings starting within `lead` of `now` whose
    /// reminder has not been sent, atomically setting `reminder_sent`.
    async fn claim_due_reminders(
        &self,
        now: DateTime<Utc>,
        lead: Duration,
    ) -> AppResult<Vec<Booking>>;
}
