//! In-memory booking store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use tokio::sync::Mutex;

use courtbook_core::error::AppError;
use courtbook_core::result::AppResult;
use courtbook_core::types::id::{BookingId, CourtId, UserId};
use courtbook_core::types::pagination::{PageRequest, PageResponse};
use courtbook_entity::booking::{Booking, BookingStatus, PaymentStatus};

use crate::traits::BookingStore;

/// Identity of a bookable slot.
type SlotKey = (CourtId, NaiveDate, NaiveTime);

#[derive(Default)]
struct Inner {
    bookings: HashMap<BookingId, Booking>,
    /// Unique index over active bookings; the storage-level guarantee
    /// behind slot exclusivity.
    slots: HashMap<SlotKey, BookingId>,
}

impl Inner {
    fn release_slot(&mut self, booking: &Booking) {
        let key = (booking.court_id, booking.date, booking.start_time);
        if self.slots.get(&key) == Some(&booking.id) {
            self.slots.remove(&key);
        }
    }
}

/// In-memory [`BookingStore`] holding records and the slot index under
/// one mutex, so check and write are a single atomic step.
#[derive(Default)]
pub struct MemoryBookingStore {
    inner: Mutex<Inner>,
}

impl MemoryBookingStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookingStore for MemoryBookingStore {
    async fn insert(&self, booking: Booking) -> AppResult<Booking> {
        let mut inner = self.inner.lock().await;
        let key = (booking.court_id, booking.date, booking.start_time);
        if let Some(holder) = inner.slots.get(&key) {
            // A stale index entry cannot occur: every transition out of
            // an active status removes the entry under this same lock.
            let holder = *holder;
            if inner.bookings.get(&holder).is_some_and(Booking::is_active) {
                return Err(AppError::conflict(format!(
                    "Slot {} {} on court {} is already booked",
                    booking.date, booking.start_time, booking.court_id
                )));
            }
        }
        if booking.is_active() {
            inner.slots.insert(key, booking.id);
        }
        inner.bookings.insert(booking.id, booking.clone());
        Ok(booking)
    }

    async fn get(&self, id: BookingId) -> AppResult<Option<Booking>> {
        let inner = self.inner.lock().await;
        Ok(inner.bookings.get(&id).cloned())
    }

    async fn find_by_gateway_ref(&self, pidx: &str) -> AppResult<Option<Booking>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .bookings
            .values()
            .find(|b| b.gateway_ref.as_deref() == Some(pidx))
            .cloned())
    }

    async fn active_on_date(&self, court_id: CourtId, date: NaiveDate) -> AppResult<Vec<Booking>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .bookings
            .values()
            .filter(|b| b.court_id == court_id && b.date == date && b.is_active())
            .cloned()
            .collect())
    }

    async fn list_for_user(
        &self,
        user_id: UserId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Booking>> {
        let inner = self.inner.lock().await;
        let mut all: Vec<Booking> = inner
            .bookings
            .values()
            .filter(|b| b.user_id == user_id && !b.is_deleted_from_history)
            .cloned()
            .collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = all.len() as u64;
        let items = all
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok(PageResponse::new(items, page.page, page.page_size, total))
    }

    async fn set_gateway_ref(
        &self,
        id: BookingId,
        purchase_order_id: &str,
        pidx: &str,
    ) -> AppResult<()> {
        let mut inner = self.inner.lock().await;
        let booking = inner
            .bookings
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Booking {id} not found")))?;
        booking.purchase_order_id = Some(purchase_order_id.to_string());
        booking.gateway_ref = Some(pidx.to_string());
        Ok(())
    }

    async fn confirm_payment(
        &self,
        id: BookingId,
        txn_ref: Option<&str>,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        let mut inner = self.inner.lock().await;
        let booking = inner
            .bookings
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Booking {id} not found")))?;

        if booking.payment_status == PaymentStatus::Paid {
            return Ok(false);
        }
        if booking.status.is_terminal() {
            return Err(AppError::conflict(format!(
                "Booking {id} is {} and cannot be confirmed",
                booking.status
            )));
        }

        booking.payment_status = PaymentStatus::Paid;
        if booking.status == BookingStatus::Pending {
            booking.status = BookingStatus::Confirmed;
        }
        booking.reservation_expires_at = None;
        if let Some(txn) = txn_ref {
            booking.gateway_txn_ref = Some(txn.to_string());
        }
        booking.updated_at = now;
        Ok(true)
    }

    async fn mark_payment_failed(
        &self,
        id: BookingId,
        reason: &str,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        let mut inner = self.inner.lock().await;
        let mut booking = inner
            .bookings
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Booking {id} not found")))?;

        booking.payment_status = PaymentStatus::Failed;
        if !booking.status.is_terminal() {
            booking.status = BookingStatus::Cancelled;
            booking.cancellation_reason = Some(reason.to_string());
            booking.cancelled_at = Some(now);
        }
        booking.reservation_expires_at = None;
        booking.updated_at = now;

        inner.release_slot(&booking);
        inner.bookings.insert(id, booking);
        Ok(())
    }

    async fn cancel(
        &self,
        id: BookingId,
        by: UserId,
        reason: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Booking> {
        let mut inner = self.inner.lock().await;
        let mut booking = inner
            .bookings
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Booking {id} not found")))?;

        if !booking.status.can_transition_to(BookingStatus::Cancelled) {
            return Err(AppError::conflict(format!(
                "Booking {id} is {} and cannot be cancelled",
                booking.status
            )));
        }

        booking.status = BookingStatus::Cancelled;
        booking.cancellation_reason = Some(reason.to_string());
        booking.cancelled_by = Some(by);
        booking.cancelled_at = Some(now);
        booking.reservation_expires_at = None;
        booking.updated_at = now;

        inner.release_slot(&booking);
        inner.bookings.insert(id, booking.clone());
        Ok(booking)
    }

    async fn remove(&self, id: BookingId) -> AppResult<bool> {
        let mut inner = self.inner.lock().await;
        match inner.bookings.remove(&id) {
            Some(booking) => {
                inner.release_slot(&booking);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_deleted_from_history(&self, id: BookingId, now: DateTime<Utc>) -> AppResult<bool> {
        let mut inner = self.inner.lock().await;
        let Some(booking) = inner.bookings.get_mut(&id) else {
            return Ok(false);
        };
        if booking.is_deleted_from_history {
            return Ok(false);
        }
        booking.is_deleted_from_history = true;
        booking.updated_at = now;
        Ok(true)
    }

    async fn sweep_expired(&self, now: DateTime<Utc>) -> AppResult<Vec<Booking>> {
        let mut inner = self.inner.lock().await;
        let due: Vec<BookingId> = inner
            .bookings
            .values()
            .filter(|b| {
                b.payment_status != PaymentStatus::Paid
                    && !b.status.is_terminal()
                    && b.reservation_expires_at.is_some_and(|at| at < now)
            })
            .map(|b| b.id)
            .collect();

        let mut swept = Vec::with_capacity(due.len());
        for id in due {
            let Some(mut booking) = inner.bookings.get(&id).cloned() else {
                continue;
            };
            booking.status = BookingStatus::Cancelled;
            booking.payment_status = PaymentStatus::Failed;
            booking.cancellation_reason = Some("reservation expired".to_string());
            booking.cancelled_at = Some(now);
            booking.reservation_expires_at = None;
            booking.updated_at = now;
            inner.release_slot(&booking);
            inner.bookings.insert(id, booking.clone());
            swept.push(booking);
        }
        Ok(swept)
    }

    async fn complete_finished(&self, now: DateTime<Utc>) -> AppResult<Vec<Booking>> {
        let mut inner = self.inner.lock().await;
        let due: Vec<BookingId> = inner
            .bookings
            .values()
            .filter(|b| b.status == BookingStatus::Confirmed && b.end_instant() < now)
            .map(|b| b.id)
            .collect();

        let mut completed = Vec::with_capacity(due.len());
        for id in due {
            let Some(mut booking) = inner.bookings.get(&id).cloned() else {
                continue;
            };
            booking.status = BookingStatus::Completed;
            booking.updated_at = now;
            inner.release_slot(&booking);
            inner.bookings.insert(id, booking.clone());
            completed.push(booking);
        }
        Ok(completed)
    }

    async fn claim_due_reminders(
        &self,
        now: DateTime<Utc>,
        lead: Duration,
    ) -> AppResult<Vec<Booking>> {
        let mut inner = self.inner.lock().await;
        let due: Vec<BookingId> = inner
            .bookings
            .values()
            .filter(|b| {
                b.status == BookingStatus::Confirmed
                    && !b.reminder_sent
                    && b.start_instant() > now
                    && b.start_instant() <= now + lead
            })
            .map(|b| b.id)
            .collect();

        let mut claimed = Vec::with_capacity(due.len());
        for id in due {
            let Some(booking) = inner.bookings.get_mut(&id) else {
                continue;
            };
            booking.reminder_sent = true;
            booking.updated_at = now;
            claimed.push(booking.clone());
        }
        Ok(claimed)
    }
}
