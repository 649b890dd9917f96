//! Booking entity model.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use courtbook_core::types::id::{BookingId, CourtId, UserId};

use super::status::{BookingStatus, PaymentMethod, PaymentStatus, PriceType};

/// A court reservation for one slot.
///
/// At most one booking whose status is not `Cancelled` may exist for a
/// given (court, date, start time); the store layer enforces this with a
/// unique slot index, not the availability pre-check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    /// Unique booking identifier.
    pub id: BookingId,
    /// The court being reserved.
    pub court_id: CourtId,
    /// The user holding the reservation.
    pub user_id: UserId,
    /// Calendar day of the slot (UTC).
    pub date: NaiveDate,
    /// Slot start time, minute precision.
    pub start_time: NaiveTime,
    /// Slot end time, minute precision.
    pub end_time: NaiveTime,
    /// Price in whole currency units. Authoritative; derived server-side.
    pub price: i64,
    /// The pricing tier the price was derived from.
    pub price_type: PriceType,
    /// Lifecycle status.
    pub status: BookingStatus,
    /// Settlement state.
    pub payment_status: PaymentStatus,
    /// Settlement path.
    pub payment_method: PaymentMethod,
    /// Merchant order reference sent to the gateway (unique).
    pub purchase_order_id: Option<String>,
    /// Opaque gateway payment reference (pidx).
    pub gateway_ref: Option<String>,
    /// Gateway transaction id recorded at verification.
    pub gateway_txn_ref: Option<String>,
    /// Loyalty points redeemed for this booking.
    pub points_used: i64,
    /// When an unpaid reservation lapses. Cleared atomically with payment
    /// confirmation so a paid booking can never expire.
    pub reservation_expires_at: Option<DateTime<Utc>>,
    /// Whether the upcoming-booking reminder has been sent.
    pub reminder_sent: bool,
    /// Logical deletion flag for the owner's history view.
    pub is_deleted_from_history: bool,
    /// Why the booking was cancelled, if it was.
    pub cancellation_reason: Option<String>,
    /// Who cancelled the booking, if anyone.
    pub cancelled_by: Option<UserId>,
    /// When the booking was cancelled.
    pub cancelled_at: Option<DateTime<Utc>>,
    /// When the booking was created.
    pub created_at: DateTime<Utc>,
    /// When the booking was last modified.
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Whether the booking still occupies its slot.
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// The instant the booked slot ends.
    pub fn end_instant(&self) -> DateTime<Utc> {
        self.date.and_time(self.end_time).and_utc()
    }

    /// The instant the booked slot starts.
    pub fn start_instant(&self) -> DateTime<Utc> {
        self.date.and_time(self.start_time).and_utc()
    }
}

/// Data required to create a booking record.
///
/// The coordinator fills in status, settlement, and bookkeeping fields
/// according to the chosen settlement path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBooking {
    /// The court being reserved.
    pub court_id: CourtId,
    /// The user holding the reservation.
    pub user_id: UserId,
    /// Calendar day of the slot (UTC).
    pub date: NaiveDate,
    /// Slot start time.
    pub start_time: NaiveTime,
    /// Slot end time.
    pub end_time: NaiveTime,
    /// Derived price in whole currency units.
    pub price: i64,
    /// Derived pricing tier.
    pub price_type: PriceType,
    /// Settlement path.
    pub payment_method: PaymentMethod,
}

impl NewBooking {
    /// Materialize a full booking record in its initial state.
    pub fn into_booking(
        self,
        status: BookingStatus,
        payment_status: PaymentStatus,
        now: DateTime<Utc>,
    ) -> Booking {
        Booking {
            id: BookingId::new(),
            court_id: self.court_id,
            user_id: self.user_id,
            date: self.date,
            start_time: self.start_time,
            end_time: self.end_time,
            price: self.price,
            price_type: self.price_type,
            status,
            payment_status,
            payment_method: self.payment_method,
            purchase_order_id: None,
            gateway_ref: None,
            gateway_txn_ref: None,
            points_used: 0,
            reservation_expires_at: None,
            reminder_sent: false,
            is_deleted_from_history: false,
            cancellation_reason: None,
            cancelled_by: None,
            cancelled_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}
