//! Advisory availability check for a requested slot.
//!
//! The check runs before a booking is created so callers fail fast, but
//! it is not the correctness mechanism: two requests can race between
//! check and write. The authoritative guarantee is the store-level
//! unique-slot rejection on insert.

use chrono::{NaiveDate, NaiveTime};

use courtbook_entity::booking::Booking;
use courtbook_entity::court::Court;

/// Why a slot is not bookable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnavailableReason {
    /// The requested window is outside the court's operating hours.
    OutsideOperatingHours,
    /// An active booking already holds the slot.
    SlotTaken,
}

/// Outcome of an availability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    /// The slot can be requested.
    Available,
    /// The slot cannot be booked, with the first failing reason.
    Unavailable(UnavailableReason),
}

/// Check whether a slot is bookable.
///
/// Order of checks: (a) the window must sit fully inside operating hours
/// (start inclusive, the closing boundary inclusive for the end); (b) no
/// non-cancelled booking with the identical start time may exist for the
/// court and date.
pub fn check(
    court: &Court,
    _date: NaiveDate,
    start_time: NaiveTime,
    end_time: NaiveTime,
    existing: &[Booking],
) -> Availability {
    if start_time < court.opening_time || end_time > court.closing_time {
        return Availability::Unavailable(UnavailableReason::OutsideOperatingHours);
    }
    let taken = existing
        .iter()
        .any(|b| b.start_time == start_time && b.is_active());
    if taken {
        return Availability::Unavailable(UnavailableReason::SlotTaken);
    }
    Availability::Available
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use courtbook_core::types::id::{CourtId, UserId};
    use courtbook_entity::booking::{
        BookingStatus, NewBooking, PaymentMethod, PaymentStatus, PriceType,
    };
    use courtbook_entity::court::CourtPricing;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn court() -> Court {
        Court {
            id: CourtId::new(),
            name: "Court A".to_string(),
            opening_time: t(6, 0),
            closing_time: t(22, 0),
            requires_prepayment: false,
            pricing: CourtPricing::flat(1000),
        }
    }

    fn booking_at(court_id: CourtId, start: NaiveTime, status: BookingStatus) -> Booking {
        let now = Utc::now();
        let mut b = NewBooking {
            court_id,
            user_id: UserId::new(),
            date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            start_time: start,
            end_time: t(23, 0),
            price: 1000,
            price_type: PriceType::Regular,
            payment_method: PaymentMethod::Offline,
        }
        .into_booking(BookingStatus::Confirmed, PaymentStatus::Unpaid, now);
        b.status = status;
        b
    }

    #[test]
    fn test_window_inside_hours_is_available() {
        let c = court();
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        assert_eq!(
            check(&c, date, t(9, 0), t(10, 0), &[]),
            Availability::Available
        );
    }

    #[test]
    fn test_closing_boundary_is_inclusive() {
        let c = court();
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        assert_eq!(
            check(&c, date, t(21, 0), t(22, 0), &[]),
            Availability::Available
        );
        assert_eq!(
            check(&c, date, t(21, 30), t(22, 30), &[]),
            Availability::Unavailable(UnavailableReason::OutsideOperatingHours)
        );
    }

    #[test]
    fn test_before_opening_is_unavailable() {
        let c = court();
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        assert_eq!(
            check(&c, date, t(5, 0), t(6, 0), &[]),
            Availability::Unavailable(UnavailableReason::OutsideOperatingHours)
        );
    }

    #[test]
    fn test_taken_slot_is_unavailable() {
        let c = court();
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let existing = vec![booking_at(c.id, t(9, 0), BookingStatus::Confirmed)];
        assert_eq!(
            check(&c, date, t(9, 0), t(10, 0), &existing),
            Availability::Unavailable(UnavailableReason::SlotTaken)
        );
    }

    #[test]
    fn test_cancelled_booking_frees_the_slot() {
        let c = court();
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let existing = vec![booking_at(c.id, t(9, 0), BookingStatus::Cancelled)];
        assert_eq!(
            check(&c, date, t(9, 0), t(10, 0), &existing),
            Availability::Available
        );
    }
}
