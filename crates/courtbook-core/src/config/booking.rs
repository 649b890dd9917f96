//! Reservation and settlement configuration.

use serde::{Deserialize, Serialize};

/// Booking engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingConfig {
    /// How long an unpaid gateway reservation is held before expiry,
    /// in minutes.
    #[serde(default = "default_reservation_ttl")]
    pub reservation_ttl_minutes: u64,
    /// Complimentary bookings each user may make per calendar day.
    #[serde(default = "default_daily_free_slots")]
    pub daily_free_slots: u32,
    /// Divisor applied to the price when paying with points
    /// (points cost = price / divisor, rounded half-up).
    #[serde(default = "default_points_divisor")]
    pub points_divisor: i64,
    /// Divisor applied to the price when awarding points for a
    /// gateway-paid booking (points earned = price / divisor).
    #[serde(default = "default_points_earn_divisor")]
    pub points_earn_divisor: i64,
    /// How long before the start time a booking reminder is sent,
    /// in minutes.
    #[serde(default = "default_reminder_lead")]
    pub reminder_lead_minutes: u64,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            reservation_ttl_minutes: default_reservation_ttl(),
            daily_free_slots: default_daily_free_slots(),
            points_divisor: default_points_divisor(),
            points_earn_divisor: default_points_earn_divisor(),
            reminder_lead_minutes: default_reminder_lead(),
        }
    }
}

fn default_reservation_ttl() -> u64 {
    15
}

fn default_daily_free_slots() -> u32 {
    2
}

fn default_points_divisor() -> i64 {
    10
}

fn default_points_earn_divisor() -> i64 {
    10
}

fn default_reminder_lead() -> u64 {
    60
}
