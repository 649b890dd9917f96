//! Clock-time helpers for the `HH:mm` wire format.
//!
//! Booking slots and court operating hours are exchanged as `HH:mm`
//! strings at the API boundary and carried internally as
//! [`chrono::NaiveTime`] with minute precision.

use chrono::NaiveTime;

use crate::error::AppError;
use crate::result::AppResult;

/// Parse an `HH:mm` string into a [`NaiveTime`].
pub fn parse_hhmm(value: &str) -> AppResult<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| AppError::validation(format!("Invalid time '{value}', expected HH:mm")))
}

/// Format a [`NaiveTime`] as `HH:mm`.
pub fn format_hhmm(value: NaiveTime) -> String {
    value.format("%H:%M").to_string()
}
