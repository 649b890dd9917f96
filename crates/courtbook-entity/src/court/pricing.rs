//! Court pricing schedule.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use courtbook_core::{AppError, AppResult};

/// A time-bounded rate override (peak or off-peak).
///
/// The window is start-inclusive, end-exclusive. A window without a rate
/// is allowed; pricing falls back to the regular rate for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateWindow {
    /// Window start (inclusive).
    pub start: NaiveTime,
    /// Window end (exclusive).
    pub end: NaiveTime,
    /// Hourly rate inside the window, whole currency units.
    pub rate: Option<i64>,
}

impl RateWindow {
    /// Whether `time` falls inside the window.
    pub fn contains(&self, time: NaiveTime) -> bool {
        self.start <= time && time < self.end
    }

    fn overlaps(&self, other: &RateWindow) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// The pricing schedule of a court.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourtPricing {
    /// Standard hourly rate, whole currency units.
    pub hourly_rate: i64,
    /// Optional peak-hours override.
    pub peak: Option<RateWindow>,
    /// Optional off-peak override.
    pub off_peak: Option<RateWindow>,
}

impl CourtPricing {
    /// A flat schedule with no peak or off-peak windows.
    pub fn flat(hourly_rate: i64) -> Self {
        Self {
            hourly_rate,
            peak: None,
            off_peak: None,
        }
    }

    /// Validate the schedule at court-configuration time.
    ///
    /// Rates must be non-negative and the peak and off-peak windows must
    /// never overlap. The price calculator itself performs no validation.
    pub fn validate(&self) -> AppResult<()> {
        if self.hourly_rate < 0 {
            return Err(AppError::validation("Hourly rate must not be negative"));
        }
        for (name, window) in [("peak", &self.peak), ("off_peak", &self.off_peak)] {
            if let Some(w) = window {
                if w.start >= w.end {
                    return Err(AppError::validation(format!(
                        "The {name} window must start before it ends"
                    )));
                }
                if w.rate.is_some_and(|r| r < 0) {
                    return Err(AppError::validation(format!(
                        "The {name} rate must not be negative"
                    )));
                }
            }
        }
        if let (Some(peak), Some(off_peak)) = (&self.peak, &self.off_peak) {
            if peak.overlaps(off_peak) {
                return Err(AppError::validation(
                    "Peak and off-peak windows must not overlap",
                ));
            }
        }
        Ok(())
    }
}
