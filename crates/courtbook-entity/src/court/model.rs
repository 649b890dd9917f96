//! Court entity model.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use courtbook_core::types::id::CourtId;

use super::pricing::CourtPricing;

/// A bookable futsal court.
///
/// Court CRUD is an external concern; the booking core only reads the
/// fields that drive availability, pricing, and settlement rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Court {
    /// Unique court identifier.
    pub id: CourtId,
    /// Display name.
    pub name: String,
    /// Daily opening time (inclusive).
    pub opening_time: NaiveTime,
    /// Daily closing time (inclusive boundary for a slot's end).
    pub closing_time: NaiveTime,
    /// Whether the venue requires payment before play. When set, the
    /// free-quota and pay-at-venue settlement paths are unavailable.
    pub requires_prepayment: bool,
    /// Pricing schedule.
    pub pricing: CourtPricing,
}
