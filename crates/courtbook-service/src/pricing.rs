//! Slot price derivation from a court's pricing schedule.

use chrono::NaiveTime;

use courtbook_entity::booking::PriceType;
use courtbook_entity::court::CourtPricing;

/// A derived price and the tier it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    /// Price in whole currency units.
    pub price: i64,
    /// The tier that produced the price.
    pub price_type: PriceType,
}

/// Derive the price for a slot starting at `start_time`.
///
/// Peak wins over off-peak, off-peak over regular. Windows never overlap
/// (validated when the court is configured). A window without a
/// configured rate falls back to the regular rate and tier. There are no
/// error paths.
pub fn quote(pricing: &CourtPricing, start_time: NaiveTime) -> Quote {
    if let Some(peak) = &pricing.peak {
        if peak.contains(start_time) {
            if let Some(rate) = peak.rate {
                return Quote {
                    price: rate,
                    price_type: PriceType::Peak,
                };
            }
        }
    }
    if let Some(off_peak) = &pricing.off_peak {
        if off_peak.contains(start_time) {
            if let Some(rate) = off_peak.rate {
                return Quote {
                    price: rate,
                    price_type: PriceType::OffPeak,
                };
            }
        }
    }
    Quote {
        price: pricing.hourly_rate,
        price_type: PriceType::Regular,
    }
}
