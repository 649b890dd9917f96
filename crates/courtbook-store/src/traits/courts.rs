//! Court repository trait.

use async_trait::async_trait;

use courtbook_core::result::AppResult;
use courtbook_core::types::id::CourtId;
use courtbook_entity::court::Court;

/// Read access to court configuration.
///
/// Court CRUD belongs to the admin surface outside this core; the booking
/// engine only reads availability, pricing, and settlement rules.
#[async_trait]
pub trait CourtStore: Send + Sync + 'static {
    /// Persist a court. Validates the pricing schedule.
    async fn insert(&self, court: Court) -> AppResult<Court>;

    /// Find a court by id.
    async fn get(&self, id: CourtId) -> AppResult<Option<Court>>;
}
