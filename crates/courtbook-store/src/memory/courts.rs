//! In-memory court store.

use async_trait::async_trait;
use dashmap::DashMap;

use courtbook_core::result::AppResult;
use courtbook_core::types::id::CourtId;
use courtbook_entity::court::Court;

use crate::traits::CourtStore;

/// In-memory [`CourtStore`].
#[derive(Default)]
pub struct MemoryCourtStore {
    courts: DashMap<CourtId, Court>,
}

impl MemoryCourtStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CourtStore for MemoryCourtStore {
    async fn insert(&self, court: Court) -> AppResult<Court> {
        court.pricing.validate()?;
        self.courts.insert(court.id, court.clone());
        Ok(court)
    }

    async fn get(&self, id: CourtId) -> AppResult<Option<Court>> {
        Ok(self.courts.get(&id).map(|c| c.value().clone()))
    }
}
