//! Player summary storage

use std::sync::Arc;

use pokedex_core::{PlayerId, PlayerSummary, StorageError};
use tracing::{debug, warn};

use super::tables::{PLAYER_SUMMARIES, RedbStorage};

/// National summary table access
pub struct SummaryTable {
    storage: Arc<RedbStorage>,
}

impl SummaryTable {
    /// Create a new summary table
    pub fn new(storage: Arc<RedbStorage>) -> Self {
        Self { storage }
    }

    /// Insert or replace a summary
    pub fn upsert(&self, player: PlayerId, summary: &PlayerSummary) -> Result<(), StorageError> {
        let value = postcard::to_allocvec(summary)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        self.storage
            .put(PLAYER_SUMMARIES, &player.to_key_bytes(), &value)?;
        debug!(player = %player, total_caught = summary.total_caught, "Updated player summary");
        Ok(())
    }

    /// Get a summary
    pub fn get(&self, player: PlayerId) -> Result<Option<PlayerSummary>, StorageError> {
        match self.storage.get(PLAYER_SUMMARIES, &player.to_key_bytes())? {
            Some(value) => {
                let summary: PlayerSummary = postcard::from_bytes(&value)
                    .map_err(|e| StorageError::Deserialization(e.to_string()))?;
                Ok(Some(summary))
            }
            None => Ok(None),
        }
    }

    /// All decodable summaries
    pub fn list(&self) -> Result<Vec<PlayerSummary>, StorageError> {
        let entries = self.storage.scan_all(PLAYER_SUMMARIES)?;
        let mut summaries = Vec::with_capacity(entries.len());

        for (_, value) in entries {
            match postcard::from_bytes::<PlayerSummary>(&value) {
                Ok(summary) => summaries.push(summary),
                Err(e) => warn!(error = %e, "Skipping unreadable player summary"),
            }
        }

        Ok(summaries)
    }

    /// Number of stored summaries
    pub fn count(&self) -> Result<usize, StorageError> {
        self.storage.count(PLAYER_SUMMARIES)
    }
}
