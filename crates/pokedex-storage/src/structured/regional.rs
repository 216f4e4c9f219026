//! Regional record storage
//!
//! Stores each player's caught/seen bitsets, one redb table per region.

use std::sync::Arc;

use pokedex_core::{PlayerId, Region, RegionalRecord, StorageError};
use tracing::debug;

use super::tables::{RedbStorage, regional_table};

/// Regional record table access
pub struct RegionalRecordTable {
    storage: Arc<RedbStorage>,
}

impl RegionalRecordTable {
    /// Create a new regional record table
    pub fn new(storage: Arc<RedbStorage>) -> Self {
        Self { storage }
    }

    /// Insert or replace a record
    pub fn upsert(
        &self,
        player: PlayerId,
        region: Region,
        record: &RegionalRecord,
    ) -> Result<(), StorageError> {
        let value = postcard::to_allocvec(record)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        self.storage
            .put(regional_table(region), &player.to_key_bytes(), &value)?;
        debug!(player = %player, region = %region, "Updated regional record");
        Ok(())
    }

    /// Get a record
    pub fn get(
        &self,
        player: PlayerId,
        region: Region,
    ) -> Result<Option<RegionalRecord>, StorageError> {
        match self
            .storage
            .get(regional_table(region), &player.to_key_bytes())?
        {
            Some(value) => {
                let record: RegionalRecord = postcard::from_bytes(&value)
                    .map_err(|e| StorageError::Deserialization(e.to_string()))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// Every decodable record in a region
    ///
    /// Entries with a malformed key or value are skipped.
    pub fn list_region(&self, region: Region) -> Result<Vec<(PlayerId, RegionalRecord)>, StorageError> {
        let entries = self.storage.scan_all(regional_table(region))?;
        let mut records = Vec::with_capacity(entries.len());

        for (key, value) in entries {
            let Some(player) = PlayerId::from_key_bytes(&key) else {
                debug!(region = %region, "Skipping record with malformed key");
                continue;
            };
            match postcard::from_bytes::<RegionalRecord>(&value) {
                Ok(record) => records.push((player, record)),
                Err(e) => debug!(player = %player, region = %region, error = %e, "Skipping unreadable record"),
            }
        }

        Ok(records)
    }

    /// Store raw bytes for a record, bypassing encoding
    ///
    /// Used to simulate damaged rows.
    pub fn put_raw(&self, player: PlayerId, region: Region, bytes: &[u8]) -> Result<(), StorageError> {
        self.storage
            .put(regional_table(region), &player.to_key_bytes(), bytes)
    }
}
