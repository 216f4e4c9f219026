//! In-memory storage implementation
//!
//! Suitable for tests and short-lived processes.

use async_trait::async_trait;
use dashmap::DashMap;
use pokedex_core::{DexStore, PlayerId, PlayerSummary, Region, RegionalRecord, StorageError};
use tracing::trace;

/// In-memory implementation of [`DexStore`]
///
/// Uses `DashMap` for concurrent access to records and summaries.
#[derive(Debug, Default)]
pub struct InMemoryDexStore {
    /// Regional records keyed by (player, region)
    records: DashMap<(PlayerId, Region), RegionalRecord>,
    /// National summaries keyed by player
    summaries: DashMap<PlayerId, PlayerSummary>,
}

impl InMemoryDexStore {
    /// Create a new in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of players with a summary
    pub fn player_count(&self) -> usize {
        self.summaries.len()
    }

    /// Number of stored regional records across all players
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Check if the store holds nothing
    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.summaries.is_empty()
    }
}

#[async_trait]
impl DexStore for InMemoryDexStore {
    async fn load_regional_record(
        &self,
        player: PlayerId,
        region: Region,
    ) -> Result<Option<RegionalRecord>, StorageError> {
        Ok(self
            .records
            .get(&(player, region))
            .map(|entry| entry.value().clone()))
    }

    async fn save_regional_record(
        &self,
        player: PlayerId,
        region: Region,
        record: &RegionalRecord,
    ) -> Result<(), StorageError> {
        trace!(player = %player, region = %region, caught = record.caught_count(), "Storing regional record");
        self.records.insert((player, region), record.clone());
        Ok(())
    }

    async fn load_region_records(
        &self,
        region: Region,
    ) -> Result<Vec<(PlayerId, RegionalRecord)>, StorageError> {
        let mut records: Vec<_> = self
            .records
            .iter()
            .filter(|entry| entry.key().1 == region)
            .map(|entry| (entry.key().0, entry.value().clone()))
            .collect();
        records.sort_by_key(|(player, _)| *player);
        Ok(records)
    }

    async fn load_summary(&self, player: PlayerId) -> Result<Option<PlayerSummary>, StorageError> {
        Ok(self.summaries.get(&player).map(|entry| entry.value().clone()))
    }

    async fn save_summary(
        &self,
        player: PlayerId,
        summary: &PlayerSummary,
    ) -> Result<(), StorageError> {
        trace!(player = %player, total_caught = summary.total_caught, "Storing summary");
        self.summaries.insert(player, summary.clone());
        Ok(())
    }

    async fn list_summaries(&self) -> Result<Vec<PlayerSummary>, StorageError> {
        Ok(self
            .summaries
            .iter()
            .map(|entry| entry.value().clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_isolated_by_region() {
        let store = InMemoryDexStore::new();
        let player = PlayerId(8);

        let mut record = RegionalRecord::new(0);
        record.seen.set(3);
        store
            .save_regional_record(player, Region::Kalos, &record)
            .await
            .unwrap();

        assert_eq!(
            store.load_regional_record(player, Region::Kalos).await.unwrap(),
            Some(record)
        );
        assert!(store
            .load_regional_record(player, Region::Paldea)
            .await
            .unwrap()
            .is_none());
        assert_eq!(store.record_count(), 1);
    }

    #[tokio::test]
    async fn test_region_records_sorted_by_player() {
        let store = InMemoryDexStore::new();
        for id in [5u64, 1, 3] {
            store
                .save_regional_record(PlayerId(id), Region::Hoenn, &RegionalRecord::new(0))
                .await
                .unwrap();
        }
        store
            .save_regional_record(PlayerId(9), Region::Kanto, &RegionalRecord::new(0))
            .await
            .unwrap();

        let ids: Vec<_> = store
            .load_region_records(Region::Hoenn)
            .await
            .unwrap()
            .into_iter()
            .map(|(player, _)| player.0)
            .collect();
        assert_eq!(ids, vec![1, 3, 5]);
    }

    #[tokio::test]
    async fn test_empty_scan() {
        let store = InMemoryDexStore::new();
        let scan = store.load_all_regional_records(PlayerId(1)).await.unwrap();
        assert!(scan.records.is_empty());
        assert!(scan.unreadable.is_empty());
        assert!(store.is_empty());
    }
}
