//! Minimal store used by unit tests in this crate

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::StorageError;
use crate::record::{PlayerId, PlayerSummary, RegionalRecord};
use crate::region::Region;
use crate::traits::DexStore;

#[derive(Default)]
pub struct TestStore {
    records: Mutex<HashMap<(PlayerId, Region), RegionalRecord>>,
    summaries: Mutex<HashMap<PlayerId, PlayerSummary>>,
    corrupt: Mutex<HashSet<(PlayerId, Region)>>,
    fail_summaries: Mutex<bool>,
}

impl TestStore {
    pub fn corrupt(&self, player: PlayerId, region: Region) {
        self.corrupt.lock().unwrap().insert((player, region));
    }

    pub fn fail_summary_listing(&self) {
        *self.fail_summaries.lock().unwrap() = true;
    }
}

#[async_trait]
impl DexStore for TestStore {
    async fn load_regional_record(
        &self,
        player: PlayerId,
        region: Region,
    ) -> Result<Option<RegionalRecord>, StorageError> {
        if self.corrupt.lock().unwrap().contains(&(player, region)) {
            return Err(StorageError::deserialization("bad bytes"));
        }
        Ok(self.records.lock().unwrap().get(&(player, region)).cloned())
    }

    async fn save_regional_record(
        &self,
        player: PlayerId,
        region: Region,
        record: &RegionalRecord,
    ) -> Result<(), StorageError> {
        self.records
            .lock()
            .unwrap()
            .insert((player, region), record.clone());
        Ok(())
    }

    async fn load_region_records(
        &self,
        region: Region,
    ) -> Result<Vec<(PlayerId, RegionalRecord)>, StorageError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|((_, r), _)| *r == region)
            .map(|((player, _), record)| (*player, record.clone()))
            .collect())
    }

    async fn load_summary(&self, player: PlayerId) -> Result<Option<PlayerSummary>, StorageError> {
        Ok(self.summaries.lock().unwrap().get(&player).cloned())
    }

    async fn save_summary(
        &self,
        player: PlayerId,
        summary: &PlayerSummary,
    ) -> Result<(), StorageError> {
        self.summaries
            .lock()
            .unwrap()
            .insert(player, summary.clone());
        Ok(())
    }

    async fn list_summaries(&self) -> Result<Vec<PlayerSummary>, StorageError> {
        if *self.fail_summaries.lock().unwrap() {
            return Err(StorageError::database("unavailable"));
        }
        Ok(self.summaries.lock().unwrap().values().cloned().collect())
    }
}
