//! Persistent storage implementation
//!
//! [`RedbDexStore`] keeps every regional record and summary in a single redb
//! database file. Each write is its own committed transaction.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use pokedex_core::{DexStore, PlayerId, PlayerSummary, Region, RegionalRecord, StorageError};
use tracing::{info, trace};

use crate::structured::{RedbStorage, RedbStorageConfig, RegionalRecordTable, SummaryTable};

/// redb-backed implementation of [`DexStore`]
pub struct RedbDexStore {
    records: RegionalRecordTable,
    summaries: SummaryTable,
}

impl RedbDexStore {
    /// Open or create a store with the given configuration
    pub fn open(config: RedbStorageConfig) -> Result<Self, StorageError> {
        let storage = Arc::new(RedbStorage::open(config)?);
        let summaries = SummaryTable::new(storage.clone());
        info!(players = summaries.count()?, "Opened dex store");
        Ok(Self {
            records: RegionalRecordTable::new(storage),
            summaries,
        })
    }

    /// Open or create a store at `path` with default cache settings
    pub fn open_path(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        Self::open(RedbStorageConfig {
            db_path: path.as_ref().to_path_buf(),
            ..Default::default()
        })
    }

    /// Direct access to the regional record tables
    pub fn records(&self) -> &RegionalRecordTable {
        &self.records
    }
}

#[async_trait]
impl DexStore for RedbDexStore {
    async fn load_regional_record(
        &self,
        player: PlayerId,
        region: Region,
    ) -> Result<Option<RegionalRecord>, StorageError> {
        trace!(player = %player, region = %region, "Loading regional record");
        self.records.get(player, region)
    }

    async fn save_regional_record(
        &self,
        player: PlayerId,
        region: Region,
        record: &RegionalRecord,
    ) -> Result<(), StorageError> {
        self.records.upsert(player, region, record)
    }

    async fn load_region_records(
        &self,
        region: Region,
    ) -> Result<Vec<(PlayerId, RegionalRecord)>, StorageError> {
        self.records.list_region(region)
    }

    async fn load_summary(&self, player: PlayerId) -> Result<Option<PlayerSummary>, StorageError> {
        self.summaries.get(player)
    }

    async fn save_summary(
        &self,
        player: PlayerId,
        summary: &PlayerSummary,
    ) -> Result<(), StorageError> {
        self.summaries.upsert(player, summary)
    }

    async fn list_summaries(&self) -> Result<Vec<PlayerSummary>, StorageError> {
        self.summaries.list()
    }
}
