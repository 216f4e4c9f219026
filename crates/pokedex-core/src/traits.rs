//! Core traits
//!
//! - [`DexStore`]: persistence of regional records and national summaries
//! - [`Clock`]: wall-clock abstraction for testability

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use tracing::debug;

use crate::aggregation::RegionalScan;
use crate::error::StorageError;
use crate::leaderboard::{LeaderboardOrder, rank_summaries};
use crate::record::{PlayerId, PlayerSummary, RegionalRecord};
use crate::region::Region;

/// Storage abstraction for Pokedex state
///
/// Records are addressed by the validated [`Region`] enum only; backends map
/// each variant to a fixed table or key space and never derive storage
/// identifiers from caller input.
#[async_trait]
pub trait DexStore: Send + Sync {
    /// Load a player's record for one region, `None` if it was never created
    async fn load_regional_record(
        &self,
        player: PlayerId,
        region: Region,
    ) -> Result<Option<RegionalRecord>, StorageError>;

    /// Insert or replace a player's record for one region
    async fn save_regional_record(
        &self,
        player: PlayerId,
        region: Region,
        record: &RegionalRecord,
    ) -> Result<(), StorageError>;

    /// Load every region's record for a player
    ///
    /// Regions without a record are absent from the scan. Regions whose stored
    /// value cannot be decoded are listed in [`RegionalScan::unreadable`];
    /// any other storage failure aborts the scan.
    async fn load_all_regional_records(&self, player: PlayerId) -> Result<RegionalScan, StorageError> {
        let mut scan = RegionalScan::default();
        for region in Region::ALL {
            match self.load_regional_record(player, region).await {
                Ok(Some(record)) => scan.records.push((region, record)),
                Ok(None) => {}
                Err(e) if e.is_unreadable() => {
                    debug!(player = %player, region = %region, error = %e, "Unreadable regional record");
                    scan.unreadable.push(region);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(scan)
    }

    /// Every player's record for one region
    async fn load_region_records(
        &self,
        region: Region,
    ) -> Result<Vec<(PlayerId, RegionalRecord)>, StorageError>;

    /// Load a player's national summary
    async fn load_summary(&self, player: PlayerId) -> Result<Option<PlayerSummary>, StorageError>;

    /// Insert or replace a player's national summary
    async fn save_summary(
        &self,
        player: PlayerId,
        summary: &PlayerSummary,
    ) -> Result<(), StorageError>;

    /// All stored summaries, in no particular order
    async fn list_summaries(&self) -> Result<Vec<PlayerSummary>, StorageError>;

    /// Summaries sorted by `order`, truncated to `limit`
    async fn list_players_ranked_by_summary(
        &self,
        order: LeaderboardOrder,
        limit: usize,
    ) -> Result<Vec<PlayerSummary>, StorageError> {
        let summaries = self.list_summaries().await?;
        Ok(rank_summaries(summaries, order, limit))
    }

    /// Number of players whose total caught is strictly greater than `threshold`
    async fn count_players_with_greater_catch_total(
        &self,
        threshold: u32,
    ) -> Result<u64, StorageError> {
        let summaries = self.list_summaries().await?;
        Ok(summaries
            .iter()
            .filter(|summary| summary.total_caught > threshold)
            .count() as u64)
    }
}

/// Time source for record timestamps
pub trait Clock: Send + Sync {
    /// Current time as Unix milliseconds
    fn now_millis(&self) -> i64;
}

/// Real clock implementation using system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Manually advanced clock for tests and replays
#[derive(Debug, Default)]
pub struct ManualClock {
    millis: AtomicI64,
}

impl ManualClock {
    pub fn new(start_millis: i64) -> Self {
        Self {
            millis: AtomicI64::new(start_millis),
        }
    }

    pub fn advance(&self, delta_millis: i64) {
        self.millis.fetch_add(delta_millis, Ordering::SeqCst);
    }

    pub fn set(&self, millis: i64) {
        self.millis.store(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.millis.load(Ordering::SeqCst)
    }
}
