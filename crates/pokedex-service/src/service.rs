//! The Pokedex service
//!
//! Orchestrates the mutation pipeline (resolve, mutate, aggregate) and the
//! read-side queries. Mutations for one player are serialized through a
//! keyed async mutex; different players proceed in parallel. Reads take no
//! lock. A player's mutex is dropped from the map once no task holds or
//! waits on it.

use std::sync::Arc;

use dashmap::DashMap;
use pokedex_core::{
    AggregationEngine, Clock, DexAction, DexError, DexMutator, DexStore, EntryTarget,
    LeaderboardEntry, LeaderboardRanker, LeaderboardView, PlayerId, PlayerSummary, Region,
    RegionInfo, RegionRegistry, RegionalRecord, SystemClock, UNRANKED, UpdateRequest,
};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, instrument};

use crate::config::ServiceConfig;
use crate::error::ServiceResult;

/// Result of a successful update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateOutcome {
    pub target: EntryTarget,
    pub global_id: u32,
    pub action: DexAction,
    /// False when the entry was already flagged
    pub newly_set: bool,
    /// The region became complete with this update
    pub region_completed: bool,
    /// Regional completion after the update
    pub regional_completion_percentage: f64,
    /// National summary after the update
    pub summary: PlayerSummary,
}

/// Catch statistics for one catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryPopularity {
    pub global_id: u32,
    pub region: Region,
    pub regional_id: u32,
    /// Players who caught this entry
    pub catch_count: u32,
    /// Players who saw this entry
    pub seen_count: u32,
    /// Players with any record in the entry's region
    pub players_in_region: u32,
    /// `catch_count / players_in_region * 100`
    pub catch_rate_percentage: f64,
    /// Rank of `catch_count` among players' catch totals
    pub popularity_rank: u64,
}

/// Totals across every player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DexAnalytics {
    pub total_players: u64,
    pub total_caught: u64,
    /// Region with the highest average completion among started records
    pub most_popular_region: Region,
}

/// Pokedex engine over a [`DexStore`]
pub struct DexService<S: DexStore + ?Sized = dyn DexStore> {
    store: Arc<S>,
    registry: Arc<RegionRegistry>,
    clock: Arc<dyn Clock>,
    mutator: DexMutator,
    aggregation: AggregationEngine,
    ranker: LeaderboardRanker,
    player_locks: DashMap<PlayerId, Arc<Mutex<()>>>,
}

impl<S: DexStore + ?Sized> DexService<S> {
    /// Create a service with the standard region table and system clock
    pub fn new(store: Arc<S>) -> Self {
        let registry = Arc::new(RegionRegistry::standard());
        Self {
            store,
            mutator: DexMutator::new(registry.clone()),
            aggregation: AggregationEngine::new(registry.clone()),
            registry,
            clock: Arc::new(SystemClock),
            ranker: LeaderboardRanker::new(),
            player_locks: DashMap::new(),
        }
    }

    /// Create a service using the leaderboard limits from `config`
    pub fn with_config(store: Arc<S>, config: &ServiceConfig) -> Self {
        Self::new(store).with_leaderboard_limits(
            config.gameplay_leaderboard_limit,
            config.public_leaderboard_limit,
        )
    }

    /// Use a custom time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Override the leaderboard sizes
    pub fn with_leaderboard_limits(mut self, gameplay: usize, public: usize) -> Self {
        self.ranker = self.ranker.with_limits(gameplay, public);
        self
    }

    /// The shared region table
    pub fn registry(&self) -> &RegionRegistry {
        &self.registry
    }

    /// The underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Wait for exclusive mutation access to `player`
    async fn lock_player(&self, player: PlayerId) -> PlayerLock<'_> {
        let lock = self.player_locks.entry(player).or_default().clone();
        let guard = lock.lock_owned().await;
        PlayerLock {
            locks: &self.player_locks,
            player,
            guard: Some(guard),
        }
    }

    /// Create a player's summary, returning the existing one if present
    #[instrument(skip_all, fields(player = %player))]
    pub async fn register_player(&self, player: PlayerId) -> ServiceResult<PlayerSummary> {
        let _lock = self.lock_player(player).await;

        if let Some(existing) = self.store.load_summary(player).await? {
            debug!("Player already registered");
            return Ok(existing);
        }

        let summary = PlayerSummary::new(player, self.clock.now_millis());
        self.store.save_summary(player, &summary).await?;
        info!("Registered player");
        Ok(summary)
    }

    /// Apply a catch/see request and rebuild the player's summary
    ///
    /// Invalid requests are rejected before anything is read or written.
    #[instrument(skip_all, fields(player = %player))]
    pub async fn update(
        &self,
        player: PlayerId,
        request: &UpdateRequest,
    ) -> ServiceResult<UpdateOutcome> {
        let (target, action) = self.mutator.resolve(request)?;
        self.apply(player, target, action).await
    }

    /// Catch an entry by global id
    pub async fn update_by_global_id(
        &self,
        player: PlayerId,
        global_id: u32,
    ) -> ServiceResult<UpdateOutcome> {
        self.update(player, &UpdateRequest::by_global_id(global_id, DexAction::Catch))
            .await
    }

    async fn apply(
        &self,
        player: PlayerId,
        target: EntryTarget,
        action: DexAction,
    ) -> ServiceResult<UpdateOutcome> {
        let _lock = self.lock_player(player).await;

        let now = self.clock.now_millis();
        let mutation = self
            .mutator
            .apply(self.store.as_ref(), player, target, action, now)
            .await?;
        let summary = self
            .aggregation
            .recompute(self.store.as_ref(), player, now)
            .await?;

        Ok(UpdateOutcome {
            target,
            global_id: target.global_id(),
            action,
            newly_set: mutation.newly_set,
            region_completed: mutation.newly_completed,
            regional_completion_percentage: mutation.record.completion_percentage,
            summary,
        })
    }

    /// A player's record for one region, created empty if missing
    #[instrument(skip_all, fields(player = %player))]
    pub async fn fetch_regional_record(
        &self,
        player: PlayerId,
        region: &str,
    ) -> ServiceResult<RegionalRecord> {
        let region = self.registry.region(region)?.region;

        let _lock = self.lock_player(player).await;

        if let Some(record) = self.store.load_regional_record(player, region).await? {
            return Ok(record);
        }

        let record = RegionalRecord::new(self.clock.now_millis());
        self.store
            .save_regional_record(player, region, &record)
            .await?;
        debug!(region = %region, "Created regional record on fetch");
        Ok(record)
    }

    /// A player's national summary
    pub async fn summary(&self, player: PlayerId) -> ServiceResult<PlayerSummary> {
        self.store
            .load_summary(player)
            .await?
            .ok_or_else(|| DexError::RecordNotFound(format!("summary for player {}", player)).into())
    }

    /// Global leaderboard
    #[instrument(skip(self))]
    pub async fn leaderboard(&self, view: LeaderboardView) -> ServiceResult<Vec<LeaderboardEntry>> {
        Ok(self.ranker.leaderboard(self.store.as_ref(), view).await?)
    }

    /// Catch statistics for the entry at `global_id`
    #[instrument(skip(self))]
    pub async fn entry_popularity(&self, global_id: u32) -> ServiceResult<EntryPopularity> {
        let (region, regional_id) = self.registry.locate(global_id)?;
        let position = (regional_id - 1) as usize;

        let records = self.store.load_region_records(region).await?;
        let players_in_region = records.len() as u32;
        let catch_count = records
            .iter()
            .filter(|(_, record)| record.caught.get(position))
            .count() as u32;
        let seen_count = records
            .iter()
            .filter(|(_, record)| record.seen.get(position))
            .count() as u32;

        let catch_rate_percentage = if players_in_region > 0 {
            f64::from(catch_count) / f64::from(players_in_region) * 100.0
        } else {
            0.0
        };

        let popularity_rank = self
            .ranker
            .popularity_rank(self.store.as_ref(), catch_count)
            .await;
        if popularity_rank == UNRANKED {
            debug!(global_id, "Entry left unranked");
        }

        Ok(EntryPopularity {
            global_id,
            region,
            regional_id,
            catch_count,
            seen_count,
            players_in_region,
            catch_rate_percentage,
            popularity_rank,
        })
    }

    /// Player and catch totals plus the most popular region
    #[instrument(skip(self))]
    pub async fn analytics(&self) -> ServiceResult<DexAnalytics> {
        let summaries = self.store.list_summaries().await?;
        let total_players = summaries.len() as u64;
        let total_caught = summaries
            .iter()
            .map(|summary| u64::from(summary.total_caught))
            .sum();

        Ok(DexAnalytics {
            total_players,
            total_caught,
            most_popular_region: self.most_popular_region().await?,
        })
    }

    /// Highest average completion among records with any progress;
    /// Kanto when nobody has caught anything
    async fn most_popular_region(&self) -> ServiceResult<Region> {
        let mut top = Region::Kanto;
        let mut best = 0.0;

        for region in Region::ALL {
            let started: Vec<f64> = self
                .store
                .load_region_records(region)
                .await?
                .into_iter()
                .map(|(_, record)| record.completion_percentage)
                .filter(|pct| *pct > 0.0)
                .collect();
            if started.is_empty() {
                continue;
            }

            let average = started.iter().sum::<f64>() / started.len() as f64;
            if average > best {
                best = average;
                top = region;
            }
        }

        Ok(top)
    }

    /// The region table
    pub fn regions(&self) -> Vec<RegionInfo> {
        self.registry.regions().to_vec()
    }
}

/// Held mutation access for one player
struct PlayerLock<'a> {
    locks: &'a DashMap<PlayerId, Arc<Mutex<()>>>,
    player: PlayerId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for PlayerLock<'_> {
    fn drop(&mut self) {
        // Release the mutex before checking for other holders
        drop(self.guard.take());
        self.locks
            .remove_if(&self.player, |_, lock| Arc::strong_count(lock) == 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use pokedex_core::ManualClock;
    use pokedex_storage::InMemoryDexStore;

    fn service() -> DexService<InMemoryDexStore> {
        DexService::new(Arc::new(InMemoryDexStore::new()))
            .with_clock(Arc::new(ManualClock::new(1_000)))
    }

    #[tokio::test]
    async fn test_register_is_idempotent() {
        let service = service();
        let first = service.register_player(PlayerId(1)).await.unwrap();
        let second = service.register_player(PlayerId(1)).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.created_at_millis, 1_000);
    }

    #[tokio::test]
    async fn test_invalid_request_writes_nothing() {
        let service = service();
        let request = UpdateRequest {
            region: Some("kanto".into()),
            regional_id: Some(1),
            action: "release".into(),
            ..Default::default()
        };
        let err = service.update(PlayerId(1), &request).await.unwrap_err();
        assert!(err.is_rejected_request());
        assert!(service.store().is_empty());
    }

    #[tokio::test]
    async fn test_summary_missing() {
        let err = service().summary(PlayerId(4)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Dex(DexError::RecordNotFound(_))));
    }

    #[tokio::test]
    async fn test_fetch_creates_once() {
        let service = service();
        let first = service
            .fetch_regional_record(PlayerId(2), "Sinnoh")
            .await
            .unwrap();
        assert_eq!(first.caught_count(), 0);
        assert_eq!(service.store().record_count(), 1);

        service
            .fetch_regional_record(PlayerId(2), "sinnoh")
            .await
            .unwrap();
        assert_eq!(service.store().record_count(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_player_locks_released_after_mutations() {
        let service = Arc::new(service());
        let mut handles = vec![];

        for player in 1..=4u64 {
            for id in 1..=10u32 {
                let service = Arc::clone(&service);
                handles.push(tokio::spawn(async move {
                    service
                        .update(
                            PlayerId(player),
                            &UpdateRequest::by_region("johto", id, DexAction::See),
                        )
                        .await
                        .unwrap();
                }));
            }
        }
        for handle in handles {
            handle.await.unwrap();
        }

        service.register_player(PlayerId(9)).await.unwrap();
        service
            .fetch_regional_record(PlayerId(9), "kanto")
            .await
            .unwrap();

        assert!(service.player_locks.is_empty());
        assert_eq!(service.summary(PlayerId(3)).await.unwrap().total_seen, 10);
    }

    #[tokio::test]
    async fn test_lock_entry_removed_on_release() {
        let service = service();
        let first = service.lock_player(PlayerId(5)).await;
        assert_eq!(service.player_locks.len(), 1);
        drop(first);
        assert!(service.player_locks.is_empty());
    }

    #[tokio::test]
    async fn test_most_popular_defaults_to_kanto() {
        let analytics = service().analytics().await.unwrap();
        assert_eq!(analytics.total_players, 0);
        assert_eq!(analytics.most_popular_region, Region::Kanto);
    }
}
