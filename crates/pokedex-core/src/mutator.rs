//! Applies catch/see actions to regional records

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::action::{DexAction, EntryTarget, UpdateRequest};
use crate::completion::CompletionCalculator;
use crate::error::DexError;
use crate::record::{PlayerId, RegionalRecord};
use crate::region::RegionRegistry;
use crate::traits::DexStore;

/// What a single mutation changed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationOutcome {
    pub target: EntryTarget,
    pub action: DexAction,
    /// False when the flag was already set
    pub newly_set: bool,
    pub newly_completed: bool,
    /// The record as persisted
    pub record: RegionalRecord,
}

/// Record mutation against a store
#[derive(Debug, Clone)]
pub struct DexMutator {
    registry: Arc<RegionRegistry>,
    completion: CompletionCalculator,
}

impl DexMutator {
    pub fn new(registry: Arc<RegionRegistry>) -> Self {
        let completion = CompletionCalculator::new(registry.clone());
        Self {
            registry,
            completion,
        }
    }

    pub fn registry(&self) -> &RegionRegistry {
        &self.registry
    }

    /// Validate a wire request
    pub fn resolve(&self, request: &UpdateRequest) -> Result<(EntryTarget, DexAction), DexError> {
        request.resolve(&self.registry)
    }

    /// Set the flag selected by `action`. Catching does not mark as seen.
    pub fn apply_action(record: &mut RegionalRecord, target: EntryTarget, action: DexAction) -> bool {
        let position = target.bit_position();
        match action {
            DexAction::Catch => record.caught.set(position),
            DexAction::See => record.seen.set(position),
        }
    }

    /// Existing record for `target.region`, or a fresh empty one
    pub async fn load_or_create<S: DexStore + ?Sized>(
        &self,
        store: &S,
        player: PlayerId,
        target: EntryTarget,
        now_millis: i64,
    ) -> Result<RegionalRecord, DexError> {
        match store.load_regional_record(player, target.region).await? {
            Some(record) => Ok(record),
            None => {
                debug!(player = %player, region = %target.region, "Creating regional record");
                Ok(RegionalRecord::new(now_millis))
            }
        }
    }

    /// Load, mutate, refresh completion and persist one regional record.
    ///
    /// Callers must serialize calls for the same player. Targets outside the
    /// region's catalog are rejected before the store is touched.
    pub async fn apply<S: DexStore + ?Sized>(
        &self,
        store: &S,
        player: PlayerId,
        target: EntryTarget,
        action: DexAction,
        now_millis: i64,
    ) -> Result<MutationOutcome, DexError> {
        self.registry
            .check_regional_id(target.region, target.regional_id)?;

        let mut record = self.load_or_create(store, player, target, now_millis).await?;

        let newly_set = Self::apply_action(&mut record, target, action);
        let update = self.completion.refresh(target.region, &mut record, now_millis);
        record.updated_at_millis = now_millis;

        store
            .save_regional_record(player, target.region, &record)
            .await?;

        if update.newly_completed {
            info!(player = %player, region = %target.region, "Region completed");
        }
        debug!(
            player = %player,
            target = %target,
            action = %action,
            newly_set,
            completion = update.percentage,
            "Applied dex action"
        );

        Ok(MutationOutcome {
            target,
            action,
            newly_set,
            newly_completed: update.newly_completed,
            record,
        })
    }
}
