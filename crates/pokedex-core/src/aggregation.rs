//! Cross-region aggregation into a [`PlayerSummary`]
//!
//! Every mutation triggers a full rescan of the player's regional records.
//! A region with no record contributes nothing, which is the same as an empty
//! record. A record that exists but cannot be decoded is skipped and reported
//! in [`RegionalScan::unreadable`], so a summary can under-count until the
//! damaged record is repaired.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::completion::completion_percentage;
use crate::error::DexError;
use crate::record::{PlayerId, PlayerSummary, RegionalRecord};
use crate::region::{Region, RegionRegistry};
use crate::traits::DexStore;

/// A player's regional records as read from storage
#[derive(Debug, Clone, Default)]
pub struct RegionalScan {
    pub records: Vec<(Region, RegionalRecord)>,
    /// Regions whose stored record could not be decoded
    pub unreadable: Vec<Region>,
}

/// Aggregate figures derived from a [`RegionalScan`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NationalTotals {
    pub total_caught: u32,
    pub total_seen: u32,
    pub regions_completed: u32,
    pub national_completion_percentage: f64,
}

impl NationalTotals {
    /// Overwrite the derived fields of `summary`
    pub fn apply_to(&self, summary: &mut PlayerSummary, now_millis: i64) {
        summary.total_caught = self.total_caught;
        summary.total_seen = self.total_seen;
        summary.regions_completed = self.regions_completed;
        summary.national_completion_percentage = self.national_completion_percentage;
        summary.last_updated_millis = now_millis;
    }
}

/// Rebuilds national summaries from regional records
#[derive(Debug, Clone)]
pub struct AggregationEngine {
    registry: Arc<RegionRegistry>,
}

impl AggregationEngine {
    pub fn new(registry: Arc<RegionRegistry>) -> Self {
        Self { registry }
    }

    /// `total_caught / TOTAL_CATALOG_SIZE * 100`
    pub fn national_percentage(&self, total_caught: u32) -> f64 {
        completion_percentage(total_caught, self.registry.total_catalog_size())
    }

    /// Sum a scan into national totals
    pub fn totals(&self, scan: &RegionalScan) -> NationalTotals {
        let mut totals = NationalTotals::default();
        for (region, record) in &scan.records {
            let caught = record.caught_count();
            totals.total_caught += caught;
            totals.total_seen += record.seen_count();
            if caught >= self.registry.info(*region).catalog_size {
                totals.regions_completed += 1;
            }
        }
        totals.national_completion_percentage = self.national_percentage(totals.total_caught);
        totals
    }

    /// Rescan all regions for `player` and persist the rewritten summary.
    ///
    /// A player without a summary gets one created here.
    pub async fn recompute<S: DexStore + ?Sized>(
        &self,
        store: &S,
        player: PlayerId,
        now_millis: i64,
    ) -> Result<PlayerSummary, DexError> {
        let scan = store.load_all_regional_records(player).await?;
        if !scan.unreadable.is_empty() {
            warn!(
                player = %player,
                skipped = ?scan.unreadable,
                "Skipping unreadable regional records during aggregation"
            );
        }

        let totals = self.totals(&scan);

        let mut summary = match store.load_summary(player).await? {
            Some(summary) => summary,
            None => {
                info!(player = %player, "Creating missing summary during aggregation");
                PlayerSummary::new(player, now_millis)
            }
        };
        totals.apply_to(&mut summary, now_millis);
        store.save_summary(player, &summary).await?;

        Ok(summary)
    }
}
