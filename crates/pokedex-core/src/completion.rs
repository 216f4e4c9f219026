//! Regional completion percentage

use std::sync::Arc;

use crate::flags::DexFlags;
use crate::record::RegionalRecord;
use crate::region::{Region, RegionRegistry};

/// `caught / catalog_size * 100`, clamped to `[0, 100]`
pub fn completion_percentage(caught_count: u32, catalog_size: u32) -> f64 {
    if catalog_size == 0 {
        return 0.0;
    }
    (f64::from(caught_count) / f64::from(catalog_size) * 100.0).min(100.0)
}

/// Result of refreshing a record's completion fields
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionUpdate {
    pub percentage: f64,
    /// The region crossed the completion threshold during this refresh
    pub newly_completed: bool,
}

/// Derives completion state from the caught flags
#[derive(Debug, Clone)]
pub struct CompletionCalculator {
    registry: Arc<RegionRegistry>,
}

impl CompletionCalculator {
    pub fn new(registry: Arc<RegionRegistry>) -> Self {
        Self { registry }
    }

    /// Completion percentage of `caught` within `region`
    pub fn percentage(&self, region: Region, caught: &DexFlags) -> f64 {
        completion_percentage(caught.count(), self.registry.info(region).catalog_size)
    }

    /// Whether every entry of `region` has been caught
    pub fn is_complete(&self, region: Region, caught: &DexFlags) -> bool {
        caught.count() >= self.registry.info(region).catalog_size
    }

    /// Recompute the percentage and stamp the first completion time.
    ///
    /// `completed_at_millis` is written only when it is still unset.
    pub fn refresh(&self, region: Region, record: &mut RegionalRecord, now_millis: i64) -> CompletionUpdate {
        let percentage = self.percentage(region, &record.caught);
        record.completion_percentage = percentage;

        let newly_completed =
            record.completed_at_millis.is_none() && self.is_complete(region, &record.caught);
        if newly_completed {
            record.completed_at_millis = Some(now_millis);
        }

        CompletionUpdate {
            percentage,
            newly_completed,
        }
    }
}
