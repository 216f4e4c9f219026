//! Leaderboard ordering and popularity rank

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::DexError;
use crate::record::{PlayerId, PlayerSummary};
use crate::traits::DexStore;

/// Entries shown to players in game
pub const GAMEPLAY_LEADERBOARD_LIMIT: usize = 50;

/// Entries shown on the public site
pub const PUBLIC_LEADERBOARD_LIMIT: usize = 100;

/// Rank reported when the rank cannot be computed
pub const UNRANKED: u64 = 999;

/// Which audience a leaderboard is built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaderboardView {
    Gameplay,
    Public,
}

impl LeaderboardView {
    pub fn limit(self) -> usize {
        match self {
            LeaderboardView::Gameplay => GAMEPLAY_LEADERBOARD_LIMIT,
            LeaderboardView::Public => PUBLIC_LEADERBOARD_LIMIT,
        }
    }
}

/// Sort key for ranked summaries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeaderboardOrder {
    /// National completion desc, then total caught desc
    #[default]
    NationalCompletion,
    /// Total caught desc, then national completion desc
    TotalCaught,
}

impl LeaderboardOrder {
    /// Ordering of two summaries; the player id breaks remaining ties
    pub fn compare(self, a: &PlayerSummary, b: &PlayerSummary) -> Ordering {
        let by_completion = b
            .national_completion_percentage
            .total_cmp(&a.national_completion_percentage);
        let by_caught = b.total_caught.cmp(&a.total_caught);

        let primary = match self {
            LeaderboardOrder::NationalCompletion => by_completion.then(by_caught),
            LeaderboardOrder::TotalCaught => by_caught.then(by_completion),
        };
        primary.then(a.player_id.cmp(&b.player_id))
    }
}

/// Sort `summaries` by `order` and keep the first `limit`
pub fn rank_summaries(
    mut summaries: Vec<PlayerSummary>,
    order: LeaderboardOrder,
    limit: usize,
) -> Vec<PlayerSummary> {
    summaries.sort_by(|a, b| order.compare(a, b));
    summaries.truncate(limit);
    summaries
}

/// `1 + players strictly above`; tied players share a rank
pub fn rank_from_count(players_above: u64) -> u64 {
    players_above + 1
}

/// One row of a leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// 1-based position in the list
    pub position: usize,
    pub player_id: PlayerId,
    pub national_completion_percentage: f64,
    pub total_caught: u32,
    pub regions_completed: u32,
}

impl LeaderboardEntry {
    fn from_summary(position: usize, summary: &PlayerSummary) -> Self {
        Self {
            position,
            player_id: summary.player_id,
            national_completion_percentage: summary.national_completion_percentage,
            total_caught: summary.total_caught,
            regions_completed: summary.regions_completed,
        }
    }
}

/// Read-only ranking queries over stored summaries
#[derive(Debug, Clone, Copy)]
pub struct LeaderboardRanker {
    gameplay_limit: usize,
    public_limit: usize,
}

impl Default for LeaderboardRanker {
    fn default() -> Self {
        Self::new()
    }
}

impl LeaderboardRanker {
    /// Ranker using the standard view limits
    pub fn new() -> Self {
        Self {
            gameplay_limit: GAMEPLAY_LEADERBOARD_LIMIT,
            public_limit: PUBLIC_LEADERBOARD_LIMIT,
        }
    }

    /// Override the number of entries returned per view
    pub fn with_limits(mut self, gameplay_limit: usize, public_limit: usize) -> Self {
        self.gameplay_limit = gameplay_limit;
        self.public_limit = public_limit;
        self
    }

    /// Entries returned for `view`
    pub fn limit_for(&self, view: LeaderboardView) -> usize {
        match view {
            LeaderboardView::Gameplay => self.gameplay_limit,
            LeaderboardView::Public => self.public_limit,
        }
    }

    /// Global leaderboard for a view
    pub async fn leaderboard<S: DexStore + ?Sized>(
        &self,
        store: &S,
        view: LeaderboardView,
    ) -> Result<Vec<LeaderboardEntry>, DexError> {
        let ranked = store
            .list_players_ranked_by_summary(LeaderboardOrder::NationalCompletion, self.limit_for(view))
            .await?;
        Ok(ranked
            .iter()
            .enumerate()
            .map(|(index, summary)| LeaderboardEntry::from_summary(index + 1, summary))
            .collect())
    }

    /// Rank of a catch count among all players' totals.
    ///
    /// Storage failures yield [`UNRANKED`] instead of an error.
    pub async fn popularity_rank<S: DexStore + ?Sized>(&self, store: &S, catch_count: u32) -> u64 {
        match store.count_players_with_greater_catch_total(catch_count).await {
            Ok(above) => rank_from_count(above),
            Err(e) => {
                warn!(catch_count, error = %e, "Popularity rank unavailable");
                UNRANKED
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(id: u64, pct: f64, caught: u32) -> PlayerSummary {
        PlayerSummary {
            national_completion_percentage: pct,
            total_caught: caught,
            ..PlayerSummary::new(PlayerId(id), 0)
        }
    }

    #[test]
    fn test_ties_break_on_total_caught() {
        let ranked = rank_summaries(
            vec![summary(1, 80.0, 10), summary(2, 95.0, 5), summary(3, 95.0, 20)],
            LeaderboardOrder::NationalCompletion,
            GAMEPLAY_LEADERBOARD_LIMIT,
        );
        let order: Vec<_> = ranked.iter().map(|s| s.player_id.0).collect();
        assert_eq!(order, vec![3, 2, 1]);
    }

    #[test]
    fn test_total_caught_order() {
        let ranked = rank_summaries(
            vec![summary(1, 80.0, 10), summary(2, 95.0, 5), summary(3, 95.0, 20)],
            LeaderboardOrder::TotalCaught,
            10,
        );
        let order: Vec<_> = ranked.iter().map(|s| s.player_id.0).collect();
        assert_eq!(order, vec![3, 1, 2]);
    }

    #[test]
    fn test_truncates_to_limit() {
        let summaries = (0..120).map(|i| summary(i, i as f64 / 2.0, i as u32)).collect();
        let ranked = rank_summaries(
            summaries,
            LeaderboardOrder::NationalCompletion,
            LeaderboardView::Public.limit(),
        );
        assert_eq!(ranked.len(), 100);
        assert_eq!(ranked[0].player_id, PlayerId(119));
    }

    #[test]
    fn test_full_tie_is_deterministic() {
        let ranked = rank_summaries(
            vec![summary(7, 50.0, 5), summary(3, 50.0, 5)],
            LeaderboardOrder::NationalCompletion,
            10,
        );
        assert_eq!(ranked[0].player_id, PlayerId(3));
    }

    #[test]
    fn test_rank_counts_players_not_totals() {
        // three players above, two of them tied with each other
        assert_eq!(rank_from_count(3), 4);
        assert_eq!(rank_from_count(0), 1);
    }

    #[test]
    fn test_view_limits() {
        assert_eq!(LeaderboardView::Gameplay.limit(), 50);
        assert_eq!(LeaderboardView::Public.limit(), 100);

        let ranker = LeaderboardRanker::new().with_limits(10, 20);
        assert_eq!(ranker.limit_for(LeaderboardView::Gameplay), 10);
        assert_eq!(ranker.limit_for(LeaderboardView::Public), 20);
    }

    #[tokio::test]
    async fn test_popularity_rank_with_tie_above() {
        use crate::testing::TestStore;

        let store = TestStore::default();
        for (id, caught) in [(1, 50), (2, 40), (3, 40), (4, 10), (5, 10)] {
            store
                .save_summary(PlayerId(id), &summary(id, 0.0, caught))
                .await
                .unwrap();
        }
        let ranker = LeaderboardRanker::new();
        assert_eq!(ranker.popularity_rank(&store, 10).await, 4);
        assert_eq!(ranker.popularity_rank(&store, 50).await, 1);
    }

    #[tokio::test]
    async fn test_popularity_rank_unranked_on_failure() {
        use crate::testing::TestStore;

        let store = TestStore::default();
        store.fail_summary_listing();
        assert_eq!(LeaderboardRanker::new().popularity_rank(&store, 3).await, UNRANKED);
    }

    #[tokio::test]
    async fn test_leaderboard_positions() {
        use crate::testing::TestStore;

        let store = TestStore::default();
        for (id, pct, caught) in [(1, 80.0, 10), (2, 95.0, 5), (3, 95.0, 20)] {
            store
                .save_summary(PlayerId(id), &summary(id, pct, caught))
                .await
                .unwrap();
        }
        let board = LeaderboardRanker::new()
            .leaderboard(&store, LeaderboardView::Gameplay)
            .await
            .unwrap();
        assert_eq!(board.len(), 3);
        assert_eq!(board[0].position, 1);
        assert_eq!(board[0].player_id, PlayerId(3));
        assert_eq!(board[2].player_id, PlayerId(1));
    }
}
