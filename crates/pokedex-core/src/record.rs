//! Per-player records: one regional record per region plus a national summary

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::flags::DexFlags;

/// Opaque player key issued by the identity layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl PlayerId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Big-endian bytes, so byte order matches numeric order in ordered stores
    pub fn to_key_bytes(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }

    /// Parse a key produced by [`to_key_bytes`](Self::to_key_bytes)
    pub fn from_key_bytes(bytes: &[u8]) -> Option<Self> {
        let array: [u8; 8] = bytes.try_into().ok()?;
        Some(Self(u64::from_be_bytes(array)))
    }
}

impl Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for PlayerId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Seen/caught state for one player in one region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionalRecord {
    pub caught: DexFlags,
    pub seen: DexFlags,
    /// Caught population over catalog size, 0..=100
    pub completion_percentage: f64,
    /// Set once, the first time the region became complete (Unix millis)
    pub completed_at_millis: Option<i64>,
    pub created_at_millis: i64,
    pub updated_at_millis: i64,
}

impl RegionalRecord {
    /// Create an empty record
    pub fn new(now_millis: i64) -> Self {
        Self {
            caught: DexFlags::new(),
            seen: DexFlags::new(),
            completion_percentage: 0.0,
            completed_at_millis: None,
            created_at_millis: now_millis,
            updated_at_millis: now_millis,
        }
    }

    pub fn caught_count(&self) -> u32 {
        self.caught.count()
    }

    pub fn seen_count(&self) -> u32 {
        self.seen.count()
    }

    pub fn is_completed(&self) -> bool {
        self.completed_at_millis.is_some()
    }
}

/// National aggregate for one player, rebuilt from every regional record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub player_id: PlayerId,
    pub total_caught: u32,
    pub total_seen: u32,
    pub regions_completed: u32,
    pub national_completion_percentage: f64,
    pub last_updated_millis: i64,
    pub created_at_millis: i64,
}

impl PlayerSummary {
    /// Create an empty summary for a newly registered player
    pub fn new(player_id: PlayerId, now_millis: i64) -> Self {
        Self {
            player_id,
            total_caught: 0,
            total_seen: 0,
            regions_completed: 0,
            national_completion_percentage: 0.0,
            last_updated_millis: now_millis,
            created_at_millis: now_millis,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_key_bytes_round_trip() {
        let player = PlayerId::new(0x0102_0304_0506_0708);
        let key = player.to_key_bytes();
        assert_eq!(key, [1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(PlayerId::from_key_bytes(&key), Some(player));
        assert_eq!(PlayerId::from_key_bytes(&[1, 2, 3]), None);
    }

    #[test]
    fn test_player_keys_sort_numerically() {
        assert!(PlayerId(2).to_key_bytes() < PlayerId(256).to_key_bytes());
    }

    #[test]
    fn test_new_record_is_empty() {
        let record = RegionalRecord::new(1_000);
        assert_eq!(record.caught_count(), 0);
        assert_eq!(record.seen_count(), 0);
        assert_eq!(record.completion_percentage, 0.0);
        assert!(!record.is_completed());
        assert_eq!(record.created_at_millis, record.updated_at_millis);
    }

    #[test]
    fn test_record_postcard_round_trip() {
        let mut record = RegionalRecord::new(5);
        record.caught.set(10);
        record.seen.set(10);
        record.seen.set(11);
        let bytes = postcard::to_allocvec(&record).unwrap();
        let decoded: RegionalRecord = postcard::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, record);
    }
}
