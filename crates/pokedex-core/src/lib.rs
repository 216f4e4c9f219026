//! # Pokedex Core
//!
//! Region registry, catalog bitsets and completion aggregation for the
//! Pokedex engine.
//!
//! The catalog is split into ten fixed regions laid end to end over the
//! global id space. Each player keeps one record per region holding two
//! bitsets (caught and seen); a national summary is rebuilt from all regional
//! records after every mutation.
//!
//! ## Key Traits
//!
//! - [`DexStore`]: Persistence of regional records and summaries
//! - [`Clock`]: Time abstraction for testability
//!
//! ## Key Types
//!
//! - [`Region`] / [`RegionRegistry`]: Catalog partition and id translation
//! - [`DexFlags`]: Growable little-endian bitset over catalog positions
//! - [`RegionalRecord`] / [`PlayerSummary`]: Stored per-region and national state
//! - [`DexMutator`]: Catch/see mutation with completion tracking
//! - [`AggregationEngine`]: National totals from regional records
//! - [`LeaderboardRanker`]: Global ranking and popularity rank

pub mod action;
pub mod aggregation;
pub mod completion;
pub mod error;
pub mod flags;
pub mod leaderboard;
pub mod mutator;
pub mod record;
pub mod region;
pub mod traits;

#[cfg(test)]
mod testing;

// Re-export main types
pub use action::*;
pub use aggregation::*;
pub use completion::*;
pub use error::*;
pub use flags::*;
pub use leaderboard::*;
pub use mutator::*;
pub use record::*;
pub use region::*;
pub use traits::*;
