//! Structured storage using redb
//!
//! This module provides queryable, mutable storage for:
//! - Regional records, one table per region
//! - Player summaries

mod regional;
mod summaries;
mod tables;

pub use regional::RegionalRecordTable;
pub use summaries::SummaryTable;
pub use tables::{
    ByteTable, PLAYER_SUMMARIES, RedbStorage, RedbStorageConfig, ScanResults, regional_table,
};
