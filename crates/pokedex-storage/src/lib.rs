//! # Pokedex Storage
//!
//! Storage backends implementing [`DexStore`].
//!
//! ## Features
//!
//! - **InMemoryDexStore**: `DashMap`-backed store for tests and simulation
//! - **RedbDexStore**: redb-backed persistent store, one table per region
//!
//! ## Example
//!
//! ```rust,ignore
//! use pokedex_core::{DexStore, PlayerId, Region, RegionalRecord};
//! use pokedex_storage::RedbDexStore;
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = RedbDexStore::open_path("./data/pokedex.redb").unwrap();
//!     let mut record = RegionalRecord::new(0);
//!     record.caught.set(24);
//!     store
//!         .save_regional_record(PlayerId(1), Region::Kanto, &record)
//!         .await
//!         .unwrap();
//! }
//! ```

pub mod memory;
pub mod persistent;
pub mod structured;

// Re-exports
pub use memory::InMemoryDexStore;
pub use persistent::RedbDexStore;
pub use structured::{RedbStorage, RedbStorageConfig};

// Re-export core storage types for convenience
pub use pokedex_core::{DexStore, StorageError};
