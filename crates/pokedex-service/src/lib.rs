//! # Pokedex Service
//!
//! Update pipeline, leaderboards and popularity queries on top of
//! `pokedex-core`, with storage from `pokedex-storage`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use pokedex_core::{PlayerId, UpdateRequest, DexAction};
//! use pokedex_service::DexService;
//! use pokedex_storage::InMemoryDexStore;
//!
//! let service = DexService::new(Arc::new(InMemoryDexStore::new()));
//! service.register_player(PlayerId(1)).await?;
//! let outcome = service
//!     .update(PlayerId(1), &UpdateRequest::by_region("kanto", 25, DexAction::Catch))
//!     .await?;
//! println!("{}%", outcome.summary.national_completion_percentage);
//! ```

pub mod config;
pub mod error;
pub mod service;

pub use config::{Cli, Command, LogFormat, ServiceConfig, StorageBackend, TargetArgs};
pub use error::{ServiceError, ServiceResult};
pub use service::{DexAnalytics, DexService, EntryPopularity, UpdateOutcome};

use std::sync::Arc;

use pokedex_core::DexStore;
use pokedex_storage::{InMemoryDexStore, RedbDexStore, RedbStorageConfig};
use tracing::info;

/// Open the store selected by `config`
pub fn open_store(config: &ServiceConfig) -> ServiceResult<Arc<dyn DexStore>> {
    match config.storage {
        StorageBackend::Memory => {
            info!("Using in-memory store");
            Ok(Arc::new(InMemoryDexStore::new()))
        }
        StorageBackend::Redb => {
            let store = RedbDexStore::open(RedbStorageConfig {
                db_path: config.db_path(),
                cache_size: config.cache_size,
            })?;
            Ok(Arc::new(store))
        }
    }
}
