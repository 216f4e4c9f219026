//! redb table definitions and storage manager
//!
//! One table per region holds that region's records; the table is picked
//! from the [`Region`] enum, never from a caller-supplied name.

use std::fmt::Display;
use std::path::PathBuf;
use std::sync::Arc;

use pokedex_core::{Region, StorageError};
use redb::{Database, ReadableTable, TableDefinition};
use tracing::{debug, info, instrument};

/// Type alias for scan results to simplify complex type
pub type ScanResults = Vec<(Vec<u8>, Vec<u8>)>;

/// Byte-keyed table layout shared by every table in the database
pub type ByteTable = TableDefinition<'static, &'static [u8], &'static [u8]>;

// Key: player id (u64 big-endian), Value: serialized PlayerSummary
pub const PLAYER_SUMMARIES: ByteTable = TableDefinition::new("player_summaries");

// Key: player id (u64 big-endian), Value: serialized RegionalRecord
pub const KANTO_RECORDS: ByteTable = TableDefinition::new("regional_kanto");
pub const JOHTO_RECORDS: ByteTable = TableDefinition::new("regional_johto");
pub const HOENN_RECORDS: ByteTable = TableDefinition::new("regional_hoenn");
pub const SINNOH_RECORDS: ByteTable = TableDefinition::new("regional_sinnoh");
pub const UNOVA_RECORDS: ByteTable = TableDefinition::new("regional_unova");
pub const KALOS_RECORDS: ByteTable = TableDefinition::new("regional_kalos");
pub const ALOLA_RECORDS: ByteTable = TableDefinition::new("regional_alola");
pub const GALAR_RECORDS: ByteTable = TableDefinition::new("regional_galar");
pub const HISUI_RECORDS: ByteTable = TableDefinition::new("regional_hisui");
pub const PALDEA_RECORDS: ByteTable = TableDefinition::new("regional_paldea");

/// Table holding `region`'s records
pub const fn regional_table(region: Region) -> ByteTable {
    match region {
        Region::Kanto => KANTO_RECORDS,
        Region::Johto => JOHTO_RECORDS,
        Region::Hoenn => HOENN_RECORDS,
        Region::Sinnoh => SINNOH_RECORDS,
        Region::Unova => UNOVA_RECORDS,
        Region::Kalos => KALOS_RECORDS,
        Region::Alola => ALOLA_RECORDS,
        Region::Galar => GALAR_RECORDS,
        Region::Hisui => HISUI_RECORDS,
        Region::Paldea => PALDEA_RECORDS,
    }
}

fn db_error(e: impl Display) -> StorageError {
    StorageError::Database(e.to_string())
}

/// Configuration for redb storage
#[derive(Debug, Clone)]
pub struct RedbStorageConfig {
    /// Path to the database file
    pub db_path: PathBuf,
    /// Cache size in bytes
    pub cache_size: usize,
}

impl Default for RedbStorageConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("./data/pokedex.redb"),
            cache_size: 64 * 1024 * 1024, // 64MB
        }
    }
}

/// Main redb storage manager
pub struct RedbStorage {
    db: Arc<Database>,
}

impl RedbStorage {
    /// Open or create the database
    #[instrument(skip(config), fields(path = %config.db_path.display()))]
    pub fn open(config: RedbStorageConfig) -> Result<Self, StorageError> {
        // Ensure parent directory exists
        if let Some(parent) = config.db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = Database::builder()
            .set_cache_size(config.cache_size)
            .create(&config.db_path)
            .map_err(|e| StorageError::Io(e.to_string()))?;

        info!(cache_size = config.cache_size, "Opened redb database");

        let storage = Self { db: Arc::new(db) };

        storage.init_tables()?;

        Ok(storage)
    }

    /// Create every table if it doesn't exist yet
    fn init_tables(&self) -> Result<(), StorageError> {
        let write_txn = self.db.begin_write().map_err(db_error)?;

        write_txn.open_table(PLAYER_SUMMARIES).map_err(db_error)?;
        for region in Region::ALL {
            write_txn
                .open_table(regional_table(region))
                .map_err(db_error)?;
        }

        write_txn.commit().map_err(db_error)?;

        debug!(tables = Region::ALL.len() + 1, "Initialized redb tables");
        Ok(())
    }

    /// Put a key-value pair in a table
    pub fn put(&self, table: ByteTable, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        let write_txn = self.db.begin_write().map_err(db_error)?;

        {
            let mut table = write_txn.open_table(table).map_err(db_error)?;
            table.insert(key, value).map_err(db_error)?;
        }

        write_txn.commit().map_err(db_error)?;

        Ok(())
    }

    /// Get a value from a table
    pub fn get(&self, table: ByteTable, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        let read_txn = self.db.begin_read().map_err(db_error)?;
        let table = read_txn.open_table(table).map_err(db_error)?;

        let value = table
            .get(key)
            .map_err(db_error)?
            .map(|v| v.value().to_vec());

        Ok(value)
    }

    /// Every entry of a table, in key order
    pub fn scan_all(&self, table: ByteTable) -> Result<ScanResults, StorageError> {
        let read_txn = self.db.begin_read().map_err(db_error)?;
        let table = read_txn.open_table(table).map_err(db_error)?;

        let mut results = Vec::new();
        for entry in table.iter().map_err(db_error)? {
            let (key, value) = entry.map_err(db_error)?;
            results.push((key.value().to_vec(), value.value().to_vec()));
        }

        Ok(results)
    }

    /// Number of entries in a table
    pub fn count(&self, table: ByteTable) -> Result<usize, StorageError> {
        self.scan_all(table).map(|v| v.len())
    }
}
