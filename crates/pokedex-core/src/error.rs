//! Error types for the Pokedex engine

use thiserror::Error;

/// Top-level error type for catalog resolution and mutation
#[derive(Debug, Error)]
pub enum DexError {
    #[error("Invalid region: {0}")]
    InvalidRegion(String),

    #[error("Catalog id {id} is outside every declared region range")]
    IdOutOfRange { id: u32 },

    #[error("Regional id {regional_id} is outside {region} (1..={catalog_size})")]
    InvalidRegionalId {
        region: String,
        regional_id: u32,
        catalog_size: u32,
    },

    #[error("Unknown action: {0} (expected \"catch\" or \"see\")")]
    InvalidAction(String),

    #[error("Either global_id or region + regional_id must be provided")]
    MissingTarget,

    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error("Persistence failure: {0}")]
    Persistence(#[from] StorageError),
}

impl DexError {
    /// Whether the error rejects the caller's request rather than signalling
    /// a storage problem
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            DexError::InvalidRegion(_)
                | DexError::IdOutOfRange { .. }
                | DexError::InvalidRegionalId { .. }
                | DexError::InvalidAction(_)
                | DexError::MissingTarget
        )
    }
}

/// Errors raised by a [`DexStore`](crate::DexStore) backend
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl StorageError {
    /// Create a new NotFound error
    pub fn not_found(item: impl Into<String>) -> Self {
        Self::NotFound(item.into())
    }

    /// Create a new Serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }

    /// Create a new Deserialization error
    pub fn deserialization(message: impl Into<String>) -> Self {
        Self::Deserialization(message.into())
    }

    /// Create a new Database error
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database(message.into())
    }

    /// Create a new I/O error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io(message.into())
    }

    /// A stored value exists but could not be decoded
    pub fn is_unreadable(&self) -> bool {
        matches!(self, StorageError::Deserialization(_))
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err.to_string())
    }
}

impl From<postcard::Error> for StorageError {
    fn from(err: postcard::Error) -> Self {
        StorageError::Deserialization(err.to_string())
    }
}
