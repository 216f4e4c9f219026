//! Error types for the Pokedex service

use pokedex_core::{DexError, StorageError};
use thiserror::Error;

/// Errors that can occur in the service layer
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Request validation or engine failure
    #[error(transparent)]
    Dex(#[from] DexError),

    /// Storage backend failure outside a mutation
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServiceError {
    /// Whether the caller sent an invalid request
    pub fn is_rejected_request(&self) -> bool {
        matches!(self, ServiceError::Dex(e) if e.is_validation())
    }
}

impl From<toml::de::Error> for ServiceError {
    fn from(e: toml::de::Error) -> Self {
        ServiceError::Config(e.to_string())
    }
}

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
