//! Error types for SupplyKV
//!
//! Provides a unified error type for storage and inventory operations.

use thiserror::Error;

/// Result type alias using SupplyError
pub type Result<T> = std::result::Result<T, SupplyError>;

/// Unified error type for SupplyKV operations
#[derive(Debug, Error)]
pub enum SupplyError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // WAL Errors
    // -------------------------------------------------------------------------
    #[error("WAL corruption detected: {0}")]
    WalCorruption(String),

    #[error("WAL write failed: {0}")]
    WalWrite(String),

    // -------------------------------------------------------------------------
    // Storage Errors
    // -------------------------------------------------------------------------
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Key not found")]
    KeyNotFound,

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Inventory Errors
    // -------------------------------------------------------------------------
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("the {entity} with id={id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("the {entity} with id={id} referenced by this record not found")]
    DependencyNotFound { entity: &'static str, id: String },

    #[error("No product with supplier id={0}")]
    NoProducts(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Concurrency Errors
    // -------------------------------------------------------------------------
    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),
}

impl From<bincode::Error> for SupplyError {
    fn from(err: bincode::Error) -> Self {
        SupplyError::Serialization(err.to_string())
    }
}

impl SupplyError {
    /// True for the "id absent in target store" family
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            SupplyError::NotFound { .. } | SupplyError::DependencyNotFound { .. } | SupplyError::NoProducts(_)
        )
    }
}
