//! Error types for cache operations.
//!
//! Cache errors never propagate to analysis requests; the facade logs them
//! and degrades to a miss.

use thiserror::Error;

/// Errors from the durable cache tier.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Underlying SQLite failure.
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// Stored value could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Stored row holds data the current schema cannot interpret.
    #[error("Corrupt cache row: {0}")]
    Corrupt(String),
}
