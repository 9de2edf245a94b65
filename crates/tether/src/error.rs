//! Error types for the Tether facade.

use tether_core::ConfigError;
use tether_store::StoreError;
use tether_sync::SyncError;
use thiserror::Error;

/// Errors that can occur during Tether operations.
#[derive(Debug, Error)]
pub enum TetherError {
    /// Configuration rejected.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Sync error.
    #[error("sync error: {0}")]
    Sync(#[from] SyncError),
}

/// Result type for Tether operations.
pub type Result<T> = std::result::Result<T, TetherError>;
