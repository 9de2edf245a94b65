//! Error types for the sync module.
//!
//! These never reach a consumer's state stream directly. Drivers fold them
//! into [`Resource::Error`](tether_core::Resource) or
//! [`PagedResource::Error`](tether_core::PagedResource) and log them.

use thiserror::Error;

/// Errors that can occur inside a synchronizer.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Store operation failed.
    #[error("store error: {0}")]
    Store(#[from] tether_store::StoreError),

    /// The conversion task panicked or was cancelled.
    #[error("conversion task failed: {0}")]
    Conversion(String),

    /// The driver task is no longer running.
    #[error("synchronizer stopped")]
    Stopped,
}

/// Result type for sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;
