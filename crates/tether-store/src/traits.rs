//! Store traits: the abstract interface for local persistence.
//!
//! Reads are observable so a synchronizer can re-publish every local change,
//! and writes are async so implementations are free to hop onto a blocking
//! pool internally.

use async_trait::async_trait;
use tokio::sync::watch;

use crate::error::Result;

/// Write hook for a single value.
///
/// Used on its own by network-only resources, which persist what they fetch
/// but never read it back.
#[async_trait]
pub trait Sink<T: Send + 'static>: Send + Sync {
    /// Persist `item`. `None` records the absence of a value.
    async fn save(&self, item: Option<T>) -> Result<()>;
}

/// A single observable record.
///
/// Saving through the [`Sink`] half is expected to make [`observe`]
/// receivers see the new value, which closes the loop for a bound resource.
///
/// [`observe`]: RecordStore::observe
pub trait RecordStore<T: Send + 'static>: Sink<T> {
    /// Subscribe to the current record and every later change.
    fn observe(&self) -> watch::Receiver<Option<T>>;
}

/// Write hook for a page of items fetched by a network-only resource.
#[async_trait]
pub trait PageSink<T: Send + 'static>: Send + Sync {
    async fn save_page(&self, items: Vec<T>) -> Result<()>;
}

/// An ordered local list, readable by range.
///
/// # Design Notes
///
/// - Positions are dense and zero-based in insertion order.
/// - Every successful write must bump the value on [`invalidations`] so
///   observers reload their view.
///
/// [`invalidations`]: PagedStore::invalidations
#[async_trait]
pub trait PagedStore<T: Send + 'static>: Send + Sync {
    /// Number of items held locally.
    async fn count(&self) -> Result<usize>;

    /// Items in `[offset, offset + limit)`, fewer at the tail.
    async fn load_range(&self, offset: usize, limit: usize) -> Result<Vec<T>>;

    /// Replace the whole local set with `items`.
    async fn clear_insert(&self, items: Vec<T>) -> Result<()>;

    /// Append `items` after the current tail.
    async fn save_call_result(&self, items: Vec<T>) -> Result<()>;

    /// Change signal. The value is a version that increases on every write.
    fn invalidations(&self) -> watch::Receiver<u64>;
}
