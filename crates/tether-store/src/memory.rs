//! In-memory implementations of the store traits.
//!
//! These are primarily for testing and for hosts that only need a
//! process-lifetime cache. Writes notify observers the same way a real
//! engine's change feed would.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use tokio::sync::watch;

use crate::error::Result;
use crate::traits::{PageSink, PagedStore, RecordStore, Sink};

/// A single observable record held in memory.
pub struct MemoryRecordStore<T> {
    record: watch::Sender<Option<T>>,
    writes: AtomicUsize,
}

impl<T> MemoryRecordStore<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::with_record(None)
    }

    /// Create a store that already holds `record`.
    pub fn with_record(record: Option<T>) -> Self {
        let (tx, _) = watch::channel(record);
        Self {
            record: tx,
            writes: AtomicUsize::new(0),
        }
    }

    /// Number of saves performed since construction.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl<T: Clone> MemoryRecordStore<T> {
    /// The record currently held.
    pub fn get(&self) -> Option<T> {
        self.record.borrow().clone()
    }
}

impl<T> Default for MemoryRecordStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Send + Sync + 'static> Sink<T> for MemoryRecordStore<T> {
    async fn save(&self, item: Option<T>) -> Result<()> {
        self.record.send_replace(item);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl<T: Send + Sync + 'static> RecordStore<T> for MemoryRecordStore<T> {
    fn observe(&self) -> watch::Receiver<Option<T>> {
        self.record.subscribe()
    }
}

/// An ordered list held in memory.
///
/// Thread-safe via RwLock. The lock is never held across an await.
pub struct MemoryPagedStore<T> {
    items: RwLock<Vec<T>>,
    version: watch::Sender<u64>,
}

impl<T> MemoryPagedStore<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::with_items(Vec::new())
    }

    /// Create a store seeded with `items`.
    pub fn with_items(items: Vec<T>) -> Self {
        let (version, _) = watch::channel(0);
        Self {
            items: RwLock::new(items),
            version,
        }
    }

    /// Current change version. Zero until the first write.
    pub fn version(&self) -> u64 {
        *self.version.borrow()
    }

    fn bump(&self) {
        self.version.send_modify(|v| *v += 1);
    }
}

impl<T: Clone> MemoryPagedStore<T> {
    /// Copy of everything held.
    pub fn snapshot(&self) -> Vec<T> {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl<T> Default for MemoryPagedStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Clone + Send + Sync + 'static> PagedStore<T> for MemoryPagedStore<T> {
    async fn count(&self) -> Result<usize> {
        Ok(self.items.read().unwrap_or_else(PoisonError::into_inner).len())
    }

    async fn load_range(&self, offset: usize, limit: usize) -> Result<Vec<T>> {
        let items = self.items.read().unwrap_or_else(PoisonError::into_inner);
        Ok(items.iter().skip(offset).take(limit).cloned().collect())
    }

    async fn clear_insert(&self, items: Vec<T>) -> Result<()> {
        *self.items.write().unwrap_or_else(PoisonError::into_inner) = items;
        self.bump();
        Ok(())
    }

    async fn save_call_result(&self, items: Vec<T>) -> Result<()> {
        self.items
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(items);
        self.bump();
        Ok(())
    }

    fn invalidations(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }
}

#[async_trait]
impl<T: Clone + Send + Sync + 'static> PageSink<T> for MemoryPagedStore<T> {
    async fn save_page(&self, items: Vec<T>) -> Result<()> {
        self.save_call_result(items).await
    }
}

/// Sink that drops everything written to it.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardSink;

#[async_trait]
impl<T: Send + 'static> Sink<T> for DiscardSink {
    async fn save(&self, _item: Option<T>) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl<T: Send + 'static> PageSink<T> for DiscardSink {
    async fn save_page(&self, items: Vec<T>) -> Result<()> {
        tracing::trace!(count = items.len(), "discarding page");
        Ok(())
    }
}
