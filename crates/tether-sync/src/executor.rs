//! The two bounded pools synchronizers submit work to.
//!
//! Network calls run under the I/O permits, payload conversion under the
//! CPU permits on Tokio's blocking pool. Both are shared by every
//! synchronizer built from the same [`Executors`], which bounds the total
//! amount of concurrent work regardless of how many resources are alive.

use std::future::Future;
use std::sync::Arc;

use tether_core::ExecutorConfig;
use tokio::sync::Semaphore;

use crate::error::{Result, SyncError};

/// Shared I/O and CPU pools.
#[derive(Debug, Clone)]
pub struct Executors {
    io: Arc<Semaphore>,
    cpu: Arc<Semaphore>,
    state_capacity: usize,
}

impl Executors {
    pub fn new(config: &ExecutorConfig) -> Self {
        Self {
            io: Arc::new(Semaphore::new(config.io_permits)),
            cpu: Arc::new(Semaphore::new(config.cpu_permits)),
            state_capacity: config.state_capacity,
        }
    }

    /// Buffer size of each state stream.
    pub fn state_capacity(&self) -> usize {
        self.state_capacity
    }

    /// Run a network call once an I/O permit is available.
    pub async fn run_io<F: Future>(&self, call: F) -> F::Output {
        // The semaphore is never closed, so acquisition only waits.
        let _permit = self.io.acquire().await.ok();
        call.await
    }

    /// Run a synchronous conversion on the blocking pool once a CPU permit
    /// is available.
    ///
    /// A panic inside `work` is reported as [`SyncError::Conversion`].
    pub async fn run_cpu<F, O>(&self, work: F) -> Result<O>
    where
        F: FnOnce() -> O + Send + 'static,
        O: Send + 'static,
    {
        let _permit = self.cpu.acquire().await.ok();
        tokio::task::spawn_blocking(work)
            .await
            .map_err(|e| SyncError::Conversion(e.to_string()))
    }

    /// Free I/O permits, for diagnostics.
    pub fn available_io(&self) -> usize {
        self.io.available_permits()
    }

    /// Free CPU permits, for diagnostics.
    pub fn available_cpu(&self) -> usize {
        self.cpu.available_permits()
    }
}

impl Default for Executors {
    fn default() -> Self {
        Self::new(&ExecutorConfig::default())
    }
}
