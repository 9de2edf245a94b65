//! Plumbing shared by every synchronizer handle and its driver task.
//!
//! Each synchronizer is split into a handle (what the consumer holds) and a
//! driver task that owns all mutable state: cursor, single-flight flag and
//! in-flight work. The handle talks to the driver over a command channel
//! and the driver answers over a oneshot.

use std::future::Future;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::error::{Result, SyncError};

/// Commands buffered per synchronizer before senders wait.
pub(crate) const COMMAND_BUFFER: usize = 16;

/// Aborts the driver task when the owning handle is dropped.
///
/// The driver owns the `JoinSet` of its in-flight fetches, so aborting it
/// aborts those as well.
#[derive(Debug)]
pub(crate) struct DriverGuard(JoinHandle<()>);

impl DriverGuard {
    pub(crate) fn spawn<F>(driver: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self(tokio::spawn(driver))
    }
}

impl Drop for DriverGuard {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Send a command built around a reply channel and wait for the answer.
pub(crate) async fn request<C, O>(
    commands: &mpsc::Sender<C>,
    build: impl FnOnce(oneshot::Sender<O>) -> C,
) -> Result<O> {
    let (reply, answer) = oneshot::channel();
    commands
        .send(build(reply))
        .await
        .map_err(|_| SyncError::Stopped)?;
    answer.await.map_err(|_| SyncError::Stopped)
}

/// Answer a command. The requester may have given up, which is fine.
pub(crate) fn respond<O>(reply: oneshot::Sender<O>, value: O) {
    let _ = reply.send(value);
}
