//! Network-only paginated resource with a bidirectional window.

use std::sync::Arc;

use tether_core::{PagedResource, PagingConfig, Payload, WindowCursor};
use tether_store::PageSink;
use tokio::sync::mpsc;

use crate::convert::Convert;
use crate::driver::{request, DriverGuard};
use crate::error::Result;
use crate::executor::Executors;
use crate::network_paged::{Command, Direction, NetworkPaged, PageCursor};
use crate::outcome::LoadOutcome;
use crate::publisher::{StatePublisher, StateStream};
use crate::transport::PageFetcher;

/// Pages fetched around an anchor offset, in both directions.
///
/// The resource keeps a `[start, end)` window, both starting at the anchor.
///
/// - The initial load fetches `initial_load_size_hint` items at `start` and
///   grows `end` by the number delivered.
/// - [`load_after`](Self::load_after) fetches at `end` and, when issued,
///   slides the window to `[end, end + page_size)`.
/// - [`load_before`](Self::load_before) fetches the `min(start, page_size)`
///   items before `start` and, once they arrive, slides the window back so
///   it ends at the old `start`.
///
/// Published pages carry their absolute offset.
pub struct WindowPagedResource<T, R> {
    anchor: usize,
    publisher: Arc<StatePublisher<PagedResource<T, R>>>,
    commands: mpsc::Sender<Command>,
    _driver: DriverGuard,
}

impl<T: Payload, R: Payload> WindowPagedResource<T, R> {
    /// Start the resource at `anchor`. Must be called from within a Tokio
    /// runtime.
    pub fn spawn(
        anchor: usize,
        fetcher: Arc<dyn PageFetcher<R>>,
        convert: Arc<dyn Convert<R, Vec<T>>>,
        sink: Arc<dyn PageSink<T>>,
        config: PagingConfig,
        executors: Executors,
    ) -> Self {
        let hooks = NetworkPaged {
            fetcher,
            convert,
            sink,
            config,
            executors,
        };
        let (publisher, commands, driver) = hooks.spawn(PageCursor::Window(WindowCursor::new(anchor)));
        Self {
            anchor,
            publisher,
            commands,
            _driver: driver,
        }
    }

    pub fn anchor(&self) -> usize {
        self.anchor
    }

    pub fn subscribe(&self) -> StateStream<PagedResource<T, R>> {
        self.publisher.subscribe()
    }

    pub fn current(&self) -> PagedResource<T, R> {
        self.publisher.current()
    }

    /// Fetch the page after the window and hand it to the sink.
    pub async fn load_after(&self) -> Result<LoadOutcome> {
        request(&self.commands, |reply| Command::Load {
            direction: Direction::After,
            reply,
        })
        .await
    }

    /// Fetch the page before the window.
    ///
    /// Reports [`LoadOutcome::AtOrigin`] without fetching when the window
    /// already starts at zero.
    pub async fn load_before(&self) -> Result<LoadOutcome> {
        request(&self.commands, |reply| Command::Load {
            direction: Direction::Before,
            reply,
        })
        .await
    }

    /// The current `(start, end)` window.
    pub async fn current_window(&self) -> Result<(usize, usize)> {
        let cursor = request(&self.commands, |reply| Command::Cursor { reply }).await?;
        Ok(match cursor {
            PageCursor::Window(window) => window.bounds(),
            PageCursor::Skip(cursor) => (0, cursor.skip()),
        })
    }
}
