//! Network-only paginated resource with a forward cursor.

use std::sync::Arc;

use tether_core::{PagedResource, PagingConfig, Payload, SkipCursor};
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

/// Pages fetched forward from position zero, with no local cache.
///
/// The initial load starts on construction and fetches
/// `max_item_limit` items if a cap is set, otherwise
/// `initial_load_size_hint`. The cursor then advances by the number
/// delivered.
///
/// Each [`load_after`](Self::load_after) advances the cursor by the
/// configured page size when it is issued, regardless of how many items the
/// server returns, unless [`CursorAdvance::Delivered`] is configured.
///
/// [`CursorAdvance::Delivered`]: tether_core::CursorAdvance::Delivered
pub struct ForwardPagedResource<T, R> {
    publisher: Arc<StatePublisher<PagedResource<T, R>>>,
    commands: mpsc::Sender<Command>,
    _driver: DriverGuard,
}

impl<T: Payload, R: Payload> ForwardPagedResource<T, R> {
    /// Start the resource. Must be called from within a Tokio runtime.
    pub fn spawn(
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
        let (publisher, commands, driver) = hooks.spawn(PageCursor::Skip(SkipCursor::new()));
        Self {
            publisher,
            commands,
            _driver: driver,
        }
    }

    pub fn subscribe(&self) -> StateStream<PagedResource<T, R>> {
        self.publisher.subscribe()
    }

    pub fn current(&self) -> PagedResource<T, R> {
        self.publisher.current()
    }

    /// Fetch the page after the cursor and hand it to the sink.
    pub async fn load_after(&self) -> Result<LoadOutcome> {
        request(&self.commands, |reply| Command::Load {
            direction: Direction::After,
            reply,
        })
        .await
    }

    /// Backward paging is not supported; always reports
    /// [`LoadOutcome::Unsupported`].
    pub async fn load_before(&self) -> Result<LoadOutcome> {
        request(&self.commands, |reply| Command::Load {
            direction: Direction::Before,
            reply,
        })
        .await
    }

    /// The skip offset the next `load_after` would use.
    pub async fn current_cursor(&self) -> Result<usize> {
        let cursor = request(&self.commands, |reply| Command::Cursor { reply }).await?;
        Ok(match cursor {
            PageCursor::Skip(cursor) => cursor.skip(),
            PageCursor::Window(window) => window.end(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::memory::ScriptedTransport;
    use tether_core::{CursorAdvance, PagedListConfig, PagedStatus, TransportError};
    use tether_store::MemoryPagedStore;

    type Forward = ForwardPagedResource<u32, Vec<u32>>;

    fn pass_through(raw: &Vec<u32>) -> Option<Vec<u32>> {
        Some(raw.clone())
    }

    fn config() -> PagingConfig {
        PagingConfig::new().with_list(PagedListConfig::new(2).with_initial_load_size_hint(3))
    }

    fn spawn(
        transport: &Arc<ScriptedTransport<Vec<u32>>>,
        sink: &Arc<MemoryPagedStore<u32>>,
        config: PagingConfig,
    ) -> Forward {
        ForwardPagedResource::spawn(
            transport.clone(),
            Arc::new(pass_through),
            sink.clone(),
            config,
            Executors::default(),
        )
    }

    /// Wait for the initial load to finish.
    async fn initial_load(resource: &Forward) {
        let mut states = resource.subscribe();
        states
            .wait_for(|s| !matches!(s, PagedResource::Loading | PagedResource::Page(_)))
            .await
            .unwrap();
    }

    /// Issue `load_after` and wait for its round trip to finish.
    async fn load_after_settled(resource: &Forward) -> LoadOutcome {
        let mut states = resource.subscribe();
        states.next().await.unwrap();

        let outcome = resource.load_after().await.unwrap();
        if outcome.is_issued() {
            states
                .wait_for(|s| matches!(s, PagedResource::Complete(_) | PagedResource::Error { .. }))
                .await
                .unwrap();
        }
        outcome
    }

    #[tokio::test]
    async fn test_initial_load_delivers_page() {
        let transport = Arc::new(ScriptedTransport::new());
        let sink = Arc::new(MemoryPagedStore::new());
        transport.push_ok(vec![1, 2, 3]);

        let resource = spawn(&transport, &sink, config());
        let mut states = resource.subscribe();

        assert_eq!(states.next().await, Some(PagedResource::Loading));
        let page = states.next().await.unwrap();
        assert_eq!(page.page().map(|p| (p.offset(), p.items().to_vec())), Some((0, vec![1, 2, 3])));
        assert_eq!(
            states.next().await,
            Some(PagedResource::Complete(Some(vec![1, 2, 3])))
        );

        assert_eq!(resource.current_cursor().await.unwrap(), 3);
        assert_eq!(transport.page_calls(), vec![(0, 3)]);
        // The initial page is delivered, not saved.
        assert!(sink.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_empty_initial_load() {
        let transport = Arc::new(ScriptedTransport::new());
        let sink = Arc::new(MemoryPagedStore::new());
        transport.push_ok(vec![]);

        let resource = spawn(&transport, &sink, config());
        let mut states = resource.subscribe();

        let empty = states.wait_for(|s| s.status() == PagedStatus::Empty).await;
        assert_eq!(empty, Some(PagedResource::Empty));
        assert_eq!(resource.current_cursor().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_cursor_advances_by_requested_size() {
        let transport = Arc::new(ScriptedTransport::new());
        let sink = Arc::new(MemoryPagedStore::new());
        // Short pages: two requested each time, one delivered.
        transport
            .push_ok(vec![1, 2, 3])
            .push_ok(vec![4])
            .push_ok(vec![5])
            .push_ok(vec![6]);

        let resource = spawn(&transport, &sink, config());
        initial_load(&resource).await;

        for _ in 0..3 {
            assert_eq!(load_after_settled(&resource).await, LoadOutcome::Issued);
        }

        assert_eq!(resource.current_cursor().await.unwrap(), 3 + 3 * 2);
        assert_eq!(transport.page_calls(), vec![(0, 3), (3, 2), (5, 2), (7, 2)]);
        assert_eq!(sink.snapshot(), vec![4, 5, 6]);
    }

    #[tokio::test]
    async fn test_cursor_advances_by_delivered_size_when_configured() {
        let transport = Arc::new(ScriptedTransport::new());
        let sink = Arc::new(MemoryPagedStore::new());
        transport.push_ok(vec![1, 2, 3]).push_ok(vec![4]).push_ok(vec![5]);

        let resource = spawn(
            &transport,
            &sink,
            config().with_cursor_advance(CursorAdvance::Delivered),
        );
        initial_load(&resource).await;

        for _ in 0..2 {
            assert_eq!(load_after_settled(&resource).await, LoadOutcome::Issued);
        }

        assert_eq!(resource.current_cursor().await.unwrap(), 5);
        assert_eq!(transport.page_calls(), vec![(0, 3), (3, 2), (4, 2)]);
    }

    #[tokio::test]
    async fn test_load_after_suppressed_while_in_flight() {
        let transport = Arc::new(ScriptedTransport::gated());
        let sink = Arc::new(MemoryPagedStore::new());
        transport.push_ok(vec![1, 2, 3]);

        let resource = spawn(&transport, &sink, config());

        assert_eq!(resource.load_after().await.unwrap(), LoadOutcome::InFlight);
        assert_eq!(resource.load_after().await.unwrap(), LoadOutcome::InFlight);
        assert_eq!(transport.call_count(), 1);
        transport.release(1);
    }

    #[tokio::test]
    async fn test_cap_limits_requests() {
        let transport = Arc::new(ScriptedTransport::new());
        let sink = Arc::new(MemoryPagedStore::new());
        transport.push_ok(vec![1, 2, 3]).push_ok(vec![4]);

        let resource = spawn(&transport, &sink, config().with_max_item_limit(4));
        initial_load(&resource).await;
        assert_eq!(transport.page_calls(), vec![(0, 4)]);

        assert_eq!(load_after_settled(&resource).await, LoadOutcome::Issued);
        assert_eq!(transport.page_calls(), vec![(0, 4), (3, 1)]);

        assert_eq!(load_after_settled(&resource).await, LoadOutcome::LimitReached);
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_later_loads() {
        let transport = Arc::new(ScriptedTransport::new());
        let sink = Arc::new(MemoryPagedStore::new());
        transport
            .push_error(TransportError::Timeout)
            .push_ok(vec![9]);

        let resource = spawn(&transport, &sink, config());
        let mut states = resource.subscribe();

        let failed = states.wait_for(|s| s.status() == PagedStatus::Error).await.unwrap();
        assert_eq!(failed.code(), Some(800));

        assert_eq!(resource.load_after().await.unwrap(), LoadOutcome::Issued);
        let page = states.wait_for(|s| s.status() == PagedStatus::Page).await.unwrap();
        assert_eq!(page.page().map(|p| p.items().to_vec()), Some(vec![9]));
    }

    #[tokio::test]
    async fn test_empty_page_after_is_end() {
        let transport = Arc::new(ScriptedTransport::new());
        let sink = Arc::new(MemoryPagedStore::new());
        transport.push_ok(vec![1]).push_no_content();

        let resource = spawn(&transport, &sink, config());
        initial_load(&resource).await;

        resource.load_after().await.unwrap();
        let mut states = resource.subscribe();
        let end = states.wait_for(|s| s.status() == PagedStatus::End).await;
        assert_eq!(end, Some(PagedResource::End));
    }

    #[tokio::test]
    async fn test_load_before_unsupported() {
        let transport = Arc::new(ScriptedTransport::new());
        let sink = Arc::new(MemoryPagedStore::new());
        transport.push_ok(vec![1]);

        let resource = spawn(&transport, &sink, config());
        assert_eq!(resource.load_before().await.unwrap(), LoadOutcome::Unsupported);
    }
}
