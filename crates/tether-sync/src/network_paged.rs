//! Driver shared by the network-only paginated resources.
//!
//! There is no local read path: pages go straight from the network to the
//! consumer, and forward pages are also handed to a [`PageSink`]. The two
//! public variants differ only in the cursor they configure this driver
//! with, see [`ForwardPagedResource`](crate::ForwardPagedResource) and
//! [`WindowPagedResource`](crate::WindowPagedResource).
//!
//! Unlike the cache-first resource, a failed fetch does not stop later
//! ones: any page can be requested again.

use std::sync::Arc;

use tether_core::{
    Classified, CursorAdvance, PagedList, PagedResource, PagingConfig, Payload, SkipCursor,
    StructuredError, TransportError, WindowCursor, STORE_FAILURE_CODE, TRANSPORT_FAILURE_CODE,
};
use tether_store::PageSink;
use tokio::sync::{mpsc, oneshot};
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, warn};

use crate::convert::Convert;
use crate::driver::{respond, DriverGuard, COMMAND_BUFFER};
use crate::error::Result;
use crate::executor::Executors;
use crate::outcome::LoadOutcome;
use crate::publisher::StatePublisher;
use crate::transport::PageFetcher;

/// Cursor a network-only driver is configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PageCursor {
    /// Forward-only offset; backward loads are unsupported.
    Skip(SkipCursor),
    /// Bidirectional window around an anchor.
    Window(WindowCursor),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    Initial,
    After,
    Before,
}

pub(crate) enum Command {
    Load {
        direction: Direction,
        reply: oneshot::Sender<LoadOutcome>,
    },
    Cursor {
        reply: oneshot::Sender<PageCursor>,
    },
}

/// A fetch as issued: where it reads and what it asked for.
#[derive(Debug, Clone, Copy)]
struct Issued {
    direction: Direction,
    skip: usize,
    limit: usize,
}

enum Stage<T, R> {
    Fetched {
        issued: Issued,
        response: Classified<R>,
    },
    Converted {
        issued: Issued,
        status: u16,
        raw: R,
        items: Result<Option<Vec<T>>>,
    },
}

/// Everything a network-only resource needs to run.
pub(crate) struct NetworkPaged<T, R> {
    pub(crate) fetcher: Arc<dyn PageFetcher<R>>,
    pub(crate) convert: Arc<dyn Convert<R, Vec<T>>>,
    pub(crate) sink: Arc<dyn PageSink<T>>,
    pub(crate) config: PagingConfig,
    pub(crate) executors: Executors,
}

impl<T: Payload, R: Payload> NetworkPaged<T, R> {
    /// Spawn the driver and start the initial load.
    pub(crate) fn spawn(
        self,
        cursor: PageCursor,
    ) -> (
        Arc<StatePublisher<PagedResource<T, R>>>,
        mpsc::Sender<Command>,
        DriverGuard,
    ) {
        let publisher = Arc::new(StatePublisher::new(
            PagedResource::Loading,
            self.executors.state_capacity(),
        ));
        let (commands, inbox) = mpsc::channel(COMMAND_BUFFER);

        let driver = NetworkPagedDriver {
            hooks: self,
            publisher: Arc::clone(&publisher),
            inbox,
            tasks: JoinSet::new(),
            cursor,
            in_flight: false,
        };
        (publisher, commands, DriverGuard::spawn(driver.run()))
    }
}

struct NetworkPagedDriver<T, R> {
    hooks: NetworkPaged<T, R>,
    publisher: Arc<StatePublisher<PagedResource<T, R>>>,
    inbox: mpsc::Receiver<Command>,
    tasks: JoinSet<Stage<T, R>>,
    cursor: PageCursor,
    in_flight: bool,
}

impl<T: Payload, R: Payload> NetworkPagedDriver<T, R> {
    async fn run(mut self) {
        self.load(Direction::Initial);

        loop {
            tokio::select! {
                command = self.inbox.recv() => match command {
                    Some(Command::Load { direction, reply }) => {
                        let outcome = self.load(direction);
                        respond(reply, outcome);
                    }
                    Some(Command::Cursor { reply }) => respond(reply, self.cursor),
                    None => break,
                },
                Some(joined) = self.tasks.join_next() => self.handle_joined(joined).await,
            }
        }
    }

    fn load(&mut self, direction: Direction) -> LoadOutcome {
        if direction == Direction::Before && matches!(self.cursor, PageCursor::Skip(_)) {
            return LoadOutcome::Unsupported;
        }
        if self.in_flight {
            debug!(?direction, "fetch in flight, load suppressed");
            return LoadOutcome::InFlight;
        }

        let (skip, limit) = match self.plan(direction) {
            Ok(request) => request,
            Err(refused) => {
                debug!(?direction, ?refused, "load refused");
                return refused;
            }
        };

        self.in_flight = true;
        debug!(?direction, skip, limit, "fetching page");

        let issued = Issued {
            direction,
            skip,
            limit,
        };
        let fetcher = Arc::clone(&self.hooks.fetcher);
        let executors = self.hooks.executors.clone();
        self.tasks.spawn(async move {
            let response = executors.run_io(fetcher.fetch_page(skip, limit)).await;
            Stage::Fetched {
                issued,
                response: Classified::from_result(response),
            }
        });
        LoadOutcome::Issued
    }

    /// Pick `(skip, limit)` for a load and apply issue-time cursor moves.
    fn plan(&mut self, direction: Direction) -> std::result::Result<(usize, usize), LoadOutcome> {
        let config = &self.hooks.config;
        let page_size = config.list.page_size;
        let hint = config.list.initial_load_size_hint;

        match (&mut self.cursor, direction) {
            (PageCursor::Skip(_), Direction::Initial) => {
                Ok((0, config.max_item_limit.unwrap_or(hint)))
            }
            (PageCursor::Skip(cursor), Direction::After) => {
                let request = cursor
                    .next_request(config.max_item_limit, page_size)
                    .ok_or(LoadOutcome::LimitReached)?;
                if config.cursor_advance == CursorAdvance::Requested {
                    cursor.advance(page_size);
                }
                Ok(request)
            }
            (PageCursor::Window(window), Direction::Initial) => {
                Ok((window.start(), config.max_item_limit.unwrap_or(hint)))
            }
            (PageCursor::Window(window), Direction::After) => {
                let request = window
                    .after_request(config.max_item_limit, page_size)
                    .ok_or(LoadOutcome::LimitReached)?;
                window.commit_after(page_size);
                Ok(request)
            }
            (PageCursor::Window(window), Direction::Before) => {
                window.before_request(page_size).ok_or(LoadOutcome::AtOrigin)
            }
            (PageCursor::Skip(_), Direction::Before) => Err(LoadOutcome::Unsupported),
        }
    }

    async fn handle_joined(&mut self, joined: std::result::Result<Stage<T, R>, JoinError>) {
        match joined {
            Ok(Stage::Fetched { issued, response }) => self.on_fetched(issued, response).await,
            Ok(Stage::Converted {
                issued,
                status,
                raw,
                items,
            }) => match items {
                Ok(items) => self.on_items(issued, Some(raw), items.unwrap_or_default()).await,
                Err(e) => {
                    error!(skip = issued.skip, error = %e, "page conversion failed");
                    self.fail(StructuredError::conversion(e.to_string()), status);
                }
            },
            Err(e) => {
                error!(error = %e, "fetch task failed");
                let error = StructuredError::transport(TransportError::Other(e.to_string()));
                self.fail(error, TRANSPORT_FAILURE_CODE);
            }
        }
    }

    async fn on_fetched(&mut self, issued: Issued, response: Classified<R>) {
        match response {
            Classified::Failed { error, code } => {
                warn!(skip = issued.skip, limit = issued.limit, code, %error, "page fetch failed");
                self.fail(error, code);
            }
            Classified::NoBody { status } => {
                debug!(skip = issued.skip, status, "response without body");
                self.on_items(issued, None, Vec::new()).await;
            }
            Classified::Body { status, body } => {
                let convert = Arc::clone(&self.hooks.convert);
                let executors = self.hooks.executors.clone();
                self.tasks.spawn(async move {
                    let raw = body.clone();
                    let items = executors.run_cpu(move || convert.convert(&body)).await;
                    Stage::Converted {
                        issued,
                        status,
                        raw,
                        items,
                    }
                });
            }
        }
    }

    /// Deliver a finished page. `raw` is `None` when the response had no
    /// body.
    async fn on_items(&mut self, issued: Issued, raw: Option<R>, items: Vec<T>) {
        let delivered = items.len();
        let has_body = raw.is_some();

        if self.persists(issued.direction) && !items.is_empty() {
            if let Err(e) = self.hooks.sink.save_page(items.clone()).await {
                error!(skip = issued.skip, error = %e, "failed to save page");
                self.fail(StructuredError::store(e.to_string()), STORE_FAILURE_CODE);
                return;
            }
        }

        match (&mut self.cursor, issued.direction) {
            (PageCursor::Skip(cursor), Direction::Initial) => cursor.advance(delivered),
            (PageCursor::Skip(cursor), Direction::After) => {
                if self.hooks.config.cursor_advance == CursorAdvance::Delivered {
                    cursor.advance(delivered);
                }
            }
            (PageCursor::Window(window), Direction::Initial) => window.record_initial(delivered),
            (PageCursor::Window(window), Direction::Before) => {
                if has_body {
                    window.commit_before(issued.limit);
                }
            }
            // Backward loads on a skip cursor are refused before any fetch.
            (PageCursor::Window(_), Direction::After) | (PageCursor::Skip(_), Direction::Before) => {}
        }

        self.in_flight = false;
        debug!(direction = ?issued.direction, skip = issued.skip, delivered, "page delivered");

        if items.is_empty() {
            self.publisher.publish(PagedResource::Complete(raw));
            match issued.direction {
                Direction::Initial => {
                    self.publisher.publish(PagedResource::Empty);
                }
                Direction::After => {
                    self.publisher.publish(PagedResource::End);
                }
                Direction::Before => {
                    if !has_body {
                        self.publisher.publish(PagedResource::End);
                    }
                }
            }
            return;
        }

        self.publisher
            .publish(PagedResource::Page(PagedList::new(items, issued.skip)));
        self.publisher.publish(PagedResource::Complete(raw));
    }

    /// Whether pages loaded in `direction` go to the sink. The initial page
    /// never does; a window also keeps what it loads backwards.
    fn persists(&self, direction: Direction) -> bool {
        match (direction, &self.cursor) {
            (Direction::After, _) => true,
            (Direction::Before, PageCursor::Window(_)) => true,
            (Direction::Initial, _) | (Direction::Before, PageCursor::Skip(_)) => false,
        }
    }

    fn fail(&mut self, error: StructuredError, code: u16) {
        self.in_flight = false;
        self.publisher.publish(PagedResource::error(error, code));
    }
}
