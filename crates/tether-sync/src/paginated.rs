//! Cache-first paginated resource.
//!
//! A local paged list is the source of what the consumer sees; the network
//! only ever fills the local store. Fetches walk forward from position zero
//! with a [`SkipCursor`] and are triggered when the consumer reads near the
//! end of what is stored locally.
//!
//! # Fetch pipeline
//!
//! ```text
//! boundary ──> fetch (I/O pool) ──> Complete(raw) ──> convert (CPU pool)
//!                                                        │
//!        Page <── reload view <── clear_insert / append <┘
//! ```
//!
//! The single-flight flag is set when the fetch is issued and cleared only
//! after the page has been persisted and the cursor advanced.
//!
//! # Circuit break
//!
//! The first failed fetch (transport error or non-2xx) stops all further
//! fetches for the lifetime of the resource. There is no retry.

use std::sync::Arc;

use tether_core::{
    Classified, PagedList, PagedResource, PagingConfig, Payload, SkipCursor, StructuredError,
    TransportError, STORE_FAILURE_CODE, TRANSPORT_FAILURE_CODE,
};
use tether_store::{PagedStore, StoreError};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, warn};

use crate::convert::Convert;
use crate::driver::{request, respond, DriverGuard, COMMAND_BUFFER};
use crate::error::Result;
use crate::executor::Executors;
use crate::outcome::LoadOutcome;
use crate::publisher::{StatePublisher, StateStream};
use crate::transport::PageFetcher;

/// Paginated resource backed by a local paged store.
pub struct PaginatedResource<T, R> {
    publisher: Arc<StatePublisher<PagedResource<T, R>>>,
    commands: mpsc::Sender<Command>,
    _driver: DriverGuard,
}

impl<T: Payload, R: Payload> PaginatedResource<T, R> {
    /// Start the resource: publish the local view and fetch the first page.
    ///
    /// `config` is expected to be valid. Must be called from within a Tokio
    /// runtime.
    pub fn spawn(
        store: Arc<dyn PagedStore<T>>,
        fetcher: Arc<dyn PageFetcher<R>>,
        convert: Arc<dyn Convert<R, Vec<T>>>,
        config: PagingConfig,
        executors: Executors,
    ) -> Self {
        let publisher = Arc::new(StatePublisher::new(
            PagedResource::Loading,
            executors.state_capacity(),
        ));
        let (commands, inbox) = mpsc::channel(COMMAND_BUFFER);

        let driver = PaginatedDriver {
            invalidations: store.invalidations(),
            view_limit: config.list.initial_load_size_hint,
            view_len: 0,
            store,
            fetcher,
            convert,
            executors,
            config,
            publisher: Arc::clone(&publisher),
            inbox,
            tasks: JoinSet::new(),
            cursor: SkipCursor::new(),
            in_flight: false,
            is_error: false,
            watching: true,
        };

        Self {
            publisher,
            commands,
            _driver: DriverGuard::spawn(driver.run()),
        }
    }

    pub fn subscribe(&self) -> StateStream<PagedResource<T, R>> {
        self.publisher.subscribe()
    }

    pub fn current(&self) -> PagedResource<T, R> {
        self.publisher.current()
    }

    /// Report that the consumer read the item at `index`.
    ///
    /// Grows the local view when more items are stored than shown. When the
    /// view already shows everything stored and `index` is within the
    /// prefetch distance of its end, the next page is fetched.
    pub async fn load_around(&self, index: usize) -> Result<LoadOutcome> {
        request(&self.commands, |reply| Command::LoadAround { index, reply }).await
    }

    /// The skip offset the next fetch would use.
    pub async fn current_cursor(&self) -> Result<usize> {
        request(&self.commands, |reply| Command::Cursor { reply }).await
    }
}

enum Command {
    LoadAround {
        index: usize,
        reply: oneshot::Sender<LoadOutcome>,
    },
    Cursor {
        reply: oneshot::Sender<usize>,
    },
}

/// Completed unit of work from the driver's task set.
enum Stage<T, R> {
    Fetched {
        skip: usize,
        response: Classified<R>,
    },
    Converted {
        skip: usize,
        status: u16,
        items: Result<Option<Vec<T>>>,
    },
}

struct PaginatedDriver<T, R> {
    store: Arc<dyn PagedStore<T>>,
    fetcher: Arc<dyn PageFetcher<R>>,
    convert: Arc<dyn Convert<R, Vec<T>>>,
    executors: Executors,
    config: PagingConfig,
    publisher: Arc<StatePublisher<PagedResource<T, R>>>,
    inbox: mpsc::Receiver<Command>,
    invalidations: watch::Receiver<u64>,
    tasks: JoinSet<Stage<T, R>>,

    cursor: SkipCursor,
    in_flight: bool,
    is_error: bool,
    watching: bool,

    /// How many local items the view may show.
    view_limit: usize,
    /// How many it shows right now.
    view_len: usize,
}

impl<T: Payload, R: Payload> PaginatedDriver<T, R> {
    async fn run(mut self) {
        self.issue_fetch();
        self.reload_view().await;

        loop {
            tokio::select! {
                command = self.inbox.recv() => match command {
                    Some(command) => self.handle_command(command).await,
                    None => break,
                },
                Some(joined) = self.tasks.join_next() => self.handle_joined(joined).await,
                changed = self.invalidations.changed(), if self.watching => match changed {
                    Ok(()) => self.reload_view().await,
                    Err(_) => self.watching = false,
                },
            }
        }
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::LoadAround { index, reply } => {
                let outcome = self.load_around(index).await;
                respond(reply, outcome);
            }
            Command::Cursor { reply } => respond(reply, self.cursor.skip()),
        }
    }

    async fn load_around(&mut self, index: usize) -> LoadOutcome {
        if index.saturating_add(self.config.list.prefetch_distance) < self.view_len {
            return LoadOutcome::Local;
        }

        let stored = match self.store.count().await {
            Ok(count) => count,
            Err(e) => {
                warn!(error = %e, "failed to count local items");
                self.view_len
            }
        };
        if self.view_len < stored {
            self.view_limit = self.view_limit.saturating_add(self.config.list.page_size);
            self.reload_view().await;
            return LoadOutcome::Local;
        }

        // The view shows every stored item: this is the boundary.
        self.request_next()
    }

    fn request_next(&mut self) -> LoadOutcome {
        if self.in_flight {
            debug!(skip = self.cursor.skip(), "fetch in flight, boundary trigger suppressed");
            return LoadOutcome::InFlight;
        }
        if self.is_error {
            debug!("earlier fetch failed, boundary trigger suppressed");
            return LoadOutcome::CircuitOpen;
        }
        if !self.cursor.has_room(self.config.max_item_limit) {
            debug!(skip = self.cursor.skip(), "item limit reached");
            return LoadOutcome::LimitReached;
        }
        self.issue_fetch();
        LoadOutcome::Issued
    }

    fn issue_fetch(&mut self) {
        let skip = self.cursor.skip();
        let limit = self.config.fetch_limit();
        self.in_flight = true;
        debug!(skip, limit, "fetching page");

        let fetcher = Arc::clone(&self.fetcher);
        let executors = self.executors.clone();
        self.tasks.spawn(async move {
            let response = executors.run_io(fetcher.fetch_page(skip, limit)).await;
            Stage::Fetched {
                skip,
                response: Classified::from_result(response),
            }
        });
    }

    async fn handle_joined(&mut self, joined: std::result::Result<Stage<T, R>, JoinError>) {
        match joined {
            Ok(Stage::Fetched { skip, response }) => self.on_fetched(skip, response).await,
            Ok(Stage::Converted {
                skip,
                status,
                items,
            }) => match items {
                Ok(items) => self.on_items(skip, items.unwrap_or_default()).await,
                Err(e) => {
                    error!(skip, error = %e, "page conversion failed");
                    self.in_flight = false;
                    self.publisher.publish(PagedResource::error(
                        StructuredError::conversion(e.to_string()),
                        status,
                    ));
                }
            },
            Err(e) => {
                error!(error = %e, "fetch task failed");
                let error = StructuredError::transport(TransportError::Other(e.to_string()));
                self.trip(error, TRANSPORT_FAILURE_CODE);
            }
        }
    }

    async fn on_fetched(&mut self, skip: usize, response: Classified<R>) {
        match response {
            Classified::Failed { error, code } => {
                warn!(skip, code, %error, "page fetch failed, no further fetches");
                self.trip(error, code);
            }
            Classified::NoBody { status } => {
                debug!(skip, status, "response without body");
                self.publisher.publish(PagedResource::Complete(None));
                self.on_items(skip, Vec::new()).await;
            }
            Classified::Body { status, body } => {
                debug!(skip, status, "page received");
                self.publisher
                    .publish(PagedResource::Complete(Some(body.clone())));

                let convert = Arc::clone(&self.convert);
                let executors = self.executors.clone();
                self.tasks.spawn(async move {
                    let items = executors.run_cpu(move || convert.convert(&body)).await;
                    Stage::Converted {
                        skip,
                        status,
                        items,
                    }
                });
            }
        }
    }

    async fn on_items(&mut self, skip: usize, mut items: Vec<T>) {
        if items.is_empty() {
            if self.cursor.is_origin() {
                debug!("first page is empty");
                if let Err(e) = self.store.clear_insert(Vec::new()).await {
                    return self.store_failed(e);
                }
                self.in_flight = false;
                self.reload_view().await;
                self.publisher.publish(PagedResource::Empty);
            } else {
                debug!(skip, "pagination exhausted");
                self.in_flight = false;
                self.publisher.publish(PagedResource::End);
            }
            return;
        }

        if let Some(max) = self.config.max_item_limit {
            let room = max.saturating_sub(self.cursor.skip());
            if items.len() > room {
                debug!(received = items.len(), kept = room, "truncating page to item limit");
                items.truncate(room);
            }
        }

        let count = items.len();
        let written = if self.cursor.is_origin() {
            self.store.clear_insert(items).await
        } else {
            self.store.save_call_result(items).await
        };
        if let Err(e) = written {
            return self.store_failed(e);
        }

        self.cursor.advance(count);
        self.in_flight = false;
        debug!(count, skip = self.cursor.skip(), "page persisted");
        self.reload_view().await;
    }

    async fn reload_view(&mut self) {
        match self.store.load_range(0, self.view_limit).await {
            Ok(items) => {
                self.view_len = items.len();
                if !items.is_empty() {
                    self.publisher
                        .publish(PagedResource::Page(PagedList::new(items, 0)));
                } else if self.in_flight {
                    self.publisher.publish(PagedResource::Loading);
                }
            }
            Err(e) => error!(error = %e, "failed to load local page"),
        }
    }

    /// Publish a failed round trip and open the circuit for good.
    fn trip(&mut self, error: StructuredError, code: u16) {
        self.in_flight = false;
        self.is_error = true;
        self.publisher.publish(PagedResource::Complete(None));
        self.publisher.publish(PagedResource::error(error, code));
    }

    fn store_failed(&mut self, e: StoreError) {
        error!(error = %e, "failed to persist page");
        self.in_flight = false;
        self.publisher.publish(PagedResource::error(
            StructuredError::store(e.to_string()),
            STORE_FAILURE_CODE,
        ));
    }
}
