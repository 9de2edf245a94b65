//! Network-only resource: one typed fetch, saved but never read back.

use std::sync::Arc;

use tether_core::{Classified, Payload, Resource, StructuredError, STORE_FAILURE_CODE};
use tether_store::Sink;
use tracing::{debug, error, warn};

use crate::driver::DriverGuard;
use crate::executor::Executors;
use crate::publisher::{StatePublisher, StateStream};
use crate::transport::Fetcher;

/// A single fetch whose body is already the record type.
///
/// Publishes `Loading`, then `Success(body, status)` once the body has been
/// handed to the sink, or `Error` if the fetch fails.
pub struct NetworkOnlyResource<T> {
    publisher: Arc<StatePublisher<Resource<T>>>,
    _driver: DriverGuard,
}

impl<T: Payload> NetworkOnlyResource<T> {
    /// Start the fetch. Must be called from within a Tokio runtime.
    pub fn spawn(fetcher: Arc<dyn Fetcher<T>>, sink: Arc<dyn Sink<T>>, executors: Executors) -> Self {
        let publisher = Arc::new(StatePublisher::new(
            Resource::Loading,
            executors.state_capacity(),
        ));
        let driver = fetch_once(fetcher, sink, executors, Arc::clone(&publisher));
        Self {
            publisher,
            _driver: DriverGuard::spawn(driver),
        }
    }

    pub fn subscribe(&self) -> StateStream<Resource<T>> {
        self.publisher.subscribe()
    }

    pub fn current(&self) -> Resource<T> {
        self.publisher.current()
    }
}

async fn fetch_once<T: Payload>(
    fetcher: Arc<dyn Fetcher<T>>,
    sink: Arc<dyn Sink<T>>,
    executors: Executors,
    publisher: Arc<StatePublisher<Resource<T>>>,
) {
    debug!("fetching");
    let response = executors.run_io(fetcher.fetch()).await;

    let (body, status) = match Classified::from_result(response) {
        Classified::Failed { error, code } => {
            warn!(code, %error, "fetch failed");
            publisher.publish(Resource::error(error, code));
            return;
        }
        Classified::NoBody { status } => (None, status),
        Classified::Body { status, body } => (Some(body), status),
    };

    if let Err(e) = sink.save(body.clone()).await {
        error!(error = %e, "failed to save response body");
        publisher.publish(Resource::error(
            StructuredError::store(e.to_string()),
            STORE_FAILURE_CODE,
        ));
        return;
    }
    publisher.publish(Resource::success(body, status));
}
