//! Simple bound resource: one local record reconciled with one fetch.

use std::sync::Arc;

use tether_core::{
    Classified, Payload, Resource, StructuredError, TransportError, HTTP_OK, STORE_FAILURE_CODE,
    TRANSPORT_FAILURE_CODE,
};
use tether_store::RecordStore;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

use crate::convert::Convert;
use crate::driver::DriverGuard;
use crate::executor::Executors;
use crate::publisher::{StatePublisher, StateStream};
use crate::transport::Fetcher;

/// Reconciles one local record with one non-paginated fetch.
///
/// On construction the resource re-publishes every emission of the local
/// record as `Success(data, 200)` and issues exactly one fetch. A successful
/// fetch is converted and saved, and the store's re-emission closes the
/// loop. A failed fetch publishes `Error`. Nothing is retried.
pub struct NetworkBoundResource<T> {
    publisher: Arc<StatePublisher<Resource<T>>>,
    _driver: DriverGuard,
}

impl<T: Payload> NetworkBoundResource<T> {
    /// Start the resource. Must be called from within a Tokio runtime.
    pub fn spawn<R: Payload>(
        store: Arc<dyn RecordStore<T>>,
        fetcher: Arc<dyn Fetcher<R>>,
        convert: Arc<dyn Convert<R, T>>,
        executors: Executors,
    ) -> Self {
        let publisher = Arc::new(StatePublisher::new(
            Resource::Loading,
            executors.state_capacity(),
        ));
        let driver = BoundDriver {
            store,
            fetcher,
            convert,
            executors,
            publisher: Arc::clone(&publisher),
        };
        Self {
            publisher,
            _driver: DriverGuard::spawn(driver.run()),
        }
    }

    pub fn subscribe(&self) -> StateStream<Resource<T>> {
        self.publisher.subscribe()
    }

    pub fn current(&self) -> Resource<T> {
        self.publisher.current()
    }
}

struct BoundDriver<T, R> {
    store: Arc<dyn RecordStore<T>>,
    fetcher: Arc<dyn Fetcher<R>>,
    convert: Arc<dyn Convert<R, T>>,
    executors: Executors,
    publisher: Arc<StatePublisher<Resource<T>>>,
}

impl<T: Payload, R: Payload> BoundDriver<T, R> {
    async fn run(self) {
        let mut records = self.store.observe();
        let initial = records.borrow_and_update().clone();
        self.publisher.publish(Resource::success(initial, HTTP_OK));

        let mut fetch = JoinSet::new();
        fetch.spawn(round_trip(
            Arc::clone(&self.store),
            Arc::clone(&self.fetcher),
            Arc::clone(&self.convert),
            self.executors.clone(),
        ));

        let mut watching = true;
        loop {
            tokio::select! {
                changed = records.changed(), if watching => match changed {
                    Ok(()) => {
                        let data = records.borrow_and_update().clone();
                        self.publisher.publish(Resource::success(data, HTTP_OK));
                    }
                    Err(_) => watching = false,
                },
                Some(joined) = fetch.join_next() => match joined {
                    Ok(Some(failure)) => {
                        self.publisher.publish(failure);
                    }
                    Ok(None) => {}
                    Err(e) => {
                        error!(error = %e, "fetch task failed");
                        let error = StructuredError::transport(TransportError::Other(e.to_string()));
                        self.publisher.publish(Resource::error(error, TRANSPORT_FAILURE_CODE));
                    }
                },
                else => break,
            }
        }
    }
}

/// Fetch, convert and save. Returns the state to publish on failure.
async fn round_trip<T: Payload, R: Payload>(
    store: Arc<dyn RecordStore<T>>,
    fetcher: Arc<dyn Fetcher<R>>,
    convert: Arc<dyn Convert<R, T>>,
    executors: Executors,
) -> Option<Resource<T>> {
    debug!("fetching record");
    let response = executors.run_io(fetcher.fetch()).await;

    let record = match Classified::from_result(response) {
        Classified::Failed { error, code } => {
            warn!(code, %error, "record fetch failed");
            return Some(Resource::error(error, code));
        }
        Classified::NoBody { status } => {
            debug!(status, "response without body");
            None
        }
        Classified::Body { status, body } => {
            match executors.run_cpu(move || convert.convert(&body)).await {
                Ok(record) => record,
                Err(e) => {
                    error!(error = %e, "record conversion failed");
                    return Some(Resource::error(StructuredError::conversion(e.to_string()), status));
                }
            }
        }
    };

    if let Err(e) = store.save(record).await {
        error!(error = %e, "failed to save fetched record");
        return Some(Resource::error(
            StructuredError::store(e.to_string()),
            STORE_FAILURE_CODE,
        ));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::memory::ScriptedTransport;
    use tether_core::{ErrorBody, Status};
    use tether_store::{MemoryRecordStore, Sink};

    fn parse(raw: &String) -> Option<u32> {
        raw.parse().ok()
    }

    fn spawn(
        store: &Arc<MemoryRecordStore<u32>>,
        transport: &Arc<ScriptedTransport<String>>,
    ) -> NetworkBoundResource<u32> {
        NetworkBoundResource::spawn::<String>(
            store.clone(),
            transport.clone(),
            Arc::new(parse),
            Executors::default(),
        )
    }

    #[tokio::test]
    async fn test_fetch_saves_and_store_reemits() {
        let store = Arc::new(MemoryRecordStore::new());
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_ok("5".to_string());

        let resource = spawn(&store, &transport);
        let mut states = resource.subscribe();

        assert_eq!(states.next().await, Some(Resource::Loading));
        assert_eq!(states.next().await, Some(Resource::success(None, 200)));
        assert_eq!(states.next().await, Some(Resource::success(Some(5), 200)));

        assert_eq!(store.writes(), 1);
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_cached_record_published_first() {
        let store = Arc::new(MemoryRecordStore::with_record(Some(1)));
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_ok("2".to_string());

        let resource = spawn(&store, &transport);
        let mut states = resource.subscribe();

        let first = states.wait_for(|s| s.status() == Status::Success).await;
        assert_eq!(first, Some(Resource::success(Some(1), 200)));
        let fresh = states.wait_for(|s| s.data() == Some(&2)).await;
        assert!(fresh.is_some());
    }

    #[tokio::test]
    async fn test_transport_failure_publishes_sentinel() {
        let store = Arc::new(MemoryRecordStore::new());
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_error(TransportError::Timeout);

        let resource = spawn(&store, &transport);
        let mut states = resource.subscribe();

        let failed = states.wait_for(|s| s.status() == Status::Error).await.unwrap();
        assert_eq!(failed.code(), Some(800));
        assert_eq!(failed.error_ref().and_then(|e| e.code()), Some("800"));
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn test_http_failure_carries_status_and_body() {
        let store = Arc::new(MemoryRecordStore::new());
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_status(
            404,
            "Not Found",
            Some(r#"{"error":{"code":"404","message":"missing"}}"#),
        );

        let resource = spawn(&store, &transport);
        let mut states = resource.subscribe();

        let failed = states.wait_for(|s| s.status() == Status::Error).await.unwrap();
        assert_eq!(failed.code(), Some(404));
        assert_eq!(
            failed.error_ref().and_then(|e| e.body.clone()),
            Some(ErrorBody::new("404", "missing"))
        );
    }

    #[tokio::test]
    async fn test_unconvertible_payload_saves_absence() {
        let store = Arc::new(MemoryRecordStore::with_record(Some(9)));
        let mut saved = store.observe();
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_ok("not a number".to_string());

        let _resource = spawn(&store, &transport);

        saved.changed().await.unwrap();
        assert_eq!(*saved.borrow(), None);
        assert_eq!(store.writes(), 1);
    }

    #[tokio::test]
    async fn test_dropping_handle_ends_stream() {
        let store = Arc::new(MemoryRecordStore::new());
        let transport = Arc::new(ScriptedTransport::gated());
        transport.push_ok("1".to_string());

        let resource = spawn(&store, &transport);
        let mut states = resource.subscribe();
        assert_eq!(states.next().await, Some(Resource::Loading));

        drop(resource);
        assert_eq!(states.wait_for(|_| false).await, None);

        // The fetch never completed, so nothing was written.
        transport.release(1);
        tokio::task::yield_now().await;
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn test_store_failure_publishes_error() {
        struct BrokenStore(MemoryRecordStore<u32>);

        #[async_trait::async_trait]
        impl Sink<u32> for BrokenStore {
            async fn save(&self, _item: Option<u32>) -> tether_store::Result<()> {
                Err(tether_store::StoreError::Unavailable("read-only".into()))
            }
        }

        impl RecordStore<u32> for BrokenStore {
            fn observe(&self) -> tokio::sync::watch::Receiver<Option<u32>> {
                self.0.observe()
            }
        }

        let transport = Arc::new(ScriptedTransport::new());
        transport.push_ok("3".to_string());
        let resource = NetworkBoundResource::<u32>::spawn::<String>(
            Arc::new(BrokenStore(MemoryRecordStore::new())),
            transport,
            Arc::new(parse),
            Executors::default(),
        );
        let mut states = resource.subscribe();

        let failed = states.wait_for(|s| s.status() == Status::Error).await.unwrap();
        assert_eq!(failed.code(), Some(STORE_FAILURE_CODE));
    }
}
