//! Transport abstraction for fetching remote data.
//!
//! The transport layer performs the network call and hands back an
//! [`ApiResponse`]. Implementations may use HTTP, gRPC, or anything else;
//! synchronizers only care about status, body and error payload.

use std::future::Future;

use async_trait::async_trait;
use tether_core::{ApiResponse, TransportError};

/// Result of a single network call.
pub type FetchResult<R> = std::result::Result<ApiResponse<R>, TransportError>;

/// A non-paginated fetch.
///
/// Implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait Fetcher<R: Send + 'static>: Send + Sync {
    async fn fetch(&self) -> FetchResult<R>;
}

/// A paginated fetch addressed by `(skip, limit)`.
#[async_trait]
pub trait PageFetcher<R: Send + 'static>: Send + Sync {
    /// Fetch up to `limit` items starting at absolute position `skip`.
    async fn fetch_page(&self, skip: usize, limit: usize) -> FetchResult<R>;
}

/// [`Fetcher`] backed by an async closure.
pub struct FnFetcher<F>(pub F);

#[async_trait]
impl<R, F, Fut> Fetcher<R> for FnFetcher<F>
where
    R: Send + 'static,
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = FetchResult<R>> + Send,
{
    async fn fetch(&self) -> FetchResult<R> {
        (self.0)().await
    }
}

/// [`PageFetcher`] backed by an async closure taking `(skip, limit)`.
pub struct FnPageFetcher<F>(pub F);

#[async_trait]
impl<R, F, Fut> PageFetcher<R> for FnPageFetcher<F>
where
    R: Send + 'static,
    F: Fn(usize, usize) -> Fut + Send + Sync,
    Fut: Future<Output = FetchResult<R>> + Send,
{
    async fn fetch_page(&self, skip: usize, limit: usize) -> FetchResult<R> {
        (self.0)(skip, limit).await
    }
}

/// A scripted in-memory transport for testing.
///
/// Responses are queued up front and handed out in order. Every call is
/// logged, and the transport can be gated so calls stay in flight until
/// released.
pub mod memory {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Mutex, PoisonError};

    use bytes::Bytes;
    use tokio::sync::Semaphore;

    /// A call made against a [`ScriptedTransport`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Call {
        /// A non-paginated fetch.
        Single,
        /// A page fetch with its `(skip, limit)`.
        Page { skip: usize, limit: usize },
    }

    /// In-memory transport replaying a script of responses.
    pub struct ScriptedTransport<R> {
        script: Mutex<VecDeque<FetchResult<R>>>,
        calls: Mutex<Vec<Call>>,
        gate: Option<Semaphore>,
    }

    impl<R> ScriptedTransport<R> {
        /// Create a transport whose calls complete immediately.
        pub fn new() -> Self {
            Self {
                script: Mutex::new(VecDeque::new()),
                calls: Mutex::new(Vec::new()),
                gate: None,
            }
        }

        /// Create a transport whose calls wait for [`release`](Self::release).
        pub fn gated() -> Self {
            Self {
                gate: Some(Semaphore::new(0)),
                ..Self::new()
            }
        }

        /// Let `n` waiting (or future) calls complete.
        pub fn release(&self, n: usize) {
            if let Some(gate) = &self.gate {
                gate.add_permits(n);
            }
        }

        /// Queue a raw result.
        pub fn push(&self, result: FetchResult<R>) -> &Self {
            self.script
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push_back(result);
            self
        }

        /// Queue a 200 response carrying `body`.
        pub fn push_ok(&self, body: R) -> &Self {
            self.push(Ok(ApiResponse::ok(body)))
        }

        /// Queue a 204 response.
        pub fn push_no_content(&self) -> &Self {
            self.push(Ok(ApiResponse::no_content(204)))
        }

        /// Queue a non-2xx response with an optional raw error payload.
        pub fn push_status(&self, status: u16, reason: &str, payload: Option<&'static str>) -> &Self {
            let payload = payload.map(|p| Bytes::from_static(p.as_bytes()));
            self.push(Ok(ApiResponse::failed(status, reason, payload)))
        }

        /// Queue a transport failure.
        pub fn push_error(&self, err: TransportError) -> &Self {
            self.push(Err(err))
        }

        /// Every call made so far, in order.
        pub fn calls(&self) -> Vec<Call> {
            self.calls
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
        }

        /// The `(skip, limit)` of every page call so far.
        pub fn page_calls(&self) -> Vec<(usize, usize)> {
            self.calls()
                .into_iter()
                .filter_map(|call| match call {
                    Call::Page { skip, limit } => Some((skip, limit)),
                    Call::Single => None,
                })
                .collect()
        }

        async fn answer(&self, call: Call) -> FetchResult<R> {
            self.calls
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(call);

            if let Some(gate) = &self.gate {
                if let Ok(permit) = gate.acquire().await {
                    permit.forget();
                }
            }

            self.script
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front()
                .unwrap_or_else(|| Err(TransportError::Other("no scripted response".into())))
        }
    }

    impl<R> Default for ScriptedTransport<R> {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl<R: Send + 'static> Fetcher<R> for ScriptedTransport<R> {
        async fn fetch(&self) -> FetchResult<R> {
            self.answer(Call::Single).await
        }
    }

    #[async_trait]
    impl<R: Send + 'static> PageFetcher<R> for ScriptedTransport<R> {
        async fn fetch_page(&self, skip: usize, limit: usize) -> FetchResult<R> {
            self.answer(Call::Page { skip, limit }).await
        }
    }
}
