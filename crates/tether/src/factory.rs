//! The factory: shared pools and defaults for every synchronizer.
//!
//! A [`Tether`] owns one pair of I/O and CPU pools. Every resource it
//! constructs submits work to those pools, so a host can bound network and
//! conversion concurrency across all of its resources in one place.

use std::sync::Arc;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::debug;

use tether_core::{ExecutorConfig, PagingConfig, Payload};
use tether_store::{PageSink, PagedStore, RecordStore, Sink};
use tether_sync::{
    Convert, Executors, Fetcher, ForwardPagedResource, NetworkBoundResource, NetworkOnlyResource,
    PageFetcher, PaginatedResource, ScalarResource, WindowPagedResource,
};

use crate::error::Result;

/// Configuration for a [`Tether`].
///
/// Loadable from any serde format. Missing fields take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TetherConfig {
    /// Paging defaults for resources built without their own config.
    pub paging: PagingConfig,
    /// Pool sizing.
    pub executors: ExecutorConfig,
}

impl TetherConfig {
    pub fn with_paging(mut self, paging: PagingConfig) -> Self {
        self.paging = paging;
        self
    }

    pub fn with_executors(mut self, executors: ExecutorConfig) -> Self {
        self.executors = executors;
        self
    }
}

/// Builds synchronizers that share one set of pools.
///
/// Every constructor spawns a driver task and must be called from within a
/// Tokio runtime. Dropping the returned resource cancels it.
#[derive(Clone)]
pub struct Tether {
    paging: PagingConfig,
    executors: Executors,
}

impl Tether {
    /// Validate `config` and create the shared pools.
    pub fn new(config: TetherConfig) -> Result<Self> {
        config.paging.validate()?;
        config.executors.validate()?;
        debug!(
            io_permits = config.executors.io_permits,
            cpu_permits = config.executors.cpu_permits,
            "tether pools created"
        );
        Ok(Self {
            paging: config.paging,
            executors: Executors::new(&config.executors),
        })
    }

    /// Default paging configuration.
    pub fn paging(&self) -> &PagingConfig {
        &self.paging
    }

    /// The shared pools.
    pub fn executors(&self) -> &Executors {
        &self.executors
    }

    /// A single record reconciled with a single fetch.
    pub fn bound<T, R, S, F, C>(&self, store: Arc<S>, fetcher: Arc<F>, convert: C) -> NetworkBoundResource<T>
    where
        T: Payload,
        R: Payload,
        S: RecordStore<T> + 'static,
        F: Fetcher<R> + 'static,
        C: Convert<R, T>,
    {
        NetworkBoundResource::spawn::<R>(store, fetcher, Arc::new(convert), self.executors.clone())
    }

    /// A cache-first paginated resource using the default paging config.
    pub fn paginated<T, R, S, F, C>(&self, store: Arc<S>, fetcher: Arc<F>, convert: C) -> PaginatedResource<T, R>
    where
        T: Payload,
        R: Payload,
        S: PagedStore<T> + 'static,
        F: PageFetcher<R> + 'static,
        C: Convert<R, Vec<T>>,
    {
        PaginatedResource::spawn(
            store,
            fetcher,
            Arc::new(convert),
            self.paging.clone(),
            self.executors.clone(),
        )
    }

    /// A cache-first paginated resource with its own paging config.
    pub fn paginated_with<T, R, S, F, C>(
        &self,
        store: Arc<S>,
        fetcher: Arc<F>,
        convert: C,
        config: PagingConfig,
    ) -> Result<PaginatedResource<T, R>>
    where
        T: Payload,
        R: Payload,
        S: PagedStore<T> + 'static,
        F: PageFetcher<R> + 'static,
        C: Convert<R, Vec<T>>,
    {
        config.validate()?;
        Ok(PaginatedResource::spawn(
            store,
            fetcher,
            Arc::new(convert),
            config,
            self.executors.clone(),
        ))
    }

    /// A network-only resource walking forward from position zero.
    pub fn forward<T, R, F, C, K>(
        &self,
        fetcher: Arc<F>,
        convert: C,
        sink: Arc<K>,
        config: PagingConfig,
    ) -> Result<ForwardPagedResource<T, R>>
    where
        T: Payload,
        R: Payload,
        F: PageFetcher<R> + 'static,
        C: Convert<R, Vec<T>>,
        K: PageSink<T> + 'static,
    {
        config.validate()?;
        Ok(ForwardPagedResource::spawn(
            fetcher,
            Arc::new(convert),
            sink,
            config,
            self.executors.clone(),
        ))
    }

    /// A network-only resource paging both ways around `anchor`.
    pub fn window<T, R, F, C, K>(
        &self,
        anchor: usize,
        fetcher: Arc<F>,
        convert: C,
        sink: Arc<K>,
        config: PagingConfig,
    ) -> Result<WindowPagedResource<T, R>>
    where
        T: Payload,
        R: Payload,
        F: PageFetcher<R> + 'static,
        C: Convert<R, Vec<T>>,
        K: PageSink<T> + 'static,
    {
        config.validate()?;
        Ok(WindowPagedResource::spawn(
            anchor,
            fetcher,
            Arc::new(convert),
            sink,
            config,
            self.executors.clone(),
        ))
    }

    /// A single fetch of an unparsed body.
    pub fn scalar<F, K>(&self, fetcher: Arc<F>, sink: Arc<K>) -> ScalarResource
    where
        F: Fetcher<Bytes> + 'static,
        K: Sink<Bytes> + 'static,
    {
        ScalarResource::spawn(fetcher, sink, self.executors.clone())
    }

    /// A single typed fetch with no local read.
    pub fn network_only<T, F, K>(&self, fetcher: Arc<F>, sink: Arc<K>) -> NetworkOnlyResource<T>
    where
        T: Payload,
        F: Fetcher<T> + 'static,
        K: Sink<T> + 'static,
    {
        NetworkOnlyResource::spawn(fetcher, sink, self.executors.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TetherError;
    use tether_core::{ConfigError, PagedListConfig};

    #[test]
    fn rejects_invalid_config() {
        let config = TetherConfig::default().with_paging(PagingConfig::new().with_init_item_limit(0));
        assert!(matches!(
            Tether::new(config),
            Err(TetherError::Config(ConfigError::Zero("init_item_limit")))
        ));

        let config = TetherConfig::default().with_executors(ExecutorConfig {
            io_permits: 0,
            ..ExecutorConfig::default()
        });
        assert!(Tether::new(config).is_err());
    }

    #[test]
    fn pools_sized_from_config() {
        let config = TetherConfig::default().with_executors(ExecutorConfig {
            io_permits: 3,
            cpu_permits: 2,
            state_capacity: 8,
        });
        let tether = Tether::new(config).unwrap();

        assert_eq!(tether.executors().available_io(), 3);
        assert_eq!(tether.executors().available_cpu(), 2);
        assert_eq!(tether.executors().state_capacity(), 8);
    }

    #[test]
    fn keeps_default_paging() {
        let paging = PagingConfig::new()
            .with_max_item_limit(10)
            .with_list(PagedListConfig::new(5));
        let tether = Tether::new(TetherConfig::default().with_paging(paging.clone())).unwrap();
        assert_eq!(tether.paging(), &paging);
    }
}
