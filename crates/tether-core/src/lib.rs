//! # Tether Core
//!
//! Pure primitives for Tether: the state types a bound resource publishes,
//! the structured error model, cursor bookkeeping, and configuration.
//!
//! This crate contains no I/O, no storage, no networking. Everything here is
//! plain data and the arithmetic around it.
//!
//! ## Key Types
//!
//! - [`Resource`] - Lifecycle state of a single-record resource
//! - [`PagedResource`] - Lifecycle state of a paginated resource
//! - [`PagedList`] - Snapshot of the items currently visible to a consumer
//! - [`StructuredError`] - Normalized `{code, message}` failure with its cause
//! - [`ApiResponse`] - Raw response envelope handed back by a transport
//! - [`SkipCursor`] / [`WindowCursor`] - Offset bookkeeping for page fetches

pub mod config;
pub mod cursor;
pub mod error;
pub mod paged;
pub mod resource;
pub mod response;

pub use config::{ConfigError, CursorAdvance, ExecutorConfig, PagedListConfig, PagingConfig};
pub use cursor::{SkipCursor, WindowCursor};
pub use error::{
    ErrorBody, FailureCause, StructuredError, TransportError, HTTP_OK, STORE_FAILURE_CODE,
    TRANSPORT_FAILURE_CODE,
};
pub use paged::{PagedList, PagedResource, PagedStatus};
pub use resource::{Resource, Status};
pub use response::{ApiResponse, Classified};

/// Bound shared by every payload that flows through a synchronizer.
///
/// States are compared before publication, cloned into every subscriber,
/// and moved across tasks.
pub trait Payload: Clone + PartialEq + std::fmt::Debug + Send + Sync + 'static {}

impl<T> Payload for T where T: Clone + PartialEq + std::fmt::Debug + Send + Sync + 'static {}
