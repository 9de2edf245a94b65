//! # Tether Sync
//!
//! Bound-resource synchronizers: components that reconcile a local store
//! with a remote, possibly paginated, source and expose the reconciliation
//! as one deduplicated stream of states.
//!
//! ## Overview
//!
//! Every synchronizer is a handle plus a driver task. The driver owns the
//! cursor and the single-flight flag, so no two fetches for the same
//! resource ever run at once and every state mutation is serialized.
//! Network calls and conversions are submitted to two shared, bounded pools
//! ([`Executors`]).
//!
//! ## Variants
//!
//! | Type | Local read | Cursor | Stops after a failure |
//! |------|------------|--------|-----------------------|
//! | [`NetworkBoundResource`] | record | none | n/a (one fetch) |
//! | [`PaginatedResource`] | paged list | skip from zero | yes |
//! | [`ForwardPagedResource`] | none | skip from zero | no |
//! | [`WindowPagedResource`] | none | `[start, end)` window | no |
//! | [`NetworkOnlyResource`] / [`ScalarResource`] | none | none | n/a (one fetch) |
//!
//! ## Failure codes
//!
//! - A transport failure is published with code `800` and body
//!   `{code: "800", message: <description>}` in every variant.
//! - A non-2xx response is published with its HTTP status and the parsed
//!   `{"error": {"code", "message"}}` body when there is one.
//! - A failed store write is published with code `900`.
//!
//! ## Cancellation
//!
//! Dropping a handle aborts its driver and every fetch it has in flight.
//! Subscribed streams then end.

pub mod bound;
pub mod convert;
mod driver;
pub mod error;
pub mod executor;
pub mod forward;
mod network_paged;
pub mod network_only;
pub mod outcome;
pub mod paginated;
pub mod publisher;
pub mod scalar;
pub mod transport;
pub mod window;

pub use bound::NetworkBoundResource;
pub use convert::Convert;
pub use error::{Result, SyncError};
pub use executor::Executors;
pub use forward::ForwardPagedResource;
pub use network_only::NetworkOnlyResource;
pub use outcome::LoadOutcome;
pub use paginated::PaginatedResource;
pub use publisher::{StatePublisher, StateStream};
pub use scalar::ScalarResource;
pub use transport::{FetchResult, Fetcher, FnFetcher, FnPageFetcher, PageFetcher};
pub use window::WindowPagedResource;
