//! # Tether
//!
//! The unified API for Tether: bound resources that keep a local store in
//! step with a remote, possibly paginated, source and expose the result as
//! one deduplicated stream of states.
//!
//! ## Overview
//!
//! - **Bound resources**: a local record or list re-published on every
//!   change, refreshed by fetches that are converted and saved back
//! - **Network-only resources**: pages or bodies delivered straight from
//!   the network, optionally handed to a sink
//! - **Structured errors**: every failure becomes `{code, message}` plus a
//!   numeric code (HTTP status, `800` for transport, `900` for store)
//! - **Shared pools**: one bounded I/O pool and one bounded CPU pool per
//!   [`Tether`]
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use tether::core::PagedStatus;
//! use tether::store::MemoryPagedStore;
//! use tether::sync::transport::memory::ScriptedTransport;
//! use tether::{PaginatedResource, Tether, TetherConfig};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Row(u32);
//!
//! async fn example() -> tether::Result<()> {
//!     let tether = Tether::new(TetherConfig::default())?;
//!
//!     let store = Arc::new(MemoryPagedStore::<Row>::new());
//!     let transport = Arc::new(ScriptedTransport::<Vec<u32>>::new());
//!     transport.push_ok(vec![1, 2, 3]);
//!
//!     let rows: PaginatedResource<Row, Vec<u32>> = tether.paginated(
//!         store,
//!         transport,
//!         |raw: &Vec<u32>| Some(raw.iter().copied().map(Row).collect()),
//!     );
//!
//!     let mut states = rows.subscribe();
//!     while let Some(state) = states.next().await {
//!         if state.status() == PagedStatus::Page {
//!             // Render `state.page()`, then call `rows.load_around(index)`
//!             // as the reader scrolls.
//!             break;
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `tether::core` - States, errors, cursors, configuration
//! - `tether::store` - Store traits and in-memory stores
//! - `tether::sync` - Synchronizers, transports, publishers, pools

pub mod error;
pub mod factory;

pub use tether_core as core;
pub use tether_store as store;
pub use tether_sync as sync;

pub use error::{Result, TetherError};
pub use factory::{Tether, TetherConfig};

pub use tether_core::{
    ApiResponse, ErrorBody, PagedList, PagedResource, PagedStatus, Resource, Status,
    StructuredError, TransportError, STORE_FAILURE_CODE, TRANSPORT_FAILURE_CODE,
};
pub use tether_sync::{
    ForwardPagedResource, LoadOutcome, NetworkBoundResource, NetworkOnlyResource,
    PaginatedResource, ScalarResource, StateStream, WindowPagedResource,
};
