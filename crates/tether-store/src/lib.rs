//! # Tether Store
//!
//! The local persistence boundary. Synchronizers read and write the local
//! data set only through the traits in this crate, so any engine (SQLite,
//! an embedded KV store, a platform database) can back them.
//!
//! ## Key Types
//!
//! - [`RecordStore`] - A single observable record
//! - [`PagedStore`] - An ordered, range-readable list with change signals
//! - [`Sink`] / [`PageSink`] - Write-only hooks for network-only resources
//! - [`MemoryRecordStore`] / [`MemoryPagedStore`] - In-memory implementations
//!
//! ## Design Notes
//!
//! - **Observation through `watch`**: a store publishes changes on a
//!   `tokio::sync::watch` channel. Receivers always see the latest value and
//!   intermediate values may be coalesced.
//! - **Replace vs append**: [`PagedStore::clear_insert`] replaces the whole
//!   local set, [`PagedStore::save_call_result`] appends to it.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::{DiscardSink, MemoryPagedStore, MemoryRecordStore};
pub use traits::{PageSink, PagedStore, RecordStore, Sink};
