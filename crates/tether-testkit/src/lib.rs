//! # Tether Testkit
//!
//! Testing utilities for Tether.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: an [`Item`] record, its wire page [`ItemPage`], and a
//!   [`PagedFixture`] wiring a scripted transport to an in-memory store
//! - **Generators**: Proptest strategies for property-based testing
//! - **Golden vectors**: error payloads with the structured body each one
//!   must produce
//!
//! ## Test Fixtures
//!
//! ```rust
//! use tether_testkit::fixtures::{page, PagedFixture};
//!
//! let fixture = PagedFixture::new();
//! fixture.transport.push_ok(page(0..2));
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use tether_testkit::generators::item_page;
//!
//! proptest! {
//!     #[test]
//!     fn pages_round_trip_through_json(page in item_page(20)) {
//!         let json = serde_json::to_string(&page).unwrap();
//!         prop_assert_eq!(tether_testkit::ItemPage::from_json(&json).unwrap(), page);
//!     }
//! }
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{convert_page, item, items, page, Item, ItemPage, PagedFixture};
pub use tether_sync::transport::memory::{Call, ScriptedTransport};

/// Install a `tracing` subscriber that writes through the test harness.
///
/// Safe to call from every test; only the first call installs anything.
/// Filtering follows `RUST_LOG` and defaults to `debug` for Tether crates.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("tether_sync=debug,tether_store=debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
