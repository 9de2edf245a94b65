//! Test fixtures and helpers.
//!
//! Common setup code for integration tests: a small record type, the page
//! shape a server would send for it, and a fixture that wires a scripted
//! transport to an in-memory store.

use std::ops::Range;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use tether_store::MemoryPagedStore;
use tether_sync::transport::memory::ScriptedTransport;

/// A record as kept in the local store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: u32,
    pub title: String,
}

/// A page as sent by the server.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ItemPage {
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
}

impl ItemPage {
    /// Parse a page from its JSON wire form.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// The item with the given id.
pub fn item(id: u32) -> Item {
    Item {
        id,
        title: format!("item {id}"),
    }
}

/// Items for every id in `ids`.
pub fn items(ids: Range<u32>) -> Vec<Item> {
    ids.map(item).collect()
}

/// A page holding the items for `ids`.
pub fn page(ids: Range<u32>) -> ItemPage {
    ItemPage {
        items: items(ids),
        total: None,
    }
}

/// Page-to-records conversion. A page without items converts to nothing.
pub fn convert_page(raw: &ItemPage) -> Option<Vec<Item>> {
    if raw.items.is_empty() {
        None
    } else {
        Some(raw.items.clone())
    }
}

/// A scripted transport and an in-memory store for paginated tests.
pub struct PagedFixture {
    pub transport: Arc<ScriptedTransport<ItemPage>>,
    pub store: Arc<MemoryPagedStore<Item>>,
}

impl PagedFixture {
    /// Create a fixture whose calls complete immediately.
    pub fn new() -> Self {
        Self {
            transport: Arc::new(ScriptedTransport::new()),
            store: Arc::new(MemoryPagedStore::new()),
        }
    }

    /// Create a fixture whose calls wait until released.
    pub fn gated() -> Self {
        Self {
            transport: Arc::new(ScriptedTransport::gated()),
            ..Self::new()
        }
    }

    /// Seed the store with `ids` as if an earlier session had cached them.
    pub fn with_cached(self, ids: Range<u32>) -> Self {
        Self {
            store: Arc::new(MemoryPagedStore::with_items(items(ids))),
            ..self
        }
    }

    /// Ids currently held by the store, in order.
    pub fn stored_ids(&self) -> Vec<u32> {
        self.store.snapshot().iter().map(|item| item.id).collect()
    }
}

impl Default for PagedFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_json_shape() {
        let parsed = ItemPage::from_json(r#"{"items":[{"id":1,"title":"item 1"}],"total":10}"#).unwrap();
        assert_eq!(parsed.items, vec![item(1)]);
        assert_eq!(parsed.total, Some(10));

        let empty = ItemPage::from_json("{}").unwrap();
        assert!(empty.items.is_empty());
        assert_eq!(convert_page(&empty), None);
    }

    #[test]
    fn fixture_seeds_store() {
        let fixture = PagedFixture::new().with_cached(3..6);
        assert_eq!(fixture.stored_ids(), vec![3, 4, 5]);
    }
}
