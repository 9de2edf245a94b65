//! Configuration for synchronizers and the pools they run on.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default page size for the very first fetch.
pub const DEFAULT_INIT_ITEM_LIMIT: usize = 50;

/// Default page size of the local paged view.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Invalid configuration values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// How the forward-cursor network-only variant advances after `load_after`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CursorAdvance {
    /// Advance by the requested page size when the fetch is issued.
    ///
    /// A short page from the server leaves the cursor ahead of the items
    /// actually delivered.
    #[default]
    Requested,
    /// Advance by the number of items delivered once the fetch completes.
    Delivered,
}

/// Tuning of the consumer-facing paged view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PagedListConfig {
    /// Items added to the view each time the consumer nears its end.
    pub page_size: usize,
    /// How close to the end of the view a read must be to load more.
    pub prefetch_distance: usize,
    /// Size of the first load.
    pub initial_load_size_hint: usize,
}

impl PagedListConfig {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size,
            prefetch_distance: page_size,
            initial_load_size_hint: page_size * 3,
        }
    }

    pub fn with_prefetch_distance(mut self, distance: usize) -> Self {
        self.prefetch_distance = distance;
        self
    }

    pub fn with_initial_load_size_hint(mut self, hint: usize) -> Self {
        self.initial_load_size_hint = hint;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::Zero("page_size"));
        }
        if self.initial_load_size_hint == 0 {
            return Err(ConfigError::Zero("initial_load_size_hint"));
        }
        Ok(())
    }
}

impl Default for PagedListConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

/// Paging behaviour shared by the paginated synchronizers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PagingConfig {
    /// Hard cap on the total number of items ever fetched. `None` is unbounded.
    pub max_item_limit: Option<usize>,
    /// Page size for network fetches when no cap is set.
    pub init_item_limit: usize,
    /// Local paged view tuning.
    pub list: PagedListConfig,
    /// Cursor policy of the forward-cursor network-only variant.
    pub cursor_advance: CursorAdvance,
}

impl PagingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_item_limit(mut self, max: usize) -> Self {
        self.max_item_limit = Some(max);
        self
    }

    pub fn with_init_item_limit(mut self, limit: usize) -> Self {
        self.init_item_limit = limit;
        self
    }

    pub fn with_list(mut self, list: PagedListConfig) -> Self {
        self.list = list;
        self
    }

    pub fn with_cursor_advance(mut self, advance: CursorAdvance) -> Self {
        self.cursor_advance = advance;
        self
    }

    /// Limit of a cache-first fetch: the cap if one is set, otherwise the
    /// initial item limit.
    pub fn fetch_limit(&self) -> usize {
        self.max_item_limit.unwrap_or(self.init_item_limit)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.init_item_limit == 0 {
            return Err(ConfigError::Zero("init_item_limit"));
        }
        if self.max_item_limit == Some(0) {
            return Err(ConfigError::Zero("max_item_limit"));
        }
        self.list.validate()
    }
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            max_item_limit: None,
            init_item_limit: DEFAULT_INIT_ITEM_LIMIT,
            list: PagedListConfig::default(),
            cursor_advance: CursorAdvance::default(),
        }
    }
}

/// Sizing of the I/O and CPU pools and of each state stream buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Concurrent network fetches across all synchronizers.
    pub io_permits: usize,
    /// Concurrent payload conversions across all synchronizers.
    pub cpu_permits: usize,
    /// Buffered states per subscriber before it starts lagging.
    pub state_capacity: usize,
}

impl ExecutorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.io_permits == 0 {
            return Err(ConfigError::Zero("io_permits"));
        }
        if self.cpu_permits == 0 {
            return Err(ConfigError::Zero("cpu_permits"));
        }
        if self.state_capacity == 0 {
            return Err(ConfigError::Zero("state_capacity"));
        }
        Ok(())
    }
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            io_permits: 8,
            cpu_permits: std::thread::available_parallelism().map_or(4, |n| n.get()),
            state_capacity: 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = PagingConfig::default();
        assert_eq!(config.init_item_limit, 50);
        assert_eq!(config.max_item_limit, None);
        assert_eq!(config.fetch_limit(), 50);
        assert_eq!(config.cursor_advance, CursorAdvance::Requested);
        assert_eq!(config.list.prefetch_distance, config.list.page_size);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn cap_overrides_fetch_limit() {
        let config = PagingConfig::new().with_max_item_limit(10).with_init_item_limit(2);
        assert_eq!(config.fetch_limit(), 10);
    }

    #[test]
    fn rejects_zero_sizes() {
        assert_eq!(
            PagingConfig::new().with_init_item_limit(0).validate(),
            Err(ConfigError::Zero("init_item_limit"))
        );
        assert_eq!(
            PagingConfig::new().with_max_item_limit(0).validate(),
            Err(ConfigError::Zero("max_item_limit"))
        );
        assert_eq!(
            PagingConfig::new().with_list(PagedListConfig::new(0)).validate(),
            Err(ConfigError::Zero("page_size"))
        );

        let executors = ExecutorConfig {
            io_permits: 0,
            ..ExecutorConfig::default()
        };
        assert_eq!(executors.validate(), Err(ConfigError::Zero("io_permits")));
    }

    #[test]
    fn deserializes_partial_config() {
        let config: PagingConfig =
            serde_json::from_str(r#"{"max_item_limit": 100, "cursor_advance": "delivered"}"#).unwrap();
        assert_eq!(config.max_item_limit, Some(100));
        assert_eq!(config.init_item_limit, 50);
        assert_eq!(config.cursor_advance, CursorAdvance::Delivered);
    }
}
