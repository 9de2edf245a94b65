//! Lifecycle state of a paginated resource.

use std::sync::Arc;

use crate::error::StructuredError;

/// Snapshot of the items a consumer can currently see.
///
/// `offset` is the absolute position of the first item; it is zero for
/// lists anchored at the origin and equals the anchor for windowed lists.
/// Items are shared so snapshots are cheap to clone into every subscriber.
#[derive(Debug, Clone, PartialEq)]
pub struct PagedList<T> {
    items: Arc<[T]>,
    offset: usize,
}

impl<T> PagedList<T> {
    pub fn new(items: Vec<T>, offset: usize) -> Self {
        Self {
            items: items.into(),
            offset,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), 0)
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Item at an absolute position, if loaded.
    pub fn get(&self, position: usize) -> Option<&T> {
        position
            .checked_sub(self.offset)
            .and_then(|index| self.items.get(index))
    }

    /// One past the absolute position of the last loaded item.
    pub fn end(&self) -> usize {
        self.offset + self.items.len()
    }
}

impl<T> Default for PagedList<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Discriminant of a [`PagedResource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PagedStatus {
    Loading,
    Page,
    Complete,
    Empty,
    End,
    Error,
}

/// State published by paginated synchronizers.
///
/// `T` is the record type, `R` the raw network response.
#[derive(Debug, Clone, PartialEq)]
pub enum PagedResource<T, R> {
    /// Nothing is visible yet.
    Loading,
    /// The latest materialized page snapshot.
    Page(PagedList<T>),
    /// A network round trip finished. `None` when it failed.
    Complete(Option<R>),
    /// The very first fetch (cursor at origin) returned zero items.
    Empty,
    /// A later fetch returned zero items; pagination is exhausted.
    End,
    /// A fetch failed.
    Error { error: StructuredError, code: u16 },
}

impl<T, R> PagedResource<T, R> {
    pub fn error(error: StructuredError, code: u16) -> Self {
        PagedResource::Error { error, code }
    }

    pub fn status(&self) -> PagedStatus {
        match self {
            PagedResource::Loading => PagedStatus::Loading,
            PagedResource::Page(_) => PagedStatus::Page,
            PagedResource::Complete(_) => PagedStatus::Complete,
            PagedResource::Empty => PagedStatus::Empty,
            PagedResource::End => PagedStatus::End,
            PagedResource::Error { .. } => PagedStatus::Error,
        }
    }

    pub fn page(&self) -> Option<&PagedList<T>> {
        match self {
            PagedResource::Page(list) => Some(list),
            _ => None,
        }
    }

    pub fn raw_response(&self) -> Option<&R> {
        match self {
            PagedResource::Complete(raw) => raw.as_ref(),
            _ => None,
        }
    }

    pub fn error_ref(&self) -> Option<&StructuredError> {
        match self {
            PagedResource::Error { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn code(&self) -> Option<u16> {
        match self {
            PagedResource::Error { code, .. } => Some(*code),
            _ => None,
        }
    }
}
