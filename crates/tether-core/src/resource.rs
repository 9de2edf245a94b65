//! Lifecycle state of a single-record resource.

use crate::error::StructuredError;

/// Discriminant of a [`Resource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Loading,
    Success,
    Error,
    Empty,
}

/// State published by non-paginated synchronizers.
///
/// Data is only ever carried by `Success` and an error only by `Error`;
/// the enum makes any other combination unrepresentable.
#[derive(Debug, Clone, PartialEq)]
pub enum Resource<T> {
    /// A fetch is underway and nothing has been published yet.
    Loading,
    /// The latest value, from the local store or the network.
    ///
    /// `data` may be `None` when the store holds no record.
    Success { data: Option<T>, code: u16 },
    /// The fetch failed.
    Error { error: StructuredError, code: u16 },
    /// There is nothing to show.
    Empty,
}

impl<T> Resource<T> {
    pub fn loading() -> Self {
        Resource::Loading
    }

    pub fn success(data: Option<T>, code: u16) -> Self {
        Resource::Success { data, code }
    }

    pub fn error(error: StructuredError, code: u16) -> Self {
        Resource::Error { error, code }
    }

    pub fn empty() -> Self {
        Resource::Empty
    }

    pub fn status(&self) -> Status {
        match self {
            Resource::Loading => Status::Loading,
            Resource::Success { .. } => Status::Success,
            Resource::Error { .. } => Status::Error,
            Resource::Empty => Status::Empty,
        }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Resource::Success { data, .. } => data.as_ref(),
            _ => None,
        }
    }

    pub fn error_ref(&self) -> Option<&StructuredError> {
        match self {
            Resource::Error { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Status code of the state, if it carries one.
    pub fn code(&self) -> Option<u16> {
        match self {
            Resource::Success { code, .. } | Resource::Error { code, .. } => Some(*code),
            Resource::Loading | Resource::Empty => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Resource::Loading)
    }
}
