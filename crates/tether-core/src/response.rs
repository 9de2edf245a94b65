//! Raw response envelope returned by transports.

use bytes::Bytes;

use crate::error::{StructuredError, TransportError, TRANSPORT_FAILURE_CODE};

/// A response as received from the remote source.
///
/// `body` is the decoded payload of a successful response. `error_payload`
/// holds the raw bytes of a failed one so a structured error can be
/// extracted later.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse<R> {
    pub status: u16,
    pub reason: String,
    pub body: Option<R>,
    pub error_payload: Option<Bytes>,
}

impl<R> ApiResponse<R> {
    /// A 200 response carrying `body`.
    pub fn ok(body: R) -> Self {
        Self {
            status: 200,
            reason: "OK".into(),
            body: Some(body),
            error_payload: None,
        }
    }

    /// A 2xx response with no body.
    pub fn no_content(status: u16) -> Self {
        Self {
            status,
            reason: "No Content".into(),
            body: None,
            error_payload: None,
        }
    }

    /// A failed response with an optional raw error payload.
    pub fn failed(status: u16, reason: impl Into<String>, payload: Option<Bytes>) -> Self {
        Self {
            status,
            reason: reason.into(),
            body: None,
            error_payload: payload,
        }
    }

    pub fn is_successful(&self) -> bool {
        (200..=299).contains(&self.status)
    }

    /// Structured error for this response. Only meaningful when not successful.
    pub fn structured_error(&self) -> StructuredError {
        StructuredError::http(self.status, &self.reason, self.error_payload.as_deref())
    }
}

/// Outcome of a fetch, sorted into the three branches every synchronizer
/// handles.
#[derive(Debug, Clone, PartialEq)]
pub enum Classified<R> {
    /// 2xx with a payload.
    Body { status: u16, body: R },
    /// 2xx without a payload.
    NoBody { status: u16 },
    /// Transport failure or non-2xx status.
    Failed { error: StructuredError, code: u16 },
}

impl<R> Classified<R> {
    pub fn from_result(result: Result<ApiResponse<R>, TransportError>) -> Self {
        match result {
            Err(err) => Classified::Failed {
                error: StructuredError::transport(err),
                code: TRANSPORT_FAILURE_CODE,
            },
            Ok(response) if !response.is_successful() => Classified::Failed {
                error: response.structured_error(),
                code: response.status,
            },
            Ok(ApiResponse {
                status,
                body: Some(body),
                ..
            }) => Classified::Body { status, body },
            Ok(ApiResponse { status, .. }) => Classified::NoBody { status },
        }
    }
}
