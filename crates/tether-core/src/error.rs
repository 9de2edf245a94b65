//! Structured error model.
//!
//! Every failure a synchronizer observes is normalized into a
//! [`StructuredError`]: the underlying cause plus an optional
//! machine-readable [`ErrorBody`] extracted from the failed response.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Status code attached to successful local-store emissions.
pub const HTTP_OK: u16 = 200;

/// Sentinel code for failures where no HTTP response was received.
pub const TRANSPORT_FAILURE_CODE: u16 = 800;

/// Sentinel code for failures while persisting a fetched page.
pub const STORE_FAILURE_CODE: u16 = 900;

/// Failure raised by a transport before any response was received.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request did not complete in time.
    #[error("request timed out")]
    Timeout,

    /// The remote host could not be reached.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Any other transport-level failure.
    #[error("{0}")]
    Other(String),
}

/// The machine-readable part of an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ErrorBody {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Wire shape of an error payload: `{"error": {"code": ..., "message": ...}}`.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

/// What actually went wrong.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureCause {
    /// The call never reached the network or never came back.
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),

    /// A response arrived with a status outside `200..=299`.
    #[error("http {status}: {message}")]
    Http { status: u16, message: String },

    /// A fetched page could not be written to the local store.
    #[error("store failure: {0}")]
    Store(String),

    /// Payload conversion did not complete.
    #[error("conversion failure: {0}")]
    Conversion(String),
}

/// A normalized error: cause plus an optional structured body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{cause}")]
pub struct StructuredError {
    #[source]
    pub cause: FailureCause,
    pub body: Option<ErrorBody>,
}

impl StructuredError {
    pub fn new(cause: FailureCause, body: Option<ErrorBody>) -> Self {
        Self { cause, body }
    }

    /// Error for a call that never produced a response.
    ///
    /// The body is always the transport sentinel so consumers can tell it
    /// apart from HTTP-level failures.
    pub fn transport(err: TransportError) -> Self {
        let body = ErrorBody::new(TRANSPORT_FAILURE_CODE.to_string(), err.to_string());
        Self {
            cause: FailureCause::Transport(err),
            body: Some(body),
        }
    }

    /// Error for a non-2xx response.
    ///
    /// Tries to parse `payload` as `{"error": {"code", "message"}}`. A blank
    /// or malformed payload falls back to `{code: status, message: reason}`.
    pub fn http(status: u16, reason: &str, payload: Option<&[u8]>) -> Self {
        let text = payload
            .map(String::from_utf8_lossy)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        let body = text
            .as_deref()
            .and_then(|t| serde_json::from_str::<ErrorEnvelope>(t).ok())
            .map(|envelope| envelope.error)
            .unwrap_or_else(|| ErrorBody::new(status.to_string(), reason));

        Self {
            cause: FailureCause::Http {
                status,
                message: text.unwrap_or_else(|| reason.to_string()),
            },
            body: Some(body),
        }
    }

    pub fn store(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            body: Some(ErrorBody::new(STORE_FAILURE_CODE.to_string(), message.clone())),
            cause: FailureCause::Store(message),
        }
    }

    pub fn conversion(message: impl Into<String>) -> Self {
        Self {
            cause: FailureCause::Conversion(message.into()),
            body: None,
        }
    }

    /// The body code, if a body is present.
    pub fn code(&self) -> Option<&str> {
        self.body.as_ref().map(|b| b.code.as_str())
    }

    /// The body message, if a body is present.
    pub fn message(&self) -> Option<&str> {
        self.body.as_ref().map(|b| b.message.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_structured_body() {
        let payload = br#"{"error":{"code":"404","message":"missing"}}"#;
        let err = StructuredError::http(404, "Not Found", Some(payload));

        assert_eq!(err.body, Some(ErrorBody::new("404", "missing")));
        assert!(matches!(err.cause, FailureCause::Http { status: 404, .. }));
    }

    #[test]
    fn blank_payload_falls_back_to_status() {
        let err = StructuredError::http(503, "Service Unavailable", Some(b"   "));
        assert_eq!(err.body, Some(ErrorBody::new("503", "Service Unavailable")));

        let err = StructuredError::http(500, "Internal Server Error", None);
        assert_eq!(err.code(), Some("500"));
        assert_eq!(err.message(), Some("Internal Server Error"));
    }

    #[test]
    fn malformed_payload_falls_back_to_status() {
        let err = StructuredError::http(400, "Bad Request", Some(b"<html>oops</html>"));
        assert_eq!(err.body, Some(ErrorBody::new("400", "Bad Request")));

        // The raw text still ends up in the cause.
        match err.cause {
            FailureCause::Http { message, .. } => assert_eq!(message, "<html>oops</html>"),
            other => panic!("unexpected cause: {other:?}"),
        }
    }

    #[test]
    fn wrong_shape_falls_back_to_status() {
        let err = StructuredError::http(422, "Unprocessable Entity", Some(br#"{"code":"x"}"#));
        assert_eq!(err.body, Some(ErrorBody::new("422", "Unprocessable Entity")));
    }

    #[test]
    fn transport_uses_sentinel_body() {
        let err = StructuredError::transport(TransportError::Timeout);
        assert_eq!(err.code(), Some("800"));
        assert_eq!(err.message(), Some("request timed out"));
        assert_eq!(err.to_string(), "transport failure: request timed out");
    }

    #[test]
    fn store_uses_sentinel_body() {
        let err = StructuredError::store("disk full");
        assert_eq!(err.code(), Some("900"));
        assert!(matches!(err.cause, FailureCause::Store(_)));
    }
}
