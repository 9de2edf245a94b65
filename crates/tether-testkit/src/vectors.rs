//! Golden vectors for structured error extraction.
//!
//! Each vector is a failed response as a server might send it, together
//! with the `{code, message}` body a synchronizer must publish for it.

use tether_core::{ErrorBody, StructuredError};

/// A failed response and the body expected from it.
#[derive(Debug, Clone)]
pub struct ErrorVector {
    /// Short description.
    pub name: &'static str,
    pub status: u16,
    pub reason: &'static str,
    /// Raw error payload, if the server sent one.
    pub payload: Option<&'static str>,
    pub expected_code: &'static str,
    pub expected_message: &'static str,
}

impl ErrorVector {
    pub fn expected(&self) -> ErrorBody {
        ErrorBody::new(self.expected_code, self.expected_message)
    }

    /// The error as built from this vector.
    pub fn extract(&self) -> StructuredError {
        StructuredError::http(self.status, self.reason, self.payload.map(str::as_bytes))
    }
}

/// Every golden vector.
pub fn all_vectors() -> Vec<ErrorVector> {
    vec![
        ErrorVector {
            name: "well-formed envelope",
            status: 404,
            reason: "Not Found",
            payload: Some(r#"{"error":{"code":"404","message":"missing"}}"#),
            expected_code: "404",
            expected_message: "missing",
        },
        ErrorVector {
            name: "application code differs from status",
            status: 429,
            reason: "Too Many Requests",
            payload: Some(r#"{"error":{"code":"RATE_LIMITED","message":"slow down"}}"#),
            expected_code: "RATE_LIMITED",
            expected_message: "slow down",
        },
        ErrorVector {
            name: "envelope with surrounding whitespace",
            status: 400,
            reason: "Bad Request",
            payload: Some("\n  {\"error\":{\"code\":\"E1\",\"message\":\"bad field\"}}  \n"),
            expected_code: "E1",
            expected_message: "bad field",
        },
        ErrorVector {
            name: "extra fields ignored",
            status: 409,
            reason: "Conflict",
            payload: Some(r#"{"error":{"code":"E2","message":"taken","field":"name"},"trace":"x"}"#),
            expected_code: "E2",
            expected_message: "taken",
        },
        ErrorVector {
            name: "no payload",
            status: 500,
            reason: "Internal Server Error",
            payload: None,
            expected_code: "500",
            expected_message: "Internal Server Error",
        },
        ErrorVector {
            name: "blank payload",
            status: 502,
            reason: "Bad Gateway",
            payload: Some("   \n"),
            expected_code: "502",
            expected_message: "Bad Gateway",
        },
        ErrorVector {
            name: "html payload",
            status: 503,
            reason: "Service Unavailable",
            payload: Some("<html><body>down</body></html>"),
            expected_code: "503",
            expected_message: "Service Unavailable",
        },
        ErrorVector {
            name: "json without envelope",
            status: 422,
            reason: "Unprocessable Entity",
            payload: Some(r#"{"message":"nope"}"#),
            expected_code: "422",
            expected_message: "Unprocessable Entity",
        },
        ErrorVector {
            name: "envelope missing message",
            status: 401,
            reason: "Unauthorized",
            payload: Some(r#"{"error":{"code":"AUTH"}}"#),
            expected_code: "401",
            expected_message: "Unauthorized",
        },
    ]
}
