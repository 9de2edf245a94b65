//! Scalar resource: a network-only fetch of an opaque body.
//!
//! The payload is never parsed. It is passed through to the sink as raw
//! bytes and published as is.

use bytes::Bytes;

use crate::network_only::NetworkOnlyResource;

/// Network-only resource over an unstructured body.
pub type ScalarResource = NetworkOnlyResource<Bytes>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use tether_core::{ErrorBody, Resource, Status};
    use tether_store::MemoryRecordStore;

    use crate::executor::Executors;
    use crate::transport::memory::ScriptedTransport;

    #[tokio::test]
    async fn test_body_passed_through() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_ok(Bytes::from_static(b"\x00\x01raw"));
        let sink = Arc::new(MemoryRecordStore::<Bytes>::new());

        let resource = ScalarResource::spawn(transport, sink.clone(), Executors::default());
        let mut states = resource.subscribe();

        let done = states.wait_for(|s| !s.is_loading()).await.unwrap();
        assert_eq!(done, Resource::success(Some(Bytes::from_static(b"\x00\x01raw")), 200));
        assert_eq!(sink.get(), Some(Bytes::from_static(b"\x00\x01raw")));
    }

    #[tokio::test]
    async fn test_failure_uses_canonical_sentinel() {
        let transport = Arc::new(ScriptedTransport::<Bytes>::new());
        transport.push_error(tether_core::TransportError::Timeout);

        let sink = Arc::new(MemoryRecordStore::<Bytes>::new());
        let resource = ScalarResource::spawn(transport, sink, Executors::default());
        let mut states = resource.subscribe();

        let failed = states.wait_for(|s| s.status() == Status::Error).await.unwrap();
        assert_eq!(failed.code(), Some(800));
    }

    #[tokio::test]
    async fn test_http_error_body_parsed() {
        let transport = Arc::new(ScriptedTransport::<Bytes>::new());
        transport.push_status(
            403,
            "Forbidden",
            Some(r#"{"error":{"code":"E_AUTH","message":"token expired"}}"#),
        );

        let sink = Arc::new(MemoryRecordStore::<Bytes>::new());
        let resource = ScalarResource::spawn(transport, sink, Executors::default());
        let mut states = resource.subscribe();

        let failed = states.wait_for(|s| s.status() == Status::Error).await.unwrap();
        assert_eq!(failed.code(), Some(403));
        assert_eq!(
            failed.error_ref().and_then(|e| e.body.clone()),
            Some(ErrorBody::new("E_AUTH", "token expired"))
        );
    }
}
