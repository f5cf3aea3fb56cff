//! Backend client trait
//!
//! The seam between the reconciliation engine and the delivery-stream service.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::BackendResult;
use crate::ids::StreamName;
use crate::types::{CreatedStream, StreamDescription};

/// Point-in-time operations against the delivery-stream service.
///
/// Implementations hold no chain state: every call is independent, and the
/// engine may be handed a freshly constructed client on each invocation.
#[async_trait]
pub trait DeliveryStreamBackend: Send + Sync {
    /// Get the display name for this backend instance.
    fn display_name(&self) -> &str;

    /// Submit a create for `name`.
    ///
    /// `configuration` is the already-translated request body for the
    /// service. It is passed through without inspection.
    ///
    /// # Returns
    /// The identity the service assigned to the new stream.
    async fn create_stream(
        &self,
        name: &StreamName,
        configuration: &Value,
    ) -> BackendResult<CreatedStream>;

    /// Submit a delete for `name`.
    ///
    /// With `force_delete`, the service discards data still pending delivery
    /// instead of refusing the delete.
    async fn delete_stream(&self, name: &StreamName, force_delete: bool) -> BackendResult<()>;

    /// Read the current status of `name`.
    ///
    /// Fails with [`BackendError::ResourceNotFound`](crate::error::BackendError::ResourceNotFound)
    /// when the stream does not exist.
    async fn describe_stream(&self, name: &StreamName) -> BackendResult<StreamDescription>;
}

#[async_trait]
impl<T: DeliveryStreamBackend + ?Sized> DeliveryStreamBackend for std::sync::Arc<T> {
    fn display_name(&self) -> &str {
        (**self).display_name()
    }

    async fn create_stream(
        &self,
        name: &StreamName,
        configuration: &Value,
    ) -> BackendResult<CreatedStream> {
        (**self).create_stream(name, configuration).await
    }

    async fn delete_stream(&self, name: &StreamName, force_delete: bool) -> BackendResult<()> {
        (**self).delete_stream(name, force_delete).await
    }

    async fn describe_stream(&self, name: &StreamName) -> BackendResult<StreamDescription> {
        (**self).describe_stream(name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BackendError;
    use crate::ids::StreamArn;
    use crate::types::StreamStatus;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    // Mock backend for testing
    struct MockBackend {
        describe_calls: AtomicUsize,
    }

    #[async_trait]
    impl DeliveryStreamBackend for MockBackend {
        fn display_name(&self) -> &str {
            "mock"
        }

        async fn create_stream(
            &self,
            name: &StreamName,
            _configuration: &Value,
        ) -> BackendResult<CreatedStream> {
            Ok(CreatedStream {
                arn: StreamArn::new(format!("arn:test:{name}")),
            })
        }

        async fn delete_stream(&self, name: &StreamName, _force: bool) -> BackendResult<()> {
            Err(BackendError::not_found(name.as_str()))
        }

        async fn describe_stream(&self, name: &StreamName) -> BackendResult<StreamDescription> {
            self.describe_calls.fetch_add(1, Ordering::SeqCst);
            Ok(StreamDescription::new(name.clone(), StreamStatus::ACTIVE))
        }
    }

    #[tokio::test]
    async fn test_arc_delegates() {
        let backend = Arc::new(MockBackend {
            describe_calls: AtomicUsize::new(0),
        });
        let name = StreamName::parse("orders").unwrap();

        let shared: Arc<MockBackend> = Arc::clone(&backend);
        assert_eq!(shared.display_name(), "mock");
        let description = shared.describe_stream(&name).await.unwrap();
        assert!(description.status.is(StreamStatus::ACTIVE));
        assert_eq!(backend.describe_calls.load(Ordering::SeqCst), 1);

        let created = shared
            .create_stream(&name, &serde_json::json!({}))
            .await
            .unwrap();
        assert_eq!(created.arn.as_str(), "arn:test:orders");
        assert!(shared.delete_stream(&name, true).await.unwrap_err().is_not_found());
    }
}
