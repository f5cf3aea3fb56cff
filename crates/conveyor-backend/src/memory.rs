//! In-memory simulated backend
//!
//! Models the service's eventual consistency: a submitted create stays
//! `CREATING` for a number of describes before turning `ACTIVE`, and a
//! submitted delete stays `DELETING` before the stream disappears.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{BackendError, BackendResult};
use crate::ids::{StreamArn, StreamName};
use crate::traits::DeliveryStreamBackend;
use crate::types::{CreatedStream, StreamDescription, StreamStatus};

/// Backend call kinds, used for call counting and error injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendCall {
    Create,
    Delete,
    Describe,
}

/// How long simulated transitions take, counted in describe calls.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Describes that report `CREATING` before the stream turns `ACTIVE`.
    pub describes_until_active: u32,
    /// Describes that report `DELETING` before the stream disappears.
    pub describes_until_deleted: u32,
    /// Prefix for generated ARNs.
    pub arn_prefix: String,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            describes_until_active: 2,
            describes_until_deleted: 2,
            arn_prefix: "arn:aws:firehose:local:000000000000:deliverystream".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
struct SimulatedStream {
    arn: StreamArn,
    status: StreamStatus,
    /// Describes left before the pending transition completes.
    remaining: u32,
    configuration: Value,
}

/// In-memory backend for tests and local simulation.
#[derive(Debug)]
pub struct InMemoryBackend {
    config: SimulationConfig,
    streams: RwLock<HashMap<StreamName, SimulatedStream>>,
    injected: RwLock<HashMap<BackendCall, BackendError>>,
    last_force_delete: RwLock<Option<bool>>,
    create_calls: AtomicUsize,
    delete_calls: AtomicUsize,
    describe_calls: AtomicUsize,
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new(SimulationConfig::default())
    }
}

impl InMemoryBackend {
    /// Create an empty backend.
    #[must_use]
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            streams: RwLock::new(HashMap::new()),
            injected: RwLock::new(HashMap::new()),
            last_force_delete: RwLock::new(None),
            create_calls: AtomicUsize::new(0),
            delete_calls: AtomicUsize::new(0),
            describe_calls: AtomicUsize::new(0),
        }
    }

    /// Seed a stream in the given status with no pending transition.
    pub async fn insert_stream(&self, name: StreamName, status: impl Into<StreamStatus>) {
        let arn = self.arn_for(&name);
        self.streams.write().await.insert(
            name,
            SimulatedStream {
                arn,
                status: status.into(),
                remaining: 0,
                configuration: Value::Null,
            },
        );
    }

    /// Make the next call of kind `call` fail with `error`.
    pub async fn fail_next(&self, call: BackendCall, error: BackendError) {
        self.injected.write().await.insert(call, error);
    }

    /// Number of calls made of the given kind.
    #[must_use]
    pub fn calls(&self, call: BackendCall) -> usize {
        match call {
            BackendCall::Create => self.create_calls.load(Ordering::SeqCst),
            BackendCall::Delete => self.delete_calls.load(Ordering::SeqCst),
            BackendCall::Describe => self.describe_calls.load(Ordering::SeqCst),
        }
    }

    /// Number of mutating calls (create + delete).
    #[must_use]
    pub fn mutating_calls(&self) -> usize {
        self.calls(BackendCall::Create) + self.calls(BackendCall::Delete)
    }

    /// Current status of a stream, without counting as a describe.
    pub async fn status_of(&self, name: &StreamName) -> Option<StreamStatus> {
        self.streams
            .read()
            .await
            .get(name)
            .map(|stream| stream.status.clone())
    }

    /// `force_delete` flag of the most recent delete call.
    pub async fn last_force_delete(&self) -> Option<bool> {
        *self.last_force_delete.read().await
    }

    /// Configuration a stream was created with.
    pub async fn configuration_of(&self, name: &StreamName) -> Option<Value> {
        self.streams
            .read()
            .await
            .get(name)
            .map(|stream| stream.configuration.clone())
    }

    fn arn_for(&self, name: &StreamName) -> StreamArn {
        StreamArn::new(format!("{}/{}", self.config.arn_prefix, name))
    }

    async fn take_injected(&self, call: BackendCall) -> BackendResult<()> {
        match self.injected.write().await.remove(&call) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DeliveryStreamBackend for InMemoryBackend {
    fn display_name(&self) -> &str {
        "in-memory"
    }

    async fn create_stream(
        &self,
        name: &StreamName,
        configuration: &Value,
    ) -> BackendResult<CreatedStream> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.take_injected(BackendCall::Create).await?;

        let mut streams = self.streams.write().await;
        if streams.contains_key(name) {
            return Err(BackendError::in_use(format!(
                "delivery stream {name} already exists"
            )));
        }

        let arn = self.arn_for(name);
        let (status, remaining) = if self.config.describes_until_active == 0 {
            (StreamStatus::active(), 0)
        } else {
            (StreamStatus::creating(), self.config.describes_until_active)
        };
        streams.insert(
            name.clone(),
            SimulatedStream {
                arn: arn.clone(),
                status,
                remaining,
                configuration: configuration.clone(),
            },
        );

        debug!(stream = %name, "Simulated stream created");
        Ok(CreatedStream { arn })
    }

    async fn delete_stream(&self, name: &StreamName, force_delete: bool) -> BackendResult<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_force_delete.write().await = Some(force_delete);
        self.take_injected(BackendCall::Delete).await?;

        let mut streams = self.streams.write().await;
        if self.config.describes_until_deleted == 0 {
            return match streams.remove(name) {
                Some(_) => Ok(()),
                None => Err(BackendError::not_found(name.as_str())),
            };
        }

        let stream = streams
            .get_mut(name)
            .ok_or_else(|| BackendError::not_found(name.as_str()))?;
        stream.status = StreamStatus::deleting();
        stream.remaining = self.config.describes_until_deleted;

        debug!(stream = %name, "Simulated stream delete started");
        Ok(())
    }

    async fn describe_stream(&self, name: &StreamName) -> BackendResult<StreamDescription> {
        self.describe_calls.fetch_add(1, Ordering::SeqCst);
        self.take_injected(BackendCall::Describe).await?;

        let mut streams = self.streams.write().await;
        let Some(stream) = streams.get_mut(name) else {
            return Err(BackendError::not_found(name.as_str()));
        };

        let description = StreamDescription::new(name.clone(), stream.status.clone())
            .with_arn(stream.arn.clone());

        // Advance the pending transition after reporting the current status.
        if stream.remaining > 0 {
            stream.remaining -= 1;
            if stream.remaining == 0 {
                if stream.status.is(StreamStatus::CREATING) {
                    stream.status = StreamStatus::active();
                } else if stream.status.is(StreamStatus::DELETING) {
                    streams.remove(name);
                }
            }
        }

        Ok(description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn name() -> StreamName {
        StreamName::parse("orders").unwrap()
    }

    #[tokio::test]
    async fn test_create_then_becomes_active() {
        let backend = InMemoryBackend::default();
        let created = backend.create_stream(&name(), &json!({"a": 1})).await.unwrap();
        assert!(created.arn.as_str().ends_with("/orders"));

        let statuses: Vec<String> = {
            let mut out = Vec::new();
            for _ in 0..3 {
                let d = backend.describe_stream(&name()).await.unwrap();
                out.push(d.status.to_string());
            }
            out
        };
        assert_eq!(statuses, vec!["CREATING", "CREATING", "ACTIVE"]);
        assert_eq!(backend.calls(BackendCall::Describe), 3);
        assert_eq!(
            backend.configuration_of(&name()).await,
            Some(json!({"a": 1}))
        );
    }

    #[tokio::test]
    async fn test_duplicate_create_conflicts() {
        let backend = InMemoryBackend::default();
        backend.create_stream(&name(), &json!({})).await.unwrap();
        let err = backend.create_stream(&name(), &json!({})).await.unwrap_err();
        assert!(matches!(err, BackendError::ResourceInUse { .. }));
    }

    #[tokio::test]
    async fn test_delete_then_disappears() {
        let backend = InMemoryBackend::default();
        backend.insert_stream(name(), StreamStatus::ACTIVE).await;
        backend.delete_stream(&name(), true).await.unwrap();

        assert!(backend.describe_stream(&name()).await.unwrap().status.is("DELETING"));
        assert!(backend.describe_stream(&name()).await.unwrap().status.is("DELETING"));
        assert!(backend.describe_stream(&name()).await.unwrap_err().is_not_found());
        assert_eq!(backend.mutating_calls(), 1);
    }

    #[tokio::test]
    async fn test_immediate_transitions() {
        let backend = InMemoryBackend::new(SimulationConfig {
            describes_until_active: 0,
            describes_until_deleted: 0,
            ..SimulationConfig::default()
        });
        backend.create_stream(&name(), &json!({})).await.unwrap();
        assert!(backend.describe_stream(&name()).await.unwrap().status.is("ACTIVE"));
        backend.delete_stream(&name(), false).await.unwrap();
        assert!(backend.status_of(&name()).await.is_none());
        assert_eq!(backend.last_force_delete().await, Some(false));
    }

    #[tokio::test]
    async fn test_injected_error_is_one_shot() {
        let backend = InMemoryBackend::default();
        backend
            .fail_next(BackendCall::Describe, BackendError::network("reset"))
            .await;

        let err = backend.describe_stream(&name()).await.unwrap_err();
        assert!(matches!(err, BackendError::Network { .. }));
        assert!(backend.describe_stream(&name()).await.unwrap_err().is_not_found());
        assert_eq!(backend.calls(BackendCall::Describe), 2);
    }
}
