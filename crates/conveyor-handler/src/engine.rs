//! Reconciliation engine
//!
//! Drives one Create or Delete chain a single invocation at a time. The
//! engine keeps nothing between invocations: it reads the operation and the
//! continuation token, performs a bounded number of backend calls, and
//! returns either a terminal outcome or the token for the next invocation.

use tracing::{debug, info, instrument, warn};

use conveyor_backend::error::BackendError;
use conveyor_backend::ids::StreamName;
use conveyor_backend::traits::DeliveryStreamBackend;

use crate::classifier::{classify, ErrorKind};
use crate::config::EngineConfig;
use crate::model::{NamingInputs, Operation, ReconciliationResult, ResourceModel};
use crate::naming::resolve_name;
use crate::token::ContinuationToken;

/// Message carried by the create existence guard.
pub const ALREADY_EXISTS_MESSAGE: &str = "resource already exists";

/// Message carried when the retry budget runs out.
pub const TIMED_OUT_MESSAGE: &str = "stabilization timed out";

/// Stateless reconciliation engine.
///
/// One engine can serve any number of chains concurrently; the backend is
/// supplied on every call.
#[derive(Debug, Clone, Default)]
pub struct ReconciliationEngine {
    config: EngineConfig,
}

impl ReconciliationEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// The stabilization policy in use.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Perform one invocation of a chain.
    ///
    /// `token` is `None` on the first invocation and the token from the
    /// previous [`ReconciliationResult::InProgress`] afterwards. For Create
    /// chains, `operation` should carry the resource model echoed by that
    /// result (see [`Operation::with_resource`]).
    #[instrument(
        skip_all,
        fields(
            operation = operation.kind(),
            backend = backend.display_name(),
            retries_remaining = token.map(|t| t.retries_remaining),
        )
    )]
    pub async fn reconcile<B>(
        &self,
        backend: &B,
        operation: &Operation,
        token: Option<&ContinuationToken>,
    ) -> ReconciliationResult
    where
        B: DeliveryStreamBackend + ?Sized,
    {
        if let Some(token) = token {
            if token.is_exhausted() {
                info!(
                    last_status = token.last_observed_status.as_deref(),
                    "Retry budget spent before the stream stabilized"
                );
                return ReconciliationResult::failed(ErrorKind::Timeout, TIMED_OUT_MESSAGE);
            }
        }

        match (operation, token) {
            (Operation::Create { resource, naming }, None) => {
                self.submit_create(backend, resource, naming).await
            }
            (Operation::Create { resource, naming }, Some(token)) => {
                self.poll_create(backend, resource, naming, token).await
            }
            (Operation::Delete { identity }, None) => self.submit_delete(backend, identity).await,
            (Operation::Delete { identity }, Some(token)) => {
                self.poll_delete(backend, identity, token).await
            }
        }
    }

    async fn submit_create<B>(
        &self,
        backend: &B,
        resource: &ResourceModel,
        naming: &NamingInputs,
    ) -> ReconciliationResult
    where
        B: DeliveryStreamBackend + ?Sized,
    {
        let name = match resolve_name(resource, naming) {
            Ok(name) => name,
            Err(e) => {
                warn!(error = %e, "Could not resolve a stream name");
                return ReconciliationResult::failed(ErrorKind::InvalidRequest, e.to_string());
            }
        };

        match backend.describe_stream(&name).await {
            Ok(existing) => {
                warn!(
                    stream = %name,
                    status = %existing.status,
                    "Stream already exists, refusing to create"
                );
                return ReconciliationResult::failed(ErrorKind::Conflict, ALREADY_EXISTS_MESSAGE);
            }
            Err(e) if e.is_not_found() => {}
            Err(e) => return failed_from(&e, &name, "existence check failed"),
        }

        let created = match backend.create_stream(&name, &resource.configuration).await {
            Ok(created) => created,
            Err(e) => return failed_from(&e, &name, "create submission failed"),
        };
        info!(stream = %name, arn = %created.arn, "Create submitted");

        let mut model = resource.clone();
        model.delivery_stream_name = Some(name.clone());
        model.arn = Some(created.arn);

        let observed = match backend.describe_stream(&name).await {
            Ok(description) => Some(description.status.as_str().to_string()),
            // Not visible yet; the next poll will see it.
            Err(e) if e.is_not_found() => None,
            Err(e) => return failed_from(&e, &name, "status query failed"),
        };

        let token = ContinuationToken::new(self.config.retry_budget, observed);
        self.in_progress(token, Some(model))
    }

    async fn poll_create<B>(
        &self,
        backend: &B,
        resource: &ResourceModel,
        naming: &NamingInputs,
        token: &ContinuationToken,
    ) -> ReconciliationResult
    where
        B: DeliveryStreamBackend + ?Sized,
    {
        let name = match resolve_name(resource, naming) {
            Ok(name) => name,
            Err(e) => {
                return ReconciliationResult::failed(ErrorKind::InvalidRequest, e.to_string())
            }
        };

        let description = match backend.describe_stream(&name).await {
            Ok(description) => description,
            Err(e) => return failed_from(&e, &name, "status query failed"),
        };

        let mut model = resource.clone();
        model.delivery_stream_name = Some(name.clone());
        if model.arn.is_none() {
            model.arn = description.arn.clone();
        }

        if description.status.is(&self.config.active_status) {
            info!(stream = %name, "Stream is active");
            return ReconciliationResult::Success {
                resource: Some(model),
            };
        }

        debug!(
            stream = %name,
            status = %description.status,
            retries_remaining = token.retries_remaining,
            "Stream not active yet"
        );
        let next = token.next(description.status.as_str());
        self.in_progress(next, Some(model))
    }

    /// Existence guard, delete submission, then one status query.
    ///
    /// If that query already reports the stream gone the chain ends here
    /// with `Success` instead of handing out a token.
    async fn submit_delete<B>(&self, backend: &B, name: &StreamName) -> ReconciliationResult
    where
        B: DeliveryStreamBackend + ?Sized,
    {
        match backend.describe_stream(name).await {
            Ok(_) => {}
            Err(e) if e.is_not_found() => {
                warn!(stream = %name, "Stream to delete does not exist");
                return ReconciliationResult::failed(ErrorKind::NotFound, e.to_string());
            }
            Err(e) => return failed_from(&e, name, "existence check failed"),
        }

        if let Err(e) = backend
            .delete_stream(name, self.config.force_delete)
            .await
        {
            return failed_from(&e, name, "delete submission failed");
        }
        info!(stream = %name, force = self.config.force_delete, "Delete submitted");

        match backend.describe_stream(name).await {
            Ok(description) => {
                let token = ContinuationToken::new(
                    self.config.retry_budget,
                    Some(description.status.as_str().to_string()),
                );
                self.in_progress(token, None)
            }
            Err(e) if e.is_not_found() => {
                info!(stream = %name, "Stream deleted");
                ReconciliationResult::Success { resource: None }
            }
            Err(e) => failed_from(&e, name, "status query failed"),
        }
    }

    async fn poll_delete<B>(
        &self,
        backend: &B,
        name: &StreamName,
        token: &ContinuationToken,
    ) -> ReconciliationResult
    where
        B: DeliveryStreamBackend + ?Sized,
    {
        match backend.describe_stream(name).await {
            Ok(description) => {
                debug!(
                    stream = %name,
                    status = %description.status,
                    retries_remaining = token.retries_remaining,
                    "Stream still present"
                );
                self.in_progress(token.next(description.status.as_str()), None)
            }
            Err(e) if e.is_not_found() => {
                info!(stream = %name, "Stream deleted");
                ReconciliationResult::Success { resource: None }
            }
            Err(e) => failed_from(&e, name, "status query failed"),
        }
    }

    fn in_progress(
        &self,
        token: ContinuationToken,
        resource: Option<ResourceModel>,
    ) -> ReconciliationResult {
        ReconciliationResult::InProgress {
            token,
            delay_seconds: self.config.poll_interval_secs,
            resource,
        }
    }
}

fn failed_from(error: &BackendError, name: &StreamName, context: &str) -> ReconciliationResult {
    let kind = classify(error);
    warn!(
        stream = %name,
        kind = %kind,
        error_code = error.error_code(),
        error = %error,
        "{context}"
    );
    ReconciliationResult::failed(kind, error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use conveyor_backend::memory::{BackendCall, InMemoryBackend, SimulationConfig};
    use serde_json::json;

    fn create_op(name: &str) -> Operation {
        Operation::Create {
            resource: ResourceModel::new(json!({"DeliveryStreamType": "DirectPut"}))
                .with_name(StreamName::parse(name).unwrap()),
            naming: NamingInputs::new("Orders", "req-1"),
        }
    }

    #[tokio::test]
    async fn test_exhausted_token_times_out_without_calls() {
        let backend = InMemoryBackend::default();
        let engine = ReconciliationEngine::default();
        let token = ContinuationToken::new(0, Some("CREATING".to_string()));

        let result = engine
            .reconcile(&backend, &create_op("orders"), Some(&token))
            .await;

        assert_eq!(
            result,
            ReconciliationResult::failed(ErrorKind::Timeout, TIMED_OUT_MESSAGE)
        );
        assert_eq!(backend.calls(BackendCall::Describe), 0);
        assert_eq!(backend.mutating_calls(), 0);
    }

    #[tokio::test]
    async fn test_first_create_records_name_and_arn() {
        let backend = InMemoryBackend::default();
        let engine = ReconciliationEngine::default();

        let result = engine.reconcile(&backend, &create_op("orders"), None).await;

        match result {
            ReconciliationResult::InProgress {
                token,
                delay_seconds,
                resource: Some(model),
            } => {
                assert_eq!(token.retries_remaining, 40);
                assert_eq!(token.last_observed_status.as_deref(), Some("CREATING"));
                assert_eq!(delay_seconds, 30);
                assert_eq!(model.delivery_stream_name.unwrap().as_str(), "orders");
                assert!(model.arn.is_some());
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(backend.calls(BackendCall::Create), 1);
    }

    #[tokio::test]
    async fn test_unnamed_create_uses_derived_name() {
        let backend = InMemoryBackend::default();
        let engine = ReconciliationEngine::default();
        let op = Operation::Create {
            resource: ResourceModel::new(json!({})),
            naming: NamingInputs::new("Orders", "req-1"),
        };

        let result = engine.reconcile(&backend, &op, None).await;
        let expected = crate::naming::derive_stream_name("Orders", "req-1").unwrap();

        assert!(matches!(
            result,
            ReconciliationResult::InProgress { resource: Some(ref m), .. }
                if m.delivery_stream_name.as_ref() == Some(&expected)
        ));
        assert!(backend.status_of(&expected).await.is_some());
    }

    #[tokio::test]
    async fn test_custom_active_status_and_interval() {
        let backend = InMemoryBackend::default();
        backend.insert_stream(StreamName::parse("orders").unwrap(), "READY").await;
        let engine = ReconciliationEngine::new(
            EngineConfig::default()
                .with_active_status("READY")
                .with_poll_interval(5),
        );
        let token = ContinuationToken::new(3, None);

        let result = engine
            .reconcile(&backend, &create_op("orders"), Some(&token))
            .await;
        assert!(matches!(result, ReconciliationResult::Success { .. }));

        backend.insert_stream(StreamName::parse("payments").unwrap(), "ACTIVE").await;
        let result = engine
            .reconcile(&backend, &create_op("payments"), Some(&token))
            .await;
        assert!(matches!(
            result,
            ReconciliationResult::InProgress { delay_seconds: 5, .. }
        ));
    }

    #[tokio::test]
    async fn test_delete_honors_force_flag_setting() {
        let backend = InMemoryBackend::new(SimulationConfig::default());
        let name = StreamName::parse("orders").unwrap();
        backend.insert_stream(name.clone(), "ACTIVE").await;
        let engine = ReconciliationEngine::new(EngineConfig::default().with_force_delete(false));

        let result = engine
            .reconcile(&backend, &Operation::Delete { identity: name }, None)
            .await;

        assert!(matches!(result, ReconciliationResult::InProgress { .. }));
        assert_eq!(backend.calls(BackendCall::Delete), 1);
        assert_eq!(backend.last_force_delete().await, Some(false));
    }
}
