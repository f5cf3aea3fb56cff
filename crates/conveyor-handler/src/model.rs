//! Operation and result types exchanged with the orchestrator.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use conveyor_backend::ids::{NameError, StreamArn, StreamName};

use crate::classifier::ErrorKind;
use crate::naming::resolve_name;
use crate::token::ContinuationToken;

/// Declarative state of one delivery stream.
///
/// On Create chains this also accumulates what the engine learns: the
/// resolved name and the ARN returned by the create call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceModel {
    /// Desired (or resolved) stream name. Blank counts as unset.
    #[serde(
        default,
        deserialize_with = "blank_name_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub delivery_stream_name: Option<StreamName>,

    /// ARN assigned by the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<StreamArn>,

    /// Translated request configuration, passed through unexamined.
    #[serde(default)]
    pub configuration: Value,
}

impl ResourceModel {
    /// Model with a configuration payload and no name.
    #[must_use]
    pub fn new(configuration: Value) -> Self {
        Self {
            delivery_stream_name: None,
            arn: None,
            configuration,
        }
    }

    /// Set the desired stream name.
    #[must_use]
    pub fn with_name(mut self, name: StreamName) -> Self {
        self.delivery_stream_name = Some(name);
        self
    }
}

fn blank_name_as_none<'de, D>(deserializer: D) -> Result<Option<StreamName>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => StreamName::parse(raw)
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

/// Inputs used to derive a stream name when the model does not set one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamingInputs {
    /// Logical id of the resource in the caller's template.
    pub logical_id: String,
    /// Token identifying the caller's request; stable across its retries.
    pub request_token: String,
}

impl NamingInputs {
    pub fn new(logical_id: impl Into<String>, request_token: impl Into<String>) -> Self {
        Self {
            logical_id: logical_id.into(),
            request_token: request_token.into(),
        }
    }
}

/// A reconciliation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Operation {
    /// Bring a stream into existence and wait for it to become active.
    Create {
        resource: ResourceModel,
        #[serde(default)]
        naming: NamingInputs,
    },
    /// Remove a stream and wait for it to disappear.
    Delete {
        /// Name recorded when the stream was created.
        identity: StreamName,
    },
}

impl Operation {
    /// Short name for logging.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::Create { .. } => "create",
            Operation::Delete { .. } => "delete",
        }
    }

    /// Stream the operation acts on.
    ///
    /// For Create this is the desired name, or the derived one when unset.
    pub fn target_name(&self) -> Result<StreamName, NameError> {
        match self {
            Operation::Create { resource, naming } => resolve_name(resource, naming),
            Operation::Delete { identity } => Ok(identity.clone()),
        }
    }

    /// Replace the Create model with the one echoed by an in-progress result.
    ///
    /// Delete operations are returned unchanged.
    #[must_use]
    pub fn with_resource(self, updated: Option<ResourceModel>) -> Self {
        match (self, updated) {
            (Operation::Create { naming, .. }, Some(resource)) => {
                Operation::Create { resource, naming }
            }
            (operation, _) => operation,
        }
    }
}

/// Outcome of one engine invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ReconciliationResult {
    /// The chain finished; for Delete there is no resource state.
    #[serde(rename_all = "camelCase")]
    Success { resource: Option<ResourceModel> },

    /// The chain must be re-invoked with `token` after `delay_seconds`.
    #[serde(rename_all = "camelCase")]
    InProgress {
        token: ContinuationToken,
        delay_seconds: u64,
        /// Accumulated state to pass back with the next invocation.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        resource: Option<ResourceModel>,
    },

    /// The chain failed and must not be continued.
    #[serde(rename_all = "camelCase")]
    Failed { kind: ErrorKind, message: String },
}

impl ReconciliationResult {
    pub(crate) fn failed(kind: ErrorKind, message: impl Into<String>) -> Self {
        ReconciliationResult::Failed {
            kind,
            message: message.into(),
        }
    }

    /// Whether this result ends the chain.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ReconciliationResult::InProgress { .. })
    }

    /// The continuation token, if the chain continues.
    #[must_use]
    pub fn token(&self) -> Option<&ContinuationToken> {
        match self {
            ReconciliationResult::InProgress { token, .. } => Some(token),
            _ => None,
        }
    }

    /// The error kind, if the chain failed.
    #[must_use]
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            ReconciliationResult::Failed { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}
