//! Error classification
//!
//! Maps backend errors onto the handler's canonical error taxonomy.

use serde::{Deserialize, Serialize};
use std::fmt;

use conveyor_backend::error::BackendError;

/// Canonical error kind carried by a failed reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// The resource already exists.
    Conflict,
    /// The desired state is malformed or references an invalid resource.
    InvalidRequest,
    /// A quota is exhausted.
    ServiceLimitExceeded,
    /// The referenced resource does not exist.
    NotFound,
    /// The backend failed on its side.
    ServiceInternalError,
    /// Unclassified or unexpected failure.
    InternalFailure,
    /// The retry budget ran out before the resource stabilized.
    Timeout,
}

impl ErrorKind {
    /// Stable string form used in logs and serialized results.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Conflict => "Conflict",
            ErrorKind::InvalidRequest => "InvalidRequest",
            ErrorKind::ServiceLimitExceeded => "ServiceLimitExceeded",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::ServiceInternalError => "ServiceInternalError",
            ErrorKind::InternalFailure => "InternalFailure",
            ErrorKind::Timeout => "Timeout",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a backend error.
///
/// Total over [`BackendError`]; anything without a specific mapping is
/// `InternalFailure`.
#[must_use]
pub fn classify(error: &BackendError) -> ErrorKind {
    match error {
        BackendError::ResourceInUse { .. } => ErrorKind::Conflict,
        BackendError::InvalidArgument { .. } | BackendError::InvalidKmsResource { .. } => {
            ErrorKind::InvalidRequest
        }
        BackendError::LimitExceeded { .. } => ErrorKind::ServiceLimitExceeded,
        BackendError::ResourceNotFound { .. } => ErrorKind::NotFound,
        BackendError::ServiceUnavailable { .. } | BackendError::Service { .. } => {
            ErrorKind::ServiceInternalError
        }
        BackendError::ConcurrentModification { .. }
        | BackendError::Unrecognized { .. }
        | BackendError::Network { .. }
        | BackendError::Serialization { .. }
        | BackendError::InvalidConfiguration { .. } => ErrorKind::InternalFailure,
    }
}
