//! Backend error types
//!
//! One variant per error condition the delivery-stream service documents,
//! plus the client-side failures (transport, decoding, configuration).

use thiserror::Error;

/// Error that can occur during backend calls.
#[derive(Debug, Error)]
pub enum BackendError {
    // Service-reported errors
    /// The stream exists or is in a state that does not allow the call.
    #[error("resource in use: {message}")]
    ResourceInUse { message: String },

    /// The request was rejected as malformed.
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// A referenced KMS key is unusable.
    #[error("invalid KMS resource: {message}")]
    InvalidKmsResource { message: String },

    /// An account or service quota is exhausted.
    #[error("limit exceeded: {message}")]
    LimitExceeded { message: String },

    /// The stream does not exist.
    #[error("resource not found: {identifier}")]
    ResourceNotFound { identifier: String },

    /// Another change to the stream is in flight.
    #[error("concurrent modification: {message}")]
    ConcurrentModification { message: String },

    /// The service is temporarily unable to handle the request.
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String },

    /// The service failed with a server-side error.
    #[error("service error (HTTP {status}): {message}")]
    Service { status: u16, message: String },

    /// The service returned an error type this client does not know.
    #[error("unrecognized service error {error_type}: {message}")]
    Unrecognized { error_type: String, message: String },

    // Client-side errors
    /// Network error during communication.
    #[error("network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A response body could not be decoded.
    #[error("serialization error: {message}")]
    Serialization { message: String },

    /// Client configuration is invalid.
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },
}

impl BackendError {
    /// Whether this error reports that the stream does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, BackendError::ResourceNotFound { .. })
    }

    /// Get an error code for logging and classification.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            BackendError::ResourceInUse { .. } => "RESOURCE_IN_USE",
            BackendError::InvalidArgument { .. } => "INVALID_ARGUMENT",
            BackendError::InvalidKmsResource { .. } => "INVALID_KMS_RESOURCE",
            BackendError::LimitExceeded { .. } => "LIMIT_EXCEEDED",
            BackendError::ResourceNotFound { .. } => "RESOURCE_NOT_FOUND",
            BackendError::ConcurrentModification { .. } => "CONCURRENT_MODIFICATION",
            BackendError::ServiceUnavailable { .. } => "SERVICE_UNAVAILABLE",
            BackendError::Service { .. } => "SERVICE_ERROR",
            BackendError::Unrecognized { .. } => "UNRECOGNIZED",
            BackendError::Network { .. } => "NETWORK_ERROR",
            BackendError::Serialization { .. } => "SERIALIZATION_ERROR",
            BackendError::InvalidConfiguration { .. } => "INVALID_CONFIG",
        }
    }

    /// Map a service error type (the part after `#` in `__type`) to an error.
    ///
    /// `status` is only consulted when the type is unknown.
    pub fn from_service_type(
        error_type: &str,
        message: impl Into<String>,
        identifier: &str,
        status: u16,
    ) -> Self {
        let message = message.into();
        match error_type {
            "ResourceInUseException" => BackendError::ResourceInUse { message },
            "InvalidArgumentException" => BackendError::InvalidArgument { message },
            "InvalidKMSResourceException" => BackendError::InvalidKmsResource { message },
            "LimitExceededException" => BackendError::LimitExceeded { message },
            "ResourceNotFoundException" => BackendError::ResourceNotFound {
                identifier: identifier.to_string(),
            },
            "ConcurrentModificationException" => {
                BackendError::ConcurrentModification { message }
            }
            "ServiceUnavailableException" => BackendError::ServiceUnavailable { message },
            _ if status >= 500 => BackendError::Service { status, message },
            _ => BackendError::Unrecognized {
                error_type: error_type.to_string(),
                message,
            },
        }
    }

    // Convenience constructors

    /// Create a not-found error.
    pub fn not_found(identifier: impl Into<String>) -> Self {
        BackendError::ResourceNotFound {
            identifier: identifier.into(),
        }
    }

    /// Create a resource-in-use error.
    pub fn in_use(message: impl Into<String>) -> Self {
        BackendError::ResourceInUse {
            message: message.into(),
        }
    }

    /// Create an invalid-argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        BackendError::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        BackendError::Network {
            message: message.into(),
            source: None,
        }
    }

    /// Create a network error with source.
    pub fn network_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        BackendError::Network {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a serialization error.
    pub fn serialization(message: impl Into<String>) -> Self {
        BackendError::Serialization {
            message: message.into(),
        }
    }
}

/// Result type for backend calls.
pub type BackendResult<T> = Result<T, BackendError>;
