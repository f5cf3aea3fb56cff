//! Delivery stream type definitions
//!
//! Status values and the shapes returned by backend calls.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ids::{StreamArn, StreamName};

/// Status string reported by the service for a delivery stream.
///
/// The service owns this vocabulary and may add values, so this is an open
/// newtype rather than a closed enum. The well-known values are provided as
/// associated constants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StreamStatus(String);

impl StreamStatus {
    /// Stream is ready to receive data.
    pub const ACTIVE: &'static str = "ACTIVE";
    /// Create was accepted and is still being provisioned.
    pub const CREATING: &'static str = "CREATING";
    /// Provisioning failed.
    pub const CREATING_FAILED: &'static str = "CREATING_FAILED";
    /// Delete was accepted and teardown is in progress.
    pub const DELETING: &'static str = "DELETING";
    /// Teardown failed.
    pub const DELETING_FAILED: &'static str = "DELETING_FAILED";

    /// Wrap a raw status string.
    pub fn new(status: impl Into<String>) -> Self {
        Self(status.into())
    }

    /// The `ACTIVE` status.
    #[must_use]
    pub fn active() -> Self {
        Self::new(Self::ACTIVE)
    }

    /// The `CREATING` status.
    #[must_use]
    pub fn creating() -> Self {
        Self::new(Self::CREATING)
    }

    /// The `DELETING` status.
    #[must_use]
    pub fn deleting() -> Self {
        Self::new(Self::DELETING)
    }

    /// Get the status as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check whether this status equals `expected`.
    #[must_use]
    pub fn is(&self, expected: &str) -> bool {
        self.0 == expected
    }
}

impl fmt::Display for StreamStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StreamStatus {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Result of a successful create submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedStream {
    /// ARN assigned to the new stream.
    pub arn: StreamArn,
}

/// Point-in-time description of a delivery stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamDescription {
    /// Stream name.
    pub name: StreamName,
    /// Stream ARN, when the service reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<StreamArn>,
    /// Current status.
    pub status: StreamStatus,
}

impl StreamDescription {
    /// Create a description without an ARN.
    pub fn new(name: StreamName, status: impl Into<StreamStatus>) -> Self {
        Self {
            name,
            arn: None,
            status: status.into(),
        }
    }

    /// Attach an ARN.
    #[must_use]
    pub fn with_arn(mut self, arn: StreamArn) -> Self {
        self.arn = Some(arn);
        self
    }
}
