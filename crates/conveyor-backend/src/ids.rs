//! Delivery stream identifier types
//!
//! Newtype wrappers that validate identifiers at the boundary.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Maximum length the service accepts for a delivery stream name.
pub const MAX_STREAM_NAME_LEN: usize = 64;

/// Error returned when a stream name fails validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    /// The name is empty.
    #[error("stream name must not be empty")]
    Empty,

    /// The name is longer than the service allows.
    #[error("stream name is {len} characters, maximum is 64")]
    TooLong { len: usize },

    /// The name contains a character outside `[A-Za-z0-9_.-]`.
    #[error("stream name contains invalid character {ch:?}")]
    InvalidCharacter { ch: char },
}

/// Name of a delivery stream.
///
/// This is the resource identifier used by every backend call. Valid names are
/// 1-64 characters drawn from `[A-Za-z0-9_.-]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StreamName(String);

impl StreamName {
    /// Parse and validate a stream name.
    pub fn parse(s: impl Into<String>) -> Result<Self, NameError> {
        let s = s.into();
        if s.is_empty() {
            return Err(NameError::Empty);
        }
        let len = s.chars().count();
        if len > MAX_STREAM_NAME_LEN {
            return Err(NameError::TooLong { len });
        }
        if let Some(ch) = s.chars().find(|c| !is_name_char(*c)) {
            return Err(NameError::InvalidCharacter { ch });
        }
        Ok(Self(s))
    }

    /// Get the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Whether `c` may appear in a stream name.
#[must_use]
pub fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')
}

impl fmt::Display for StreamName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for StreamName {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for StreamName {
    type Error = NameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<StreamName> for String {
    fn from(name: StreamName) -> Self {
        name.0
    }
}

impl AsRef<str> for StreamName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// ARN the service assigns to a delivery stream on creation.
///
/// Opaque to this crate; it is recorded and echoed back, never parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StreamArn(String);

impl StreamArn {
    /// Wrap a raw ARN string.
    pub fn new(arn: impl Into<String>) -> Self {
        Self(arn.into())
    }

    /// Get the ARN as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StreamArn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
