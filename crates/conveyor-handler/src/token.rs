//! Continuation tokens for resumable reconciliation chains.
//!
//! The engine keeps no memory between invocations. Everything a chain needs
//! to pick up where it left off travels in a [`ContinuationToken`] that the
//! caller stores and hands back on the next invocation.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors decoding an encoded continuation token.
#[derive(Debug, Error)]
pub enum TokenError {
    /// The token is not valid base64.
    #[error("continuation token is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    /// The decoded bytes are not a valid token document.
    #[error("continuation token is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Polling state carried between invocations of one chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinuationToken {
    /// Polling invocations left before the chain times out.
    pub retries_remaining: u32,
    /// Last status read from the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_observed_status: Option<String>,
}

impl ContinuationToken {
    /// Start stabilization with a full retry budget.
    #[must_use]
    pub fn new(retry_budget: u32, observed_status: Option<String>) -> Self {
        Self {
            retries_remaining: retry_budget,
            last_observed_status: observed_status,
        }
    }

    /// Whether the retry budget is spent.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.retries_remaining == 0
    }

    /// Token for the next polling invocation.
    ///
    /// Consumes one retry and records `observed_status`. Saturates at zero.
    #[must_use]
    pub fn next(&self, observed_status: impl Into<String>) -> Self {
        Self {
            retries_remaining: self.retries_remaining.saturating_sub(1),
            last_observed_status: Some(observed_status.into()),
        }
    }

    /// Encode as an opaque URL-safe string.
    #[must_use]
    pub fn encode(&self) -> String {
        // Serializing a struct of a u32 and an Option<String> cannot fail.
        let json = serde_json::to_vec(self).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }

    /// Decode a string produced by [`ContinuationToken::encode`].
    pub fn decode(encoded: &str) -> Result<Self, TokenError> {
        let bytes = URL_SAFE_NO_PAD.decode(encoded.trim())?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
