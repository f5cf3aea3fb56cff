//! HTTP backend configuration

use serde::{Deserialize, Serialize};

use crate::error::{BackendError, BackendResult};

const REDACTED: &str = "***REDACTED***";

fn default_connect_timeout() -> u64 {
    10
}

fn default_request_timeout() -> u64 {
    30
}

/// Configuration for [`HttpBackend`](crate::http::HttpBackend).
#[derive(Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Service endpoint (e.g., `https://firehose.eu-west-1.example.com`).
    pub endpoint: String,

    /// Bearer token sent as `Authorization` on every request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearer_token: Option<String>,

    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Whole-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl BackendConfig {
    /// Create a configuration for the given endpoint with default timeouts.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            bearer_token: None,
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
        }
    }

    /// Set bearer token authentication.
    #[must_use]
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Set the connection timeout.
    #[must_use]
    pub fn with_connect_timeout(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = secs;
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> BackendResult<()> {
        if self.endpoint.is_empty() {
            return Err(BackendError::InvalidConfiguration {
                message: "endpoint is required".to_string(),
            });
        }

        let url =
            url::Url::parse(&self.endpoint).map_err(|e| BackendError::InvalidConfiguration {
                message: format!("invalid endpoint: {e}"),
            })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(BackendError::InvalidConfiguration {
                message: format!("unsupported endpoint scheme: {}", url.scheme()),
            });
        }

        if url.host_str().is_none() {
            return Err(BackendError::InvalidConfiguration {
                message: "endpoint has no host".to_string(),
            });
        }

        if self.request_timeout_secs == 0 {
            return Err(BackendError::InvalidConfiguration {
                message: "request_timeout_secs must be greater than zero".to_string(),
            });
        }

        Ok(())
    }

    /// Get a copy with the bearer token masked.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if config.bearer_token.is_some() {
            config.bearer_token = Some(REDACTED.to_string());
        }
        config
    }
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redacted = self.redacted();
        f.debug_struct("BackendConfig")
            .field("endpoint", &redacted.endpoint)
            .field("bearer_token", &redacted.bearer_token)
            .field("connect_timeout_secs", &redacted.connect_timeout_secs)
            .field("request_timeout_secs", &redacted.request_timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BackendConfig::new("https://firehose.example.com");
        assert_eq!(config.connect_timeout_secs, 10);
        assert_eq!(config.request_timeout_secs, 30);
        assert!(config.bearer_token.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_endpoints() {
        for endpoint in ["", "not a url", "ftp://firehose.example.com"] {
            let config = BackendConfig::new(endpoint);
            assert!(
                matches!(
                    config.validate(),
                    Err(BackendError::InvalidConfiguration { .. })
                ),
                "{endpoint:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = BackendConfig::new("https://firehose.example.com").with_request_timeout(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_token() {
        let config =
            BackendConfig::new("https://firehose.example.com").with_bearer_token("s3cr3t-token");
        let debug = format!("{config:?}");
        assert!(!debug.contains("s3cr3t-token"));
        assert!(debug.contains(REDACTED));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: BackendConfig =
            serde_json::from_str(r#"{"endpoint": "http://localhost:4573"}"#).unwrap();
        assert_eq!(config.endpoint, "http://localhost:4573");
        assert_eq!(config.request_timeout_secs, 30);
    }
}
