//! Engine configuration.
//!
//! Defaults match the service's documented stabilization policy: 40 polls
//! 30 seconds apart. Every value can be overridden from the environment.

use std::env;

use thiserror::Error;

/// Environment variable for [`EngineConfig::retry_budget`].
pub const ENV_RETRY_BUDGET: &str = "CONVEYOR_RETRY_BUDGET";
/// Environment variable for [`EngineConfig::poll_interval_secs`].
pub const ENV_POLL_INTERVAL_SECS: &str = "CONVEYOR_POLL_INTERVAL_SECS";
/// Environment variable for [`EngineConfig::active_status`].
pub const ENV_ACTIVE_STATUS: &str = "CONVEYOR_ACTIVE_STATUS";
/// Environment variable for [`EngineConfig::force_delete`].
pub const ENV_FORCE_DELETE: &str = "CONVEYOR_FORCE_DELETE";

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },
}

impl ConfigError {
    fn invalid(var: &str, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            var: var.to_string(),
            message: message.into(),
        }
    }
}

/// Stabilization policy for the reconciliation engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Polling invocations allowed after the mutating call.
    pub retry_budget: u32,

    /// Delay requested between invocations, in seconds.
    pub poll_interval_secs: u64,

    /// Status string that ends a create chain successfully.
    pub active_status: String,

    /// Whether delete asks the service to force deletion.
    pub force_delete: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            retry_budget: 40,
            poll_interval_secs: 30,
            active_status: "ACTIVE".to_string(),
            force_delete: true,
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn with_retry_budget(mut self, budget: u32) -> Self {
        self.retry_budget = budget;
        self
    }

    #[must_use]
    pub fn with_poll_interval(mut self, secs: u64) -> Self {
        self.poll_interval_secs = secs;
        self
    }

    #[must_use]
    pub fn with_active_status(mut self, status: impl Into<String>) -> Self {
        self.active_status = status.into();
        self
    }

    #[must_use]
    pub fn with_force_delete(mut self, force: bool) -> Self {
        self.force_delete = force;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::invalid(
                ENV_POLL_INTERVAL_SECS,
                "poll interval must be greater than zero",
            ));
        }
        if self.active_status.trim().is_empty() {
            return Err(ConfigError::invalid(
                ENV_ACTIVE_STATUS,
                "active status must not be empty",
            ));
        }
        Ok(())
    }

    /// Load from the process environment, falling back to defaults for unset
    /// variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Load using `lookup` to resolve variable names.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(raw) = get(ENV_RETRY_BUDGET) {
            config.retry_budget = raw
                .trim()
                .parse::<u32>()
                .map_err(|e| ConfigError::invalid(ENV_RETRY_BUDGET, e.to_string()))?;
        }

        if let Some(raw) = get(ENV_POLL_INTERVAL_SECS) {
            config.poll_interval_secs = raw
                .trim()
                .parse::<u64>()
                .map_err(|e| ConfigError::invalid(ENV_POLL_INTERVAL_SECS, e.to_string()))?;
        }

        if let Some(raw) = get(ENV_ACTIVE_STATUS) {
            config.active_status = raw.trim().to_string();
        }

        if let Some(raw) = get(ENV_FORCE_DELETE) {
            config.force_delete = parse_bool(&raw)
                .ok_or_else(|| ConfigError::invalid(ENV_FORCE_DELETE, "expected true or false"))?;
        }

        config.validate()?;
        Ok(config)
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
