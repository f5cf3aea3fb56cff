//! CLI command implementations

pub mod create;
pub mod delete;
pub mod describe;
pub mod invoke;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use tracing::info;

use conveyor_backend::config::BackendConfig;
use conveyor_backend::http::HttpBackend;
use conveyor_backend::memory::InMemoryBackend;
use conveyor_backend::traits::DeliveryStreamBackend;
use conveyor_handler::{EngineConfig, ReconciliationEngine, ReconciliationResult};

use crate::error::{CliError, CliResult};
use crate::logging::LogFormat;
use crate::orchestrator::{ChainOutcome, ChainRunner, DEFAULT_MAX_INVOCATIONS};

/// Options shared by every command.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Service endpoint URL
    #[arg(long, global = true, env = "CONVEYOR_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Bearer token sent to the service
    #[arg(long, global = true, env = "CONVEYOR_BEARER_TOKEN", hide_env_values = true)]
    pub bearer_token: Option<String>,

    /// Run against an in-process simulated service
    #[arg(long, global = true)]
    pub simulate: bool,

    /// Persist chain state here after every invocation and resume from it
    #[arg(long, global = true)]
    pub state_file: Option<PathBuf>,

    /// Give up after this many invocations
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_INVOCATIONS)]
    pub max_invocations: u32,

    /// Do not sleep between invocations
    #[arg(long, global = true)]
    pub no_wait: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl GlobalArgs {
    /// Build the backend selected by the flags.
    pub fn backend(&self) -> CliResult<Arc<dyn DeliveryStreamBackend>> {
        if self.simulate {
            info!("Using simulated backend");
            return Ok(Arc::new(InMemoryBackend::default()));
        }

        let endpoint = self
            .endpoint
            .as_deref()
            .ok_or_else(|| CliError::Config("no service endpoint configured".to_string()))?;
        let mut config = BackendConfig::new(endpoint);
        if let Some(token) = &self.bearer_token {
            config = config.with_bearer_token(token.clone());
        }
        let backend = HttpBackend::new(config)
            .map_err(|e| CliError::Config(e.to_string()))?;
        Ok(Arc::new(backend))
    }

    /// Engine configured from the environment.
    pub fn engine(&self) -> CliResult<ReconciliationEngine> {
        Ok(ReconciliationEngine::new(EngineConfig::from_env()?))
    }

    /// Chain runner honoring the orchestration flags.
    pub fn runner(&self) -> CliResult<ChainRunner> {
        let mut runner = ChainRunner::new(self.engine()?)
            .with_max_invocations(self.max_invocations)
            .with_wait(!self.no_wait);
        if let Some(path) = &self.state_file {
            runner = runner.with_state_file(path);
        }
        Ok(runner)
    }
}

/// Print a terminal outcome and map `Failed` to an error.
pub(crate) fn report(outcome: ChainOutcome) -> CliResult<()> {
    info!(
        chain_id = %outcome.chain_id,
        invocations = outcome.invocations,
        "Reporting chain outcome"
    );
    println!("{}", serde_json::to_string_pretty(&outcome.result)?);
    into_exit(outcome.result)
}

pub(crate) fn into_exit(result: ReconciliationResult) -> CliResult<()> {
    match result {
        ReconciliationResult::Failed { kind, message } => {
            Err(CliError::ChainFailed { kind, message })
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conveyor_handler::ErrorKind;

    fn globals() -> GlobalArgs {
        GlobalArgs {
            endpoint: None,
            bearer_token: None,
            simulate: false,
            state_file: None,
            max_invocations: 100,
            no_wait: false,
            verbose: false,
            log_format: LogFormat::Text,
        }
    }

    #[test]
    fn test_backend_requires_endpoint() {
        let err = globals().backend().err().unwrap();
        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    fn test_backend_selection() {
        let simulated = GlobalArgs {
            simulate: true,
            ..globals()
        };
        assert_eq!(simulated.backend().unwrap().display_name(), "in-memory");

        let http = GlobalArgs {
            endpoint: Some("http://localhost:4573".to_string()),
            ..globals()
        };
        assert!(http.backend().unwrap().display_name().starts_with("HTTP"));

        let bad = GlobalArgs {
            endpoint: Some("ftp://localhost".to_string()),
            ..globals()
        };
        assert!(bad.backend().is_err());
    }

    #[test]
    fn test_failed_result_maps_to_exit_code() {
        let err = into_exit(ReconciliationResult::Failed {
            kind: ErrorKind::Timeout,
            message: "stabilization timed out".to_string(),
        })
        .unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(into_exit(ReconciliationResult::Success { resource: None }).is_ok());
    }
}
