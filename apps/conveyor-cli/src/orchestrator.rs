//! Re-invocation loop for reconciliation chains.
//!
//! The engine performs one unit of work per call. [`ChainRunner`] owns the
//! loop around it: it keeps the token and resource model the engine hands
//! back, persists them, waits the requested delay and invokes again until
//! the chain is terminal or the invocation ceiling is reached.

use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use conveyor_backend::traits::DeliveryStreamBackend;
use conveyor_handler::{Operation, ReconciliationEngine, ReconciliationResult};

use crate::error::{CliError, CliResult};
use crate::state::ChainState;

/// Default invocation ceiling.
pub const DEFAULT_MAX_INVOCATIONS: u32 = 100;

/// Terminal result of a chain.
#[derive(Debug, Clone)]
pub struct ChainOutcome {
    pub chain_id: Uuid,
    pub result: ReconciliationResult,
    /// Invocations made across all runs of this chain.
    pub invocations: u32,
}

/// Drives a chain to a terminal outcome.
#[derive(Debug, Clone)]
pub struct ChainRunner {
    engine: ReconciliationEngine,
    max_invocations: u32,
    wait: bool,
    state_file: Option<PathBuf>,
}

impl ChainRunner {
    pub fn new(engine: ReconciliationEngine) -> Self {
        Self {
            engine,
            max_invocations: DEFAULT_MAX_INVOCATIONS,
            wait: true,
            state_file: None,
        }
    }

    #[must_use]
    pub fn with_max_invocations(mut self, max: u32) -> Self {
        self.max_invocations = max;
        self
    }

    /// Whether to sleep for the requested delay between invocations.
    #[must_use]
    pub fn with_wait(mut self, wait: bool) -> Self {
        self.wait = wait;
        self
    }

    #[must_use]
    pub fn with_state_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.state_file = Some(path.into());
        self
    }

    /// Run `operation` to completion.
    ///
    /// If the state file holds an unfinished chain of the same kind for the
    /// same stream, that chain is resumed instead. Any other unfinished chain
    /// is an error. A `Failed` result is returned as an `Ok` outcome; only
    /// orchestration problems are errors.
    #[instrument(skip_all, fields(operation = operation.kind()))]
    pub async fn run<B>(&self, backend: &B, operation: Operation) -> CliResult<ChainOutcome>
    where
        B: DeliveryStreamBackend + ?Sized,
    {
        let mut state = match self.resume(&operation)? {
            Some(state) => state,
            None => ChainState::new(operation),
        };
        info!(
            chain_id = %state.chain_id,
            retry_budget = self.engine.config().retry_budget,
            max_invocations = self.max_invocations,
            "Running chain"
        );

        loop {
            if state.invocations >= self.max_invocations {
                warn!(
                    chain_id = %state.chain_id,
                    invocations = state.invocations,
                    "Invocation ceiling reached"
                );
                return Err(CliError::InvocationLimit {
                    max: self.max_invocations,
                });
            }

            let result = self
                .engine
                .reconcile(backend, &state.operation, state.token.as_ref())
                .await;

            match result {
                ReconciliationResult::InProgress {
                    token,
                    delay_seconds,
                    resource,
                } => {
                    debug!(
                        chain_id = %state.chain_id,
                        retries_remaining = token.retries_remaining,
                        status = token.last_observed_status.as_deref(),
                        delay_seconds,
                        "Chain in progress"
                    );
                    let operation = state.operation.clone().with_resource(resource);
                    state.advance(operation, token);
                    self.persist(&state)?;

                    if self.wait {
                        tokio::time::sleep(Duration::from_secs(delay_seconds)).await;
                    }
                }
                terminal => {
                    state.invocations += 1;
                    self.clear()?;
                    info!(
                        chain_id = %state.chain_id,
                        invocations = state.invocations,
                        success = matches!(terminal, ReconciliationResult::Success { .. }),
                        "Chain finished"
                    );
                    return Ok(ChainOutcome {
                        chain_id: state.chain_id,
                        result: terminal,
                        invocations: state.invocations,
                    });
                }
            }
        }
    }

    fn resume(&self, operation: &Operation) -> CliResult<Option<ChainState>> {
        let Some(path) = &self.state_file else {
            return Ok(None);
        };
        let Some(state) = ChainState::load(path)? else {
            return Ok(None);
        };

        if state.operation.kind() != operation.kind() {
            return Err(CliError::Validation(format!(
                "state file {} holds an unfinished {} chain",
                path.display(),
                state.operation.kind()
            )));
        }

        let stored = state.operation.target_name()?;
        let requested = operation.target_name()?;
        if stored != requested {
            return Err(CliError::Validation(format!(
                "state file {} holds an unfinished {} chain for {stored}, not {requested}",
                path.display(),
                state.operation.kind()
            )));
        }

        info!(
            chain_id = %state.chain_id,
            invocations = state.invocations,
            path = %path.display(),
            "Resuming chain from state file"
        );
        Ok(Some(state))
    }

    fn persist(&self, state: &ChainState) -> CliResult<()> {
        match &self.state_file {
            Some(path) => state.save(path),
            None => Ok(()),
        }
    }

    fn clear(&self) -> CliResult<()> {
        match &self.state_file {
            Some(path) => ChainState::clear(path),
            None => Ok(()),
        }
    }
}
