//! Persisted chain state.
//!
//! The orchestrator writes the operation, the latest continuation token and
//! the invocation count after every invocation, so an interrupted chain can
//! be resumed by a later run.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use conveyor_handler::{ContinuationToken, Operation};

use crate::error::CliResult;

/// Snapshot of a chain between invocations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainState {
    /// Identifier used to correlate log lines of one chain across runs.
    pub chain_id: Uuid,
    /// Operation, including the accumulated resource model.
    pub operation: Operation,
    /// Token to pass on the next invocation.
    pub token: Option<ContinuationToken>,
    /// Invocations made so far.
    pub invocations: u32,
    pub updated_at: DateTime<Utc>,
}

impl ChainState {
    /// State for a chain that has not been invoked yet.
    pub fn new(operation: Operation) -> Self {
        Self {
            chain_id: Uuid::new_v4(),
            operation,
            token: None,
            invocations: 0,
            updated_at: Utc::now(),
        }
    }

    /// Record an invocation that returned `token`.
    pub fn advance(&mut self, operation: Operation, token: ContinuationToken) {
        self.operation = operation;
        self.token = Some(token);
        self.invocations += 1;
        self.updated_at = Utc::now();
    }

    /// Load state from `path`, or `None` if the file does not exist.
    pub fn load(path: &Path) -> CliResult<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&contents)?))
    }

    /// Write state to `path`, replacing any previous contents.
    pub fn save(&self, path: &Path) -> CliResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let contents = serde_json::to_string_pretty(self)?;
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, contents)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Remove the state file once the chain is terminal.
    pub fn clear(path: &Path) -> CliResult<()> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}
