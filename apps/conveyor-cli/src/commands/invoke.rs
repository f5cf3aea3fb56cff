//! Invoke command - Perform exactly one engine invocation
//!
//! Intended for external orchestrators that own the re-invocation loop
//! themselves: the result is printed as JSON, with the continuation token
//! also given in its opaque string form.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use conveyor_handler::{ContinuationToken, Operation, ReconciliationResult};

use super::{into_exit, GlobalArgs};
use crate::error::{CliError, CliResult};

/// Arguments for the invoke command
#[derive(Args, Debug)]
pub struct InvokeArgs {
    /// JSON file holding the operation
    #[arg(long)]
    pub operation: PathBuf,

    /// Encoded continuation token from the previous invocation
    #[arg(long)]
    pub token: Option<String>,
}

/// JSON output for invoke
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InvokeOutput<'a> {
    result: &'a ReconciliationResult,
    /// False while the caller must invoke again.
    terminal: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    encoded_token: Option<String>,
}

impl<'a> InvokeOutput<'a> {
    fn new(result: &'a ReconciliationResult) -> Self {
        Self {
            result,
            terminal: result.is_terminal(),
            encoded_token: result.token().map(ContinuationToken::encode),
        }
    }
}

/// Execute the invoke command
pub async fn execute(args: InvokeArgs, globals: &GlobalArgs) -> CliResult<()> {
    let contents = std::fs::read_to_string(&args.operation).map_err(|e| {
        CliError::Validation(format!("cannot read {}: {e}", args.operation.display()))
    })?;
    let operation: Operation = serde_json::from_str(&contents)?;
    let token = args
        .token
        .as_deref()
        .map(ContinuationToken::decode)
        .transpose()?;

    let backend = globals.backend()?;
    let engine = globals.engine()?;
    let result = engine
        .reconcile(backend.as_ref(), &operation, token.as_ref())
        .await;

    println!("{}", serde_json::to_string_pretty(&InvokeOutput::new(&result))?);
    into_exit(result)
}
