//! Create command - Run a create chain to its terminal outcome

use std::path::{Path, PathBuf};

use clap::Args;
use serde_json::Value;

use conveyor_backend::ids::StreamName;
use conveyor_handler::{NamingInputs, Operation, ResourceModel};

use super::{report, GlobalArgs};
use crate::error::{CliError, CliResult};

/// Arguments for the create command
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// JSON file with the translated create request
    #[arg(long)]
    pub config: PathBuf,

    /// Stream name; derived from the logical id and request token when
    /// omitted or blank
    #[arg(long)]
    pub name: Option<String>,

    /// Logical id of the resource
    #[arg(long)]
    pub logical_id: String,

    /// Token identifying this request. Required when the name is derived:
    /// re-running with the same token targets the same stream
    #[arg(long)]
    pub request_token: Option<String>,
}

/// Execute the create command
pub async fn execute(args: CreateArgs, globals: &GlobalArgs) -> CliResult<()> {
    let operation = build_operation(&args)?;
    let backend = globals.backend()?;
    let outcome = globals.runner()?.run(backend.as_ref(), operation).await?;
    report(outcome)
}

fn build_operation(args: &CreateArgs) -> CliResult<Operation> {
    let configuration = read_configuration(&args.config)?;
    let mut resource = ResourceModel::new(configuration);
    let name = args.name.as_deref().map(str::trim).filter(|n| !n.is_empty());
    if let Some(name) = name {
        resource = resource.with_name(StreamName::parse(name)?);
    }

    let request_token = match (&args.request_token, name) {
        (Some(token), _) => token.clone(),
        (None, Some(_)) => String::new(),
        (None, None) => {
            return Err(CliError::Validation(
                "--request-token is required when --name is not given".to_string(),
            ))
        }
    };

    Ok(Operation::Create {
        resource,
        naming: NamingInputs::new(args.logical_id.clone(), request_token),
    })
}

fn read_configuration(path: &Path) -> CliResult<Value> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| CliError::Validation(format!("cannot read {}: {e}", path.display())))?;
    let configuration: Value = serde_json::from_str(&contents)?;
    if !configuration.is_object() {
        return Err(CliError::Validation(format!(
            "{} must contain a JSON object",
            path.display()
        )));
    }
    Ok(configuration)
}
