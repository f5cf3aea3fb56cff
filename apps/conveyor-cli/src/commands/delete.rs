//! Delete command - Run a delete chain to its terminal outcome

use clap::Args;

use conveyor_backend::ids::StreamName;
use conveyor_handler::Operation;

use super::{report, GlobalArgs};
use crate::error::CliResult;

/// Arguments for the delete command
#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Name recorded when the stream was created
    #[arg(long)]
    pub name: String,
}

/// Execute the delete command
pub async fn execute(args: DeleteArgs, globals: &GlobalArgs) -> CliResult<()> {
    let operation = Operation::Delete {
        identity: StreamName::parse(args.name)?,
    };
    let backend = globals.backend()?;
    let outcome = globals.runner()?.run(backend.as_ref(), operation).await?;
    report(outcome)
}
