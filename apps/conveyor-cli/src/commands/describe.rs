//! Describe command - Print the service's view of a stream

use clap::Args;

use conveyor_backend::ids::StreamName;

use super::GlobalArgs;
use crate::error::CliResult;

/// Arguments for the describe command
#[derive(Args, Debug)]
pub struct DescribeArgs {
    /// Stream name
    #[arg(long)]
    pub name: String,
}

/// Execute the describe command
pub async fn execute(args: DescribeArgs, globals: &GlobalArgs) -> CliResult<()> {
    let name = StreamName::parse(args.name)?;
    let backend = globals.backend()?;
    let description = backend.describe_stream(&name).await?;
    println!("{}", serde_json::to_string_pretty(&description)?);
    Ok(())
}
