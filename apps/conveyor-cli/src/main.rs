//! conveyor CLI - Drive delivery stream reconciliation chains
//!
//! This CLI enables operators to:
//! - Create a delivery stream and wait for it to become active
//! - Delete a delivery stream and wait for it to disappear
//! - Run single engine invocations for an external orchestrator
//! - Inspect a stream's current status

use clap::{Parser, Subcommand};

mod commands;
mod error;
mod logging;
mod orchestrator;
mod state;

use commands::GlobalArgs;
use error::CliResult;

/// conveyor CLI - Delivery stream reconciliation
#[derive(Parser)]
#[command(name = "conveyor")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(flatten)]
    globals: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a stream and wait until it is active
    Create(commands::create::CreateArgs),

    /// Delete a stream and wait until it is gone
    Delete(commands::delete::DeleteArgs),

    /// Perform one engine invocation and print the result
    Invoke(commands::invoke::InvokeArgs),

    /// Show a stream's current description
    Describe(commands::describe::DescribeArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.globals.log_format, cli.globals.verbose);

    let result = run(cli).await;

    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            e.print();
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    let globals = cli.globals;
    match cli.command {
        Commands::Create(args) => commands::create::execute(args, &globals).await,
        Commands::Delete(args) => commands::delete::execute(args, &globals).await,
        Commands::Invoke(args) => commands::invoke::execute(args, &globals).await,
        Commands::Describe(args) => commands::describe::execute(args, &globals).await,
    }
}
