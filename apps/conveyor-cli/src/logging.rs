//! Tracing subscriber setup.
//!
//! Logs go to stderr so stdout stays reserved for command output.

use clap::ValueEnum;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Default filter directive for a verbosity flag.
fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "info,conveyor_handler=debug,conveyor_backend=debug,conveyor_cli=debug"
    } else {
        "warn,conveyor_cli=info,conveyor_handler=info"
    }
}

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` takes precedence over the verbosity flag.
pub fn init_logging(format: LogFormat, verbose: bool) {
    let filter = default_filter(verbose);
    let filter_layer =
        match EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(filter)) {
            Ok(f) => f,
            Err(e) => {
                eprintln!("FATAL: Failed to create log filter: {e}");
                std::process::exit(1);
            }
        };

    let registry = tracing_subscriber::registry().with(filter_layer);
    match format {
        LogFormat::Json => {
            let fmt_layer = fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .flatten_event(true);
            registry.with(fmt_layer).init();
        }
        LogFormat::Text => {
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false);
            registry.with(fmt_layer).init();
        }
    }

    tracing::debug!(filter = %filter, "Logging initialized");
}

/// Initialize logging for tests (with simpler output).
#[cfg(test)]
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("debug")
        .try_init();
}
