//! CLI error types and exit codes

use thiserror::Error;

use conveyor_backend::error::BackendError;
use conveyor_backend::ids::NameError;
use conveyor_handler::{ConfigError, ErrorKind, TokenError};

/// Exit codes for the CLI
/// - 0: Success
/// - 1: General error
/// - 2: Chain failed
/// - 3: Invocation ceiling reached
/// - 4: Invalid input
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Chain failed ({kind}): {message}")]
    ChainFailed { kind: ErrorKind, message: String },

    #[error("Chain did not finish within {max} invocations")]
    InvocationLimit { max: u32 },

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Invalid stream name: {0}")]
    InvalidName(#[from] NameError),

    #[error("Invalid continuation token: {0}")]
    InvalidToken(#[from] TokenError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("I/O error: {0}")]
    Io(String),
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::ChainFailed { .. } => 2,
            CliError::InvocationLimit { .. } => 3,
            CliError::Validation(_) | CliError::InvalidName(_) | CliError::InvalidToken(_) => 4,
            CliError::Config(_) | CliError::Backend(_) | CliError::Io(_) => 1,
        }
    }

    /// Print the error to stderr with appropriate formatting
    pub fn print(&self) {
        let use_color = std::env::var("NO_COLOR").is_err();

        if use_color {
            eprintln!("\x1b[31mError:\x1b[0m {}", self);
        } else {
            eprintln!("Error: {}", self);
        }

        if let Some(suggestion) = self.suggestion() {
            if use_color {
                eprintln!("\n\x1b[33mSuggestion:\x1b[0m {}", suggestion);
            } else {
                eprintln!("\nSuggestion: {}", suggestion);
            }
        }
    }

    fn suggestion(&self) -> Option<&'static str> {
        match self {
            CliError::InvocationLimit { .. } => {
                Some("Re-run with the same --state-file to resume the chain.")
            }
            CliError::ChainFailed {
                kind: ErrorKind::Conflict,
                ..
            } => Some("A stream with this name already exists. Choose another --name."),
            CliError::ChainFailed {
                kind: ErrorKind::Timeout,
                ..
            } => Some("Check the stream with 'conveyor describe' before retrying."),
            CliError::Config(_) => Some("Pass --endpoint or set CONVEYOR_ENDPOINT, or use --simulate."),
            _ => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Validation(format!("JSON error: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let failed = CliError::ChainFailed {
            kind: ErrorKind::NotFound,
            message: "gone".to_string(),
        };
        assert_eq!(failed.exit_code(), 2);
        assert_eq!(CliError::InvocationLimit { max: 10 }.exit_code(), 3);
        assert_eq!(CliError::Validation("bad".to_string()).exit_code(), 4);
        assert_eq!(CliError::InvalidName(NameError::Empty).exit_code(), 4);
        assert_eq!(CliError::Backend(BackendError::network("reset")).exit_code(), 1);
        assert_eq!(CliError::Config("no endpoint".to_string()).exit_code(), 1);
    }

    #[test]
    fn test_display() {
        let failed = CliError::ChainFailed {
            kind: ErrorKind::Conflict,
            message: "resource already exists".to_string(),
        };
        assert_eq!(
            failed.to_string(),
            "Chain failed (Conflict): resource already exists"
        );
        assert!(failed.suggestion().is_some());
    }
}
