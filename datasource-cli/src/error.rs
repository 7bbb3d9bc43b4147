//! CLI error types and result alias.

use datasource_core::DataSourceError;
use miette::Diagnostic;
use thiserror::Error;

/// Result type alias for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// CLI error types
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// IO error
    #[error("IO error: {0}")]
    #[diagnostic(code(datasource::io))]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    #[diagnostic(code(datasource::config))]
    Config(String),

    /// Invalid command-line argument
    #[error("Invalid argument: {0}")]
    #[diagnostic(code(datasource::argument))]
    Argument(String),

    /// Resolution or pool configuration error
    #[error(transparent)]
    #[diagnostic(code(datasource::resolve))]
    DataSource(#[from] DataSourceError),

    /// Output error
    #[error("Output error: {0}")]
    #[diagnostic(code(datasource::output))]
    Output(String),
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Output(format!("Failed to serialize JSON: {}", err))
    }
}
