//! CLI error type.

use std::fmt;
use std::path::PathBuf;

use egms::aggregate::AggregateError;
use egms::batch::PlanError;
use egms::config::ConfigError;
use egms::fetch::FetchError;
use egms::logging::LoggingError;

/// Errors surfaced to the user as a one-line message and exit code 1.
#[derive(Debug)]
pub enum CliError {
    /// Bad configuration or argument combination.
    Config(String),
    /// The requested tiles do not form a valid plan.
    Plan(PlanError),
    /// The HTTP client could not be built.
    Client(FetchError),
    Logging(LoggingError),
    /// The batch produced nothing to deliver.
    Aggregate(AggregateError),
    /// The output file could not be written.
    Output {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Plan(e) => write!(f, "Invalid tile selection: {}", e),
            CliError::Client(e) => write!(f, "Failed to create HTTP client: {}", e),
            CliError::Logging(e) => write!(f, "Failed to initialize logging: {}", e),
            CliError::Aggregate(e) => write!(f, "{}", e),
            CliError::Output { path, source } => {
                write!(f, "Failed to write {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(_) => None,
            CliError::Plan(e) => Some(e),
            CliError::Client(e) => Some(e),
            CliError::Logging(e) => Some(e),
            CliError::Aggregate(e) => Some(e),
            CliError::Output { source, .. } => Some(source),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<PlanError> for CliError {
    fn from(e: PlanError) -> Self {
        CliError::Plan(e)
    }
}

impl From<LoggingError> for CliError {
    fn from(e: LoggingError) -> Self {
        CliError::Logging(e)
    }
}

impl From<AggregateError> for CliError {
    fn from(e: AggregateError) -> Self {
        CliError::Aggregate(e)
    }
}
