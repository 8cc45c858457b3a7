//! CLI error type.

use imodel_tiles::auth::AuthError;
use imodel_tiles::config::ConfigError;
use imodel_tiles::export::{AcquireError, ExportError};
use imodel_tiles::http::HttpError;
use imodel_tiles::logging::LoggingError;
use imodel_tiles::viewer::ViewerError;
use thiserror::Error;

/// Errors surfaced to the user by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Settings(#[from] ConfigError),

    #[error("Failed to initialize logging: {0}")]
    Logging(#[from] LoggingError),

    #[error("Failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("HTTP client error: {0}")]
    Http(#[from] HttpError),

    #[error("Export failed: {0}")]
    Export(ExportError),

    #[error("Acquisition failed: {0}")]
    Acquire(AcquireError),

    #[error("Viewer failed: {0}")]
    Viewer(#[from] ViewerError),

    #[error("Cancelled")]
    Cancelled,
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Cancelled => 130,
            CliError::Config(_) | CliError::Settings(_) => 2,
            _ => 1,
        }
    }
}

impl From<ExportError> for CliError {
    fn from(e: ExportError) -> Self {
        match e {
            ExportError::Cancelled => CliError::Cancelled,
            other => CliError::Export(other),
        }
    }
}

impl From<AcquireError> for CliError {
    fn from(e: AcquireError) -> Self {
        match e {
            AcquireError::Export(ExportError::Cancelled) => CliError::Cancelled,
            other => CliError::Acquire(other),
        }
    }
}
