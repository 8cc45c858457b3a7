//! Shared setup for commands that talk to the export service.

use std::future::Future;

use imodel_tiles::config::ConfigFile;
use imodel_tiles::logging::{init_logging, LoggingConfig, LoggingGuard};
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::error::CliError;

/// Loads configuration, installs logging, and owns the async runtime.
///
/// Ctrl+C cancels [`CliRunner::cancel_token`], which every network step
/// observes.
pub struct CliRunner {
    config: ConfigFile,
    runtime: Runtime,
    cancel: CancellationToken,
    logging: LoggingGuard,
}

impl CliRunner {
    pub fn new(verbose: bool) -> Result<Self, CliError> {
        let config = ConfigFile::load()?;

        let logging = init_logging(
            &LoggingConfig::default()
                .with_directory(config.logging.directory.clone())
                .with_verbose(verbose),
        )?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(CliError::Runtime)?;

        let cancel = CancellationToken::new();
        let handler_token = cancel.clone();
        ctrlc::set_handler(move || {
            eprintln!();
            eprintln!("Received interrupt, cancelling...");
            handler_token.cancel();
        })
        .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;

        Ok(Self {
            config,
            runtime,
            cancel,
            logging,
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Runs a future to completion on the runtime.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    pub fn log_startup(&self, command: &str) {
        info!(
            version = imodel_tiles::VERSION,
            command,
            prefix = %self.config.api.prefix,
            file_log = self.logging.has_file(),
            "imodel-tiles starting"
        );
    }
}
