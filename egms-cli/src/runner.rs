//! Shared command setup: configuration, logging and the archive client.

use egms::config::ConfigFile;
use egms::fetch::{ReqwestClient, TileFetcher};
use egms::logging::LogGuard;
use tracing::info;

use crate::error::CliError;

/// Loaded configuration plus the logging guard for one command run.
pub struct CliRunner {
    config: ConfigFile,
    _log_guard: LogGuard,
}

impl CliRunner {
    /// Loads the config file and installs logging.
    pub fn new(verbose: bool) -> Result<Self, CliError> {
        let config = ConfigFile::load()?;
        let log_guard = egms::logging::init_logging(&config.logging.directory, verbose)?;
        Ok(Self {
            config,
            _log_guard: log_guard,
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Records the command and effective settings in the log.
    pub fn log_startup(&self, command: &str) {
        info!(
            version = egms::VERSION,
            command,
            base_url = %self.config.api.base_url,
            timeout_secs = self.config.api.timeout,
            "EGMS fetch starting"
        );
    }

    /// Builds a fetcher using the configured request timeout.
    pub fn create_fetcher(&self) -> Result<TileFetcher<ReqwestClient>, CliError> {
        let client = ReqwestClient::with_timeout(self.config.timeout()).map_err(CliError::Client)?;
        Ok(TileFetcher::new(client))
    }
}
