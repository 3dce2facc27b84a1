//! Configuration file handling.
//!
//! Settings live in an INI file at `~/.egms/config.ini`. A missing file
//! yields the defaults; a missing key yields that key's default. CLI flags
//! override whatever the file says.
//!
//! ```text
//! [api]
//! base_url = https://egms.land.copernicus.eu/insar-api/archive/download
//! token = fcf61f768a6141ca81d6e4851c86cf89
//! timeout = 3000
//!
//! [batch]
//! delay_ms = 1000
//! year = 2019_2023
//! failure_manifest = false
//!
//! [output]
//! directory = .
//!
//! [logging]
//! directory = ~/.egms/logs
//! ```

mod keys;

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use ini::Ini;
use thiserror::Error;

use crate::address::YearRange;
use crate::batch::DEFAULT_PACING_DELAY;
use crate::fetch::DEFAULT_TIMEOUT_SECS;
use crate::identity::{ArchiveEndpoint, DEFAULT_BASE_URL, DEFAULT_TOKEN};

pub use keys::ConfigKey;

/// Name of the configuration directory under the user's home.
const CONFIG_DIR_NAME: &str = ".egms";

/// Name of the configuration file.
const CONFIG_FILE_NAME: &str = "config.ini";

/// Errors from loading, saving or editing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A value could not be parsed for its key.
    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

/// `[api]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiSettings {
    pub base_url: String,
    pub token: String,
    /// Per-request timeout in seconds.
    pub timeout: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: DEFAULT_TOKEN.to_string(),
            timeout: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// `[batch]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSettings {
    /// Minimum spacing between request starts, in milliseconds.
    pub delay_ms: u64,
    pub year: YearRange,
    /// Add `failed_tiles.csv` to batch containers.
    pub failure_manifest: bool,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            delay_ms: DEFAULT_PACING_DELAY.as_millis() as u64,
            year: YearRange::default(),
            failure_manifest: false,
        }
    }
}

/// `[output]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSettings {
    pub directory: PathBuf,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    pub directory: PathBuf,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            directory: config_dir().join("logs"),
        }
    }
}

/// Parsed configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub api: ApiSettings,
    pub batch: BatchSettings,
    pub output: OutputSettings,
    pub logging: LoggingSettings,
}

impl ConfigFile {
    /// Loads the configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    /// Loads the configuration from `path`, using defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let mut config = Self::default();
        for key in ConfigKey::all() {
            if let Some(value) = ini.get_from(Some(key.section()), key.key_name()) {
                key.set(&mut config, value)?;
            }
        }
        Ok(config)
    }

    /// Saves the configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path())
    }

    /// Saves the configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_error = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_error)?;
        }

        let mut ini = Ini::new();
        for key in ConfigKey::all() {
            ini.with_section(Some(key.section()))
                .set(key.key_name(), key.get(self));
        }
        ini.write_to_file(path).map_err(write_error)
    }

    /// Archive endpoint described by the `[api]` section.
    pub fn endpoint(&self) -> ArchiveEndpoint {
        ArchiveEndpoint::new(&self.api.base_url, &self.api.token)
    }

    pub fn pacing_delay(&self) -> Duration {
        Duration::from_millis(self.batch.delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout)
    }
}

/// Directory holding the configuration file and default log directory.
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
}

/// Default configuration file path.
pub fn config_file_path() -> PathBuf {
    config_dir().join(CONFIG_FILE_NAME)
}

/// Expands a leading `~` to the home directory.
pub(crate) fn expand_tilde(value: &str) -> PathBuf {
    match (value.strip_prefix('~'), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest.trim_start_matches(['/', '\\'])),
        _ => PathBuf::from(value),
    }
}

/// Parses `value` for `key`, mapping failures to [`ConfigError::InvalidValue`].
pub(crate) fn parse_value<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: e.to_string(),
        })
}
