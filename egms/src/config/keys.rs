//! Addressable configuration keys for `config get/set/list`.

use std::fmt;
use std::str::FromStr;

use super::{expand_tilde, parse_value, ConfigError, ConfigFile};

/// A single `section.key` setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    ApiBaseUrl,
    ApiToken,
    ApiTimeout,
    BatchDelayMs,
    BatchYear,
    BatchFailureManifest,
    OutputDirectory,
    LoggingDirectory,
}

impl ConfigKey {
    /// All keys, grouped by section in file order.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::ApiBaseUrl,
            ConfigKey::ApiToken,
            ConfigKey::ApiTimeout,
            ConfigKey::BatchDelayMs,
            ConfigKey::BatchYear,
            ConfigKey::BatchFailureManifest,
            ConfigKey::OutputDirectory,
            ConfigKey::LoggingDirectory,
        ]
    }

    /// Full `section.key` name.
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    pub fn section(&self) -> &'static str {
        match self {
            ConfigKey::ApiBaseUrl | ConfigKey::ApiToken | ConfigKey::ApiTimeout => "api",
            ConfigKey::BatchDelayMs | ConfigKey::BatchYear | ConfigKey::BatchFailureManifest => {
                "batch"
            }
            ConfigKey::OutputDirectory => "output",
            ConfigKey::LoggingDirectory => "logging",
        }
    }

    pub fn key_name(&self) -> &'static str {
        match self {
            ConfigKey::ApiBaseUrl => "base_url",
            ConfigKey::ApiToken => "token",
            ConfigKey::ApiTimeout => "timeout",
            ConfigKey::BatchDelayMs => "delay_ms",
            ConfigKey::BatchYear => "year",
            ConfigKey::BatchFailureManifest => "failure_manifest",
            ConfigKey::OutputDirectory | ConfigKey::LoggingDirectory => "directory",
        }
    }

    /// Current value rendered as it would appear in the file.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::ApiBaseUrl => config.api.base_url.clone(),
            ConfigKey::ApiToken => config.api.token.clone(),
            ConfigKey::ApiTimeout => config.api.timeout.to_string(),
            ConfigKey::BatchDelayMs => config.batch.delay_ms.to_string(),
            ConfigKey::BatchYear => config.batch.year.to_string(),
            ConfigKey::BatchFailureManifest => config.batch.failure_manifest.to_string(),
            ConfigKey::OutputDirectory => config.output.directory.display().to_string(),
            ConfigKey::LoggingDirectory => config.logging.directory.display().to_string(),
        }
    }

    /// Parses `value` and stores it in `config`.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        let name = self.name();
        match self {
            ConfigKey::ApiBaseUrl => {
                config.api.base_url = non_empty(&name, value)?.trim_end_matches('/').to_string()
            }
            ConfigKey::ApiToken => config.api.token = non_empty(&name, value)?.to_string(),
            ConfigKey::ApiTimeout => {
                let timeout: u64 = parse_value(&name, value)?;
                if timeout == 0 {
                    return Err(invalid(&name, value, "timeout must be at least 1 second"));
                }
                config.api.timeout = timeout;
            }
            ConfigKey::BatchDelayMs => config.batch.delay_ms = parse_value(&name, value)?,
            ConfigKey::BatchYear => config.batch.year = parse_value(&name, value)?,
            ConfigKey::BatchFailureManifest => {
                config.batch.failure_manifest = parse_value(&name, value)?
            }
            ConfigKey::OutputDirectory => {
                config.output.directory = expand_tilde(non_empty(&name, value)?)
            }
            ConfigKey::LoggingDirectory => {
                config.logging.directory = expand_tilde(non_empty(&name, value)?)
            }
        }
        Ok(())
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.section(), self.key_name())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ConfigKey::all()
            .iter()
            .copied()
            .find(|key| key.name() == wanted)
            .ok_or_else(|| invalid("key", s, "unknown configuration key"))
    }
}

fn non_empty<'a>(key: &str, value: &'a str) -> Result<&'a str, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(invalid(key, value, "value must not be empty"))
    } else {
        Ok(trimmed)
    }
}

fn invalid(key: &str, value: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
