//! Configuration keys addressable as `section.key`.

use std::path::PathBuf;
use std::str::FromStr;

use super::error::ConfigError;
use super::file::ConfigFile;
use super::settings::MAX_POLL_SECS;

/// A single configuration setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    ApiPrefix,
    IModelId,
    IModelChangesetId,
    AuthClientId,
    AuthIonToken,
    ExportPollIntervalSecs,
    ExportTimeoutSecs,
    LoggingDirectory,
}

const ALL_KEYS: [ConfigKey; 8] = [
    ConfigKey::ApiPrefix,
    ConfigKey::IModelId,
    ConfigKey::IModelChangesetId,
    ConfigKey::AuthClientId,
    ConfigKey::AuthIonToken,
    ConfigKey::ExportPollIntervalSecs,
    ConfigKey::ExportTimeoutSecs,
    ConfigKey::LoggingDirectory,
];

impl ConfigKey {
    /// All keys in file order.
    pub fn all() -> &'static [ConfigKey] {
        &ALL_KEYS
    }

    pub fn section(&self) -> &'static str {
        match self {
            ConfigKey::ApiPrefix => "api",
            ConfigKey::IModelId | ConfigKey::IModelChangesetId => "imodel",
            ConfigKey::AuthClientId | ConfigKey::AuthIonToken => "auth",
            ConfigKey::ExportPollIntervalSecs | ConfigKey::ExportTimeoutSecs => "export",
            ConfigKey::LoggingDirectory => "logging",
        }
    }

    pub fn key_name(&self) -> &'static str {
        match self {
            ConfigKey::ApiPrefix => "prefix",
            ConfigKey::IModelId => "id",
            ConfigKey::IModelChangesetId => "changeset_id",
            ConfigKey::AuthClientId => "client_id",
            ConfigKey::AuthIonToken => "ion_token",
            ConfigKey::ExportPollIntervalSecs => "poll_interval_secs",
            ConfigKey::ExportTimeoutSecs => "timeout_secs",
            ConfigKey::LoggingDirectory => "directory",
        }
    }

    /// Full `section.key` name.
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// Current value as text; empty when unset.
    pub fn get(&self, config: &ConfigFile) -> String {
        let opt = |v: &Option<String>| v.clone().unwrap_or_default();
        match self {
            ConfigKey::ApiPrefix => config.api.prefix.clone(),
            ConfigKey::IModelId => opt(&config.imodel.id),
            ConfigKey::IModelChangesetId => opt(&config.imodel.changeset_id),
            ConfigKey::AuthClientId => opt(&config.auth.client_id),
            ConfigKey::AuthIonToken => opt(&config.auth.ion_token),
            ConfigKey::ExportPollIntervalSecs => config
                .export
                .poll_interval_secs
                .map(|v| v.to_string())
                .unwrap_or_default(),
            ConfigKey::ExportTimeoutSecs => config.export.timeout_secs.to_string(),
            ConfigKey::LoggingDirectory => config
                .logging
                .directory
                .as_ref()
                .map(|d| d.to_string_lossy().to_string())
                .unwrap_or_default(),
        }
    }

    /// Sets a value from text; an empty value unsets optional keys.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        let opt = || (!value.is_empty()).then(|| value.to_string());

        match self {
            ConfigKey::ApiPrefix => config.api.prefix = value.to_string(),
            ConfigKey::IModelId => config.imodel.id = opt(),
            ConfigKey::IModelChangesetId => config.imodel.changeset_id = opt(),
            ConfigKey::AuthClientId => config.auth.client_id = opt(),
            ConfigKey::AuthIonToken => config.auth.ion_token = opt(),
            ConfigKey::ExportPollIntervalSecs => {
                config.export.poll_interval_secs = if value.is_empty() {
                    None
                } else {
                    Some(self.parse_secs(value)?)
                };
            }
            ConfigKey::ExportTimeoutSecs => config.export.timeout_secs = self.parse_secs(value)?,
            ConfigKey::LoggingDirectory => config.logging.directory = opt().map(PathBuf::from),
        }
        Ok(())
    }

    fn parse_secs(&self, value: &str) -> Result<u64, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidValue {
            key: self.name(),
            value: value.to_string(),
            reason,
        };
        let secs = value.parse::<u64>().map_err(|e| invalid(e.to_string()))?;
        if secs == 0 {
            return Err(invalid("must be at least 1 second".to_string()));
        }
        if secs > MAX_POLL_SECS {
            return Err(invalid(format!("must be at most {} seconds", MAX_POLL_SECS)));
        }
        Ok(secs)
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
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}
