//! Resolved runtime settings.
//!
//! Each value is taken from the first source that provides one:
//! command-line flag, then environment variable, then `config.ini`.
//! Required values are checked here, before any network call.

use std::time::Duration;

use super::error::ConfigError;
use super::file::ConfigFile;
use crate::auth::{AccessToken, AuthConfig};
use crate::export::{ExportRequest, PollConfig, ViewerVariant};

pub const ENV_IMS_PREFIX: &str = "IMS_PREFIX";
pub const ENV_IMODEL_ID: &str = "IMODEL_ID";
pub const ENV_CHANGESET_ID: &str = "CHANGESET_ID";
pub const ENV_AUTH_CLIENT_ID: &str = "AUTH_CLIENT_ID";
pub const ENV_ION_TOKEN: &str = "ION_TOKEN";
pub const ENV_ACCESS_TOKEN: &str = "ACCESS_TOKEN";

/// Longest accepted poll interval or timeout (one day).
pub const MAX_POLL_SECS: u64 = 86_400;

/// Values given explicitly on the command line.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub api_prefix: Option<String>,
    pub imodel_id: Option<String>,
    pub changeset_id: Option<String>,
    pub client_id: Option<String>,
    pub ion_token: Option<String>,
    pub access_token: Option<String>,
    pub poll_interval: Option<Duration>,
    pub timeout: Option<Duration>,
}

/// Settings needed to talk to the export service at all.
#[derive(Debug, Clone)]
pub struct ApiSettings {
    /// Host prefix, empty for production.
    pub api_prefix: String,
    pub access_token: AccessToken,
}

impl ApiSettings {
    pub fn resolve(
        overrides: &SettingsOverrides,
        file: &ConfigFile,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let api_prefix = pick(
            overrides.api_prefix.as_deref(),
            env(ENV_IMS_PREFIX),
            Some(file.api.prefix.as_str()),
        )
        .unwrap_or_default();

        // Tokens are short-lived and never read from the config file.
        let access_token = pick(overrides.access_token.as_deref(), env(ENV_ACCESS_TOKEN), None)
            .map(AccessToken::new)
            .filter(|token| !token.is_empty())
            .ok_or(ConfigError::Missing {
                name: "access token",
                env_var: ENV_ACCESS_TOKEN,
                key: "--token",
            })?;

        Ok(Self {
            api_prefix,
            access_token,
        })
    }

    pub fn resolve_from_env(
        overrides: &SettingsOverrides,
        file: &ConfigFile,
    ) -> Result<Self, ConfigError> {
        Self::resolve(overrides, file, |name| std::env::var(name).ok())
    }
}

/// Everything one acquisition for one viewer variant needs.
#[derive(Debug, Clone)]
pub struct ViewerSettings {
    pub variant: ViewerVariant,
    pub api: ApiSettings,
    pub imodel_id: String,
    pub changeset_id: Option<String>,
    pub auth: AuthConfig,
    pub ion_token: Option<String>,
    pub poll: PollConfig,
}

impl ViewerSettings {
    /// Resolves and validates settings for `variant`.
    ///
    /// `env` looks up environment variables; tests pass a map instead of
    /// touching the process environment.
    pub fn resolve(
        variant: ViewerVariant,
        overrides: &SettingsOverrides,
        file: &ConfigFile,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let imodel_id = pick(
            overrides.imodel_id.as_deref(),
            env(ENV_IMODEL_ID),
            file.imodel.id.as_deref(),
        )
        .ok_or(ConfigError::Missing {
            name: "iModel id",
            env_var: ENV_IMODEL_ID,
            key: "imodel.id",
        })?;

        let client_id = pick(
            overrides.client_id.as_deref(),
            env(ENV_AUTH_CLIENT_ID),
            file.auth.client_id.as_deref(),
        )
        .ok_or(ConfigError::Missing {
            name: "OAuth client id",
            env_var: ENV_AUTH_CLIENT_ID,
            key: "auth.client_id",
        })?;

        let ion_token = pick(
            overrides.ion_token.as_deref(),
            env(ENV_ION_TOKEN),
            file.auth.ion_token.as_deref(),
        );
        if variant.requires_ion_token() && ion_token.is_none() {
            return Err(ConfigError::Missing {
                name: "Cesium Ion token",
                env_var: ENV_ION_TOKEN,
                key: "auth.ion_token",
            });
        }

        let changeset_id = pick(
            overrides.changeset_id.as_deref(),
            env(ENV_CHANGESET_ID),
            file.imodel.changeset_id.as_deref(),
        );

        let api = ApiSettings::resolve(overrides, file, &env)?;
        let poll = resolve_poll(variant, overrides, file)?;

        Ok(Self {
            variant,
            auth: AuthConfig::new(&api.api_prefix, client_id),
            api,
            imodel_id,
            changeset_id,
            ion_token,
            poll,
        })
    }

    pub fn resolve_from_env(
        variant: ViewerVariant,
        overrides: &SettingsOverrides,
        file: &ConfigFile,
    ) -> Result<Self, ConfigError> {
        Self::resolve(variant, overrides, file, |name| std::env::var(name).ok())
    }

    /// The export this variant asks for.
    pub fn export_request(&self) -> ExportRequest {
        let request = ExportRequest::new(self.imodel_id.clone(), self.variant.export_type());
        match &self.changeset_id {
            Some(changeset) => request.with_changeset(changeset.clone()),
            None => request,
        }
    }
}

fn resolve_poll(
    variant: ViewerVariant,
    overrides: &SettingsOverrides,
    file: &ConfigFile,
) -> Result<PollConfig, ConfigError> {
    let interval = overrides
        .poll_interval
        .or_else(|| file.export.poll_interval_secs.map(Duration::from_secs))
        .unwrap_or_else(|| variant.default_poll_interval());
    let timeout = overrides
        .timeout
        .unwrap_or_else(|| Duration::from_secs(file.export.timeout_secs));

    for (key, value) in [
        ("export.poll_interval_secs", interval),
        ("export.timeout_secs", timeout),
    ] {
        let reason = if value.is_zero() {
            "must be greater than zero".to_string()
        } else if value > Duration::from_secs(MAX_POLL_SECS) {
            format!("must be at most {} seconds", MAX_POLL_SECS)
        } else {
            continue;
        };
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.as_secs().to_string(),
            reason,
        });
    }

    Ok(PollConfig::new(interval).with_timeout(timeout))
}

/// First non-blank value in precedence order, trimmed.
fn pick(cli: Option<&str>, env: Option<String>, file: Option<&str>) -> Option<String> {
    [cli.map(str::to_string), env, file.map(str::to_string)]
        .into_iter()
        .flatten()
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::ExportType;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    fn base_env() -> Vec<(&'static str, &'static str)> {
        vec![
            (ENV_IMODEL_ID, "abc"),
            (ENV_AUTH_CLIENT_ID, "spa-client"),
            (ENV_ACCESS_TOKEN, "Bearer tkn"),
        ]
    }

    #[test]
    fn test_resolves_three_js_from_env() {
        let settings = ViewerSettings::resolve(
            ViewerVariant::ThreeJs,
            &SettingsOverrides::default(),
            &ConfigFile::default(),
            env_of(&base_env()),
        )
        .unwrap();

        assert_eq!(settings.imodel_id, "abc");
        assert_eq!(settings.changeset_id, None);
        assert_eq!(settings.api.api_prefix, "");
        assert_eq!(settings.auth.authority, "https://ims.bentley.com");
        assert_eq!(settings.poll.interval, Duration::from_secs(3));
        assert_eq!(settings.poll.timeout, Duration::from_secs(300));
        assert_eq!(settings.api.access_token.header_value(), "Bearer tkn");
    }

    #[test]
    fn test_flag_beats_env_beats_file() {
        let mut file = ConfigFile::default();
        file.imodel.id = Some("from-file".to_string());
        file.api.prefix = "dev-".to_string();
        file.imodel.changeset_id = Some("cs-file".to_string());

        let mut env = base_env();
        env.push((ENV_IMS_PREFIX, "qa-"));
        let overrides = SettingsOverrides {
            imodel_id: Some("from-flag".to_string()),
            ..Default::default()
        };

        let settings =
            ViewerSettings::resolve(ViewerVariant::ThreeJs, &overrides, &file, env_of(&env))
                .unwrap();

        assert_eq!(settings.imodel_id, "from-flag");
        assert_eq!(settings.api.api_prefix, "qa-");
        assert_eq!(settings.auth.authority, "https://qa-ims.bentley.com");
        assert_eq!(settings.changeset_id.as_deref(), Some("cs-file"));
    }

    #[test]
    fn test_missing_imodel_fails_fast() {
        let result = ViewerSettings::resolve(
            ViewerVariant::ThreeJs,
            &SettingsOverrides::default(),
            &ConfigFile::default(),
            env_of(&[(ENV_AUTH_CLIENT_ID, "spa"), (ENV_ACCESS_TOKEN, "t")]),
        );

        assert!(matches!(
            result,
            Err(ConfigError::Missing {
                env_var: ENV_IMODEL_ID,
                ..
            })
        ));
    }

    #[test]
    fn test_blank_value_counts_as_missing() {
        let result = ViewerSettings::resolve(
            ViewerVariant::ThreeJs,
            &SettingsOverrides::default(),
            &ConfigFile::default(),
            env_of(&[
                (ENV_IMODEL_ID, "abc"),
                (ENV_AUTH_CLIENT_ID, "   "),
                (ENV_ACCESS_TOKEN, "t"),
            ]),
        );

        assert!(matches!(
            result,
            Err(ConfigError::Missing {
                env_var: ENV_AUTH_CLIENT_ID,
                ..
            })
        ));
    }

    #[test]
    fn test_cesium_requires_ion_token() {
        let result = ViewerSettings::resolve(
            ViewerVariant::Cesium,
            &SettingsOverrides::default(),
            &ConfigFile::default(),
            env_of(&base_env()),
        );
        assert!(matches!(
            result,
            Err(ConfigError::Missing {
                env_var: ENV_ION_TOKEN,
                ..
            })
        ));

        let mut env = base_env();
        env.push((ENV_ION_TOKEN, "ion"));
        let settings = ViewerSettings::resolve(
            ViewerVariant::Cesium,
            &SettingsOverrides::default(),
            &ConfigFile::default(),
            env_of(&env),
        )
        .unwrap();
        assert_eq!(settings.ion_token.as_deref(), Some("ion"));
        assert_eq!(settings.poll.interval, Duration::from_secs(5));
    }

    #[test]
    fn test_missing_access_token() {
        let result = ApiSettings::resolve(
            &SettingsOverrides::default(),
            &ConfigFile::default(),
            env_of(&[(ENV_ACCESS_TOKEN, "Bearer ")]),
        );
        assert!(matches!(
            result,
            Err(ConfigError::Missing {
                env_var: ENV_ACCESS_TOKEN,
                ..
            })
        ));
    }

    #[test]
    fn test_poll_settings_from_file_and_flags() {
        let mut file = ConfigFile::default();
        file.export.poll_interval_secs = Some(7);
        file.export.timeout_secs = 60;

        let settings = ViewerSettings::resolve(
            ViewerVariant::ThreeJs,
            &SettingsOverrides::default(),
            &file,
            env_of(&base_env()),
        )
        .unwrap();
        assert_eq!(settings.poll.interval, Duration::from_secs(7));
        assert_eq!(settings.poll.timeout, Duration::from_secs(60));

        let overrides = SettingsOverrides {
            poll_interval: Some(Duration::ZERO),
            ..Default::default()
        };
        let result =
            ViewerSettings::resolve(ViewerVariant::ThreeJs, &overrides, &file, env_of(&base_env()));
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_oversized_timeout_is_rejected() {
        let mut file = ConfigFile::default();
        file.export.timeout_secs = u64::MAX;

        let result = ViewerSettings::resolve(
            ViewerVariant::ThreeJs,
            &SettingsOverrides::default(),
            &file,
            env_of(&base_env()),
        );
        match result {
            Err(ConfigError::InvalidValue { key, value, .. }) => {
                assert_eq!(key, "export.timeout_secs");
                assert_eq!(value, u64::MAX.to_string());
            }
            other => panic!("Expected InvalidValue, got {:?}", other),
        }

        let overrides = SettingsOverrides {
            poll_interval: Some(Duration::from_secs(MAX_POLL_SECS + 1)),
            ..Default::default()
        };
        let result = ViewerSettings::resolve(
            ViewerVariant::ThreeJs,
            &overrides,
            &ConfigFile::default(),
            env_of(&base_env()),
        );
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { ref key, .. }) if key == "export.poll_interval_secs"
        ));

        file.export.timeout_secs = MAX_POLL_SECS;
        let settings = ViewerSettings::resolve(
            ViewerVariant::ThreeJs,
            &SettingsOverrides::default(),
            &file,
            env_of(&base_env()),
        )
        .unwrap();
        assert_eq!(settings.poll.timeout, Duration::from_secs(MAX_POLL_SECS));
    }

    #[test]
    fn test_export_request_carries_changeset() {
        let mut env = base_env();
        env.push((ENV_CHANGESET_ID, "cs1"));
        let settings = ViewerSettings::resolve(
            ViewerVariant::ThreeJs,
            &SettingsOverrides::default(),
            &ConfigFile::default(),
            env_of(&env),
        )
        .unwrap();

        let request = settings.export_request();
        assert_eq!(request.imodel_id, "abc");
        assert_eq!(request.changeset(), Some("cs1"));
        assert_eq!(request.export_type, ExportType::ThreeDTiles);
    }
}
