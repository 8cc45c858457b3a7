//! INI configuration file.
//!
//! Lives at `~/.imodel-tiles/config.ini`:
//!
//! ```ini
//! [api]
//! prefix = qa-
//!
//! [imodel]
//! id = 5e8a...
//! changeset_id =
//!
//! [auth]
//! client_id = spa-abc123
//! ion_token =
//!
//! [export]
//! poll_interval_secs =
//! timeout_secs = 300
//!
//! [logging]
//! directory = /home/user/.imodel-tiles/logs
//! ```
//!
//! Empty values are treated as unset.

use std::path::{Path, PathBuf};

use ini::Ini;

use super::error::ConfigError;
use crate::export::DEFAULT_POLL_TIMEOUT;

/// Directory under the home directory holding config and logs.
pub const CONFIG_DIR_NAME: &str = ".imodel-tiles";

/// Name of the configuration file.
pub const CONFIG_FILE_NAME: &str = "config.ini";

/// `[api]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiSection {
    /// Host prefix: empty for production, `qa-` or `dev-` otherwise.
    pub prefix: String,
}

/// `[imodel]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IModelSection {
    pub id: Option<String>,
    pub changeset_id: Option<String>,
}

/// `[auth]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthSection {
    pub client_id: Option<String>,
    pub ion_token: Option<String>,
}

/// `[export]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSection {
    /// Unset means the viewer variant's default.
    pub poll_interval_secs: Option<u64>,
    pub timeout_secs: u64,
}

impl Default for ExportSection {
    fn default() -> Self {
        Self {
            poll_interval_secs: None,
            timeout_secs: DEFAULT_POLL_TIMEOUT.as_secs(),
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoggingSection {
    /// Directory for rolling log files; unset disables file logging.
    pub directory: Option<PathBuf>,
}

/// Parsed configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub api: ApiSection,
    pub imodel: IModelSection,
    pub auth: AuthSection,
    pub export: ExportSection,
    pub logging: LoggingSection,
}

/// Directory holding the configuration file.
pub fn config_directory() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|home| home.join(CONFIG_DIR_NAME))
        .ok_or(ConfigError::NoHomeDirectory)
}

/// Path of the configuration file.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    config_directory().map(|dir| dir.join(CONFIG_FILE_NAME))
}

impl ConfigFile {
    /// Loads the configuration file, or defaults if it does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path()?)
    }

    /// Loads from an explicit path, or defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_ini(&ini, path)
    }

    /// Saves to the default location, creating the directory.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path()?)
    }

    /// Saves to an explicit path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        self.to_ini()
            .write_to_file(path)
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
    }

    fn from_ini(ini: &Ini, path: &Path) -> Result<Self, ConfigError> {
        let get = |section: &str, key: &str| -> Option<String> {
            ini.section(Some(section))
                .and_then(|s| s.get(key))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let get_u64 = |section: &str, key: &str| -> Result<Option<u64>, ConfigError> {
            get(section, key)
                .map(|v| {
                    v.parse::<u64>().map_err(|e| ConfigError::Parse {
                        path: path.to_path_buf(),
                        reason: format!("{}.{} = '{}': {}", section, key, v, e),
                    })
                })
                .transpose()
        };

        let defaults = ExportSection::default();
        Ok(Self {
            api: ApiSection {
                prefix: get("api", "prefix").unwrap_or_default(),
            },
            imodel: IModelSection {
                id: get("imodel", "id"),
                changeset_id: get("imodel", "changeset_id"),
            },
            auth: AuthSection {
                client_id: get("auth", "client_id"),
                ion_token: get("auth", "ion_token"),
            },
            export: ExportSection {
                poll_interval_secs: get_u64("export", "poll_interval_secs")?,
                timeout_secs: get_u64("export", "timeout_secs")?.unwrap_or(defaults.timeout_secs),
            },
            logging: LoggingSection {
                directory: get("logging", "directory").map(PathBuf::from),
            },
        })
    }

    fn to_ini(&self) -> Ini {
        let opt = |v: &Option<String>| v.clone().unwrap_or_default();

        let mut ini = Ini::new();
        ini.with_section(Some("api"))
            .set("prefix", self.api.prefix.as_str());
        ini.with_section(Some("imodel"))
            .set("id", opt(&self.imodel.id))
            .set("changeset_id", opt(&self.imodel.changeset_id));
        ini.with_section(Some("auth"))
            .set("client_id", opt(&self.auth.client_id))
            .set("ion_token", opt(&self.auth.ion_token));
        ini.with_section(Some("export"))
            .set(
                "poll_interval_secs",
                self.export
                    .poll_interval_secs
                    .map(|v| v.to_string())
                    .unwrap_or_default(),
            )
            .set("timeout_secs", self.export.timeout_secs.to_string());
        ini.with_section(Some("logging")).set(
            "directory",
            self.logging
                .directory
                .as_ref()
                .map(|d| d.to_string_lossy().to_string())
                .unwrap_or_default(),
        );
        ini
    }
}
