//! Configuration.
//!
//! Settings come from three layers, highest precedence first:
//!
//! 1. command-line flags ([`SettingsOverrides`])
//! 2. environment variables (`IMS_PREFIX`, `IMODEL_ID`, `CHANGESET_ID`,
//!    `AUTH_CLIENT_ID`, `ION_TOKEN`, `ACCESS_TOKEN`)
//! 3. the INI file at `~/.imodel-tiles/config.ini` ([`ConfigFile`])
//!
//! [`ViewerSettings::resolve`] merges them and rejects missing required
//! values before anything touches the network.
//!
//! # Example
//!
//! ```ignore
//! use imodel_tiles::config::{ConfigFile, SettingsOverrides, ViewerSettings};
//! use imodel_tiles::export::ViewerVariant;
//!
//! let file = ConfigFile::load()?;
//! let settings = ViewerSettings::resolve_from_env(
//!     ViewerVariant::ThreeJs,
//!     &SettingsOverrides::default(),
//!     &file,
//! )?;
//! let request = settings.export_request();
//! ```

mod error;
mod file;
mod keys;
mod settings;

pub use error::ConfigError;
pub use file::{
    config_directory, config_file_path, ApiSection, AuthSection, ConfigFile, ExportSection,
    IModelSection, LoggingSection, CONFIG_DIR_NAME, CONFIG_FILE_NAME,
};
pub use keys::ConfigKey;
pub use settings::{
    ApiSettings, SettingsOverrides, ViewerSettings, ENV_ACCESS_TOKEN, ENV_AUTH_CLIENT_ID,
    ENV_CHANGESET_ID, ENV_IMODEL_ID, ENV_IMS_PREFIX, ENV_ION_TOKEN, MAX_POLL_SECS,
};
