//! Configuration error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors loading, saving or resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required setting has no value from any source.
    #[error("missing required setting {name} (set {env_var} or {key})")]
    Missing {
        name: &'static str,
        env_var: &'static str,
        key: &'static str,
    },

    /// A setting has a value that cannot be used.
    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    /// The configuration file could not be parsed.
    #[error("failed to parse {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    /// The configuration file could not be read or written.
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// No home directory to place the configuration file in.
    #[error("cannot determine the home directory")]
    NoHomeDirectory,

    /// The key is not a known `section.key` name.
    #[error("unknown configuration key '{0}'")]
    UnknownKey(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_names_both_sources() {
        let err = ConfigError::Missing {
            name: "iModel id",
            env_var: "IMODEL_ID",
            key: "imodel.id",
        };
        let message = err.to_string();
        assert!(message.contains("IMODEL_ID"));
        assert!(message.contains("imodel.id"));
    }
}
