//! Configuration management CLI commands.
//!
//! `config get`, `config set`, `config list` and `config path` read and edit
//! `~/.imodel-tiles/config.ini` without touching the network.

use std::path::Path;

use clap::Subcommand;
use imodel_tiles::config::{config_file_path, ConfigFile, ConfigKey};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Get a configuration value
    Get {
        /// Configuration key in format section.key (e.g., imodel.id)
        key: String,
    },

    /// Set a configuration value (empty value unsets it)
    Set {
        /// Configuration key in format section.key (e.g., auth.client_id)
        key: String,

        /// Value to set
        value: String,
    },

    /// List all configuration settings
    List,

    /// Show the configuration file path
    Path,
}

/// Run a config subcommand against the default config file.
pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    run_at(command, &config_file_path()?)
}

fn run_at(command: ConfigCommands, path: &Path) -> Result<(), CliError> {
    match command {
        ConfigCommands::Get { key } => {
            let value = get_value(path, &key)?;
            println!("{}", if value.is_empty() { "(not set)" } else { value.as_str() });
        }
        ConfigCommands::Set { key, value } => {
            let key = set_value(path, &key, &value)?;
            println!("Set {} = {}", key.name(), value);
        }
        ConfigCommands::List => print_list(&ConfigFile::load_from(path)?),
        ConfigCommands::Path => println!("{}", path.display()),
    }
    Ok(())
}

fn parse_key(key: &str) -> Result<ConfigKey, CliError> {
    key.parse().map_err(|_| {
        CliError::Config(format!(
            "Unknown configuration key '{}'. Use 'imodel-tiles config list' to see available keys.",
            key
        ))
    })
}

fn get_value(path: &Path, key: &str) -> Result<String, CliError> {
    let config_key = parse_key(key)?;
    let config = ConfigFile::load_from(path)?;
    Ok(config_key.get(&config))
}

fn set_value(path: &Path, key: &str, value: &str) -> Result<ConfigKey, CliError> {
    let config_key = parse_key(key)?;
    let mut config = ConfigFile::load_from(path)?;
    config_key.set(&mut config, value)?;
    config.save_to(path)?;
    Ok(config_key)
}

fn print_list(config: &ConfigFile) {
    println!("Configuration Settings");
    println!("======================");

    let mut current_section = "";
    for key in ConfigKey::all() {
        let section = key.section();
        if section != current_section {
            println!();
            println!("[{}]", section);
            current_section = section;
        }

        let value = key.get(config);
        if value.is_empty() {
            println!("  {} = (not set)", key.key_name());
        } else if *key == ConfigKey::AuthIonToken {
            println!("  {} = (set)", key.key_name());
        } else {
            println!("  {} = {}", key.key_name(), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_set_then_get() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");

        set_value(&path, "imodel.id", "abc").unwrap();
        set_value(&path, "export.timeout_secs", "120").unwrap();

        assert_eq!(get_value(&path, "imodel.id").unwrap(), "abc");
        assert_eq!(get_value(&path, "export.timeout_secs").unwrap(), "120");
        assert_eq!(get_value(&path, "auth.client_id").unwrap(), "");
    }

    #[test]
    fn test_unknown_key_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");

        let result = get_value(&path, "viewer.theme");
        assert!(matches!(result, Err(CliError::Config(_))));
        assert!(!path.exists());
    }

    #[test]
    fn test_invalid_value_leaves_file_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");
        set_value(&path, "export.timeout_secs", "60").unwrap();

        let result = set_value(&path, "export.timeout_secs", "soon");
        assert!(matches!(result, Err(CliError::Settings(_))));
        assert_eq!(get_value(&path, "export.timeout_secs").unwrap(), "60");
    }
}
