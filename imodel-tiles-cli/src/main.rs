//! imodel-tiles CLI - Command-line interface
//!
//! Acquires iModel mesh exports and resolves the 3D Tiles tileset a viewer
//! loads. Settings come from flags, environment variables and
//! `~/.imodel-tiles/config.ini`, in that order.

mod commands;
mod error;
mod runner;

use clap::{Parser, Subcommand};
use console::style;

use commands::acquire::{self, ViewArgs};
use commands::common::{ApiArgs, TargetArgs};
use commands::config::ConfigCommands;
use commands::locate;
use error::CliError;

#[derive(Debug, Parser)]
#[command(
    name = "imodel-tiles",
    version,
    about = "Mesh export acquisition for iModel tile viewers"
)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Find or create a mesh export and print its tileset URL
    Acquire {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Acquire a tileset, load it, and print the view placement
    View {
        #[command(flatten)]
        target: TargetArgs,

        /// Also list every tile content URL
        #[arg(long)]
        list_content: bool,
    },

    /// Look for a usable export without creating one
    Locate {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Show the status of one export
    Status {
        /// Export id
        export_id: String,

        #[command(flatten)]
        api: ApiArgs,
    },

    /// Manage configuration settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();
    let verbose = cli.verbose;

    let result: Result<(), CliError> = match cli.command {
        Commands::Acquire { target } => acquire::run_acquire(target, verbose),
        Commands::View {
            target,
            list_content,
        } => acquire::run_view(
            ViewArgs {
                target,
                list_content,
            },
            verbose,
        ),
        Commands::Locate { target } => locate::run_locate(target, verbose),
        Commands::Status { export_id, api } => locate::run_status(export_id, api, verbose),
        Commands::Config { command } => commands::config::run(command),
    };

    if let Err(e) = result {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(e.exit_code());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use commands::common::VariantArg;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_acquire_with_variant() {
        let cli = Cli::try_parse_from([
            "imodel-tiles",
            "acquire",
            "--variant",
            "cesium",
            "--imodel",
            "abc",
            "--prefix",
            "qa-",
            "--interval",
            "5",
        ])
        .unwrap();

        match cli.command {
            Commands::Acquire { target } => {
                assert_eq!(target.variant, VariantArg::Cesium);
                assert_eq!(target.imodel.as_deref(), Some("abc"));
                assert_eq!(target.api.prefix.as_deref(), Some("qa-"));
                assert_eq!(target.interval, Some(5));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_variant_defaults_to_three_js() {
        let cli = Cli::try_parse_from(["imodel-tiles", "-v", "locate"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Locate { target } => assert_eq!(target.variant, VariantArg::ThreeJs),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_status_and_config() {
        let cli = Cli::try_parse_from(["imodel-tiles", "status", "42", "--token", "t"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Status { ref export_id, .. } if export_id == "42"
        ));

        let cli =
            Cli::try_parse_from(["imodel-tiles", "config", "set", "imodel.id", "abc"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config {
                command: ConfigCommands::Set { .. }
            }
        ));
    }

    #[test]
    fn test_rejects_unknown_variant() {
        let result = Cli::try_parse_from(["imodel-tiles", "acquire", "--variant", "babylon"]);
        assert!(result.is_err());
    }
}
