//! Binary entry point for kinfile.
//!
//! Runs one export, import or mode action against a JSON world file.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow needless_pass_by_value for command functions
#![allow(clippy::needless_pass_by_value)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

mod commands;

use clap::{Parser, Subcommand};
use kinfile::config::KinfileConfig;
use kinfile::observability;
use kinfile::{Action, EntityId};
use std::path::PathBuf;
use std::process::ExitCode;

/// Kinfile - keeps editable birthday, lineage and trait records for a family.
#[derive(Parser)]
#[command(name = "kinfile")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Override the data directory.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// World file (JSON) holding the characters.
    #[arg(short, long, global = true, env = "KINFILE_WORLD")]
    world: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Write records for the current character, or its family.
    Export {
        /// Character id (defaults to the tracked character).
        #[arg(short, long)]
        entity: Option<String>,
    },

    /// Apply records to the current character, or its family.
    Import {
        /// Character id (defaults to the tracked character).
        #[arg(short, long)]
        entity: Option<String>,

        /// Re-derive body properties from the imported birthday.
        #[arg(long)]
        refresh_appearance: bool,
    },

    /// Switch between single and family mode.
    Toggle {
        /// Character id named in the confirmation.
        #[arg(short, long)]
        entity: Option<String>,
    },

    /// Show the current mode.
    Mode,

    /// List a character's family closure.
    Closure {
        /// Character id (defaults to the tracked character).
        #[arg(short, long)]
        entity: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref(), cli.data_dir.clone()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        },
    };

    if let Err(e) = observability::init(&config.logging_config(cli.verbose)) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    let result = run_command(cli, &config);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        },
    }
}

/// Runs the selected command.
fn run_command(cli: Cli, config: &KinfileConfig) -> Result<(), Box<dyn std::error::Error>> {
    let world = cli.world;
    match cli.command {
        Commands::Export { entity } => {
            commands::cmd_action(config, require_world(world)?, Action::Export, entity_id(entity))
        },

        Commands::Import {
            entity,
            refresh_appearance,
        } => commands::cmd_action(
            config,
            require_world(world)?,
            Action::Import { refresh_appearance },
            entity_id(entity),
        ),

        Commands::Toggle { entity } => commands::cmd_action(
            config,
            require_world(world)?,
            Action::ToggleMode,
            entity_id(entity),
        ),

        Commands::Mode => commands::cmd_mode(config),

        Commands::Closure { entity } => {
            commands::cmd_closure(require_world(world)?, entity_id(entity))
        },
    }
}

/// Loads configuration.
fn load_config(
    path: Option<&str>,
    data_dir: Option<PathBuf>,
) -> Result<KinfileConfig, Box<dyn std::error::Error>> {
    // If a path is provided, load from that file
    let config = if let Some(config_path) = path {
        KinfileConfig::load_from_file(std::path::Path::new(config_path))?
    } else {
        match std::env::var("KINFILE_CONFIG_PATH") {
            // Environment override for config path
            Ok(config_path) if !config_path.trim().is_empty() => {
                KinfileConfig::load_from_file(std::path::Path::new(&config_path))?
            },
            _ => KinfileConfig::load_default(),
        }
    };

    Ok(match data_dir {
        Some(dir) => config.with_data_dir(dir),
        None => config,
    })
}

fn require_world(world: Option<PathBuf>) -> Result<PathBuf, Box<dyn std::error::Error>> {
    world.ok_or_else(|| "--world <FILE> is required for this command".into())
}

fn entity_id(entity: Option<String>) -> Option<EntityId> {
    entity
        .filter(|id| !id.trim().is_empty())
        .map(EntityId::new)
}
