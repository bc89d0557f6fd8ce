//! CLI argument parsing and command dispatch

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::debug;

use crate::commands;

/// raptly - Automate aptly mirror and snapshot management
#[derive(Parser, Debug)]
#[command(name = "raptly")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// YAML config file defining mirrors and snapshots
    #[arg(
        short,
        long,
        global = true,
        value_name = "FILE",
        default_value = "raptly.yaml",
        env = "RAPTLY_CONFIG"
    )]
    config: PathBuf,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage aptly mirrors
    Mirror(commands::mirror::MirrorArgs),

    /// Manage aptly snapshots
    Snapshot(commands::snapshot::SnapshotArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        let level = if self.debug {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        };
        env_logger::Builder::new()
            .filter_level(level)
            .parse_default_env()
            .init();
        debug!("Args: {:?}", self);

        match self.command {
            Commands::Mirror(args) => commands::mirror::execute(args, &self.config),
            Commands::Snapshot(args) => commands::snapshot::execute(args, &self.config),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}
