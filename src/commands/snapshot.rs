//! Snapshot command implementation
//!
//! `raptly snapshot <task> [name]` builds create/drop commands for the
//! configured snapshots. Filtered snapshots depend on their source snapshot,
//! so the batch goes through the scheduler before anything runs; the config
//! file order does not matter.

use std::path::Path;

use anyhow::Result;
use clap::{Args, ValueEnum};
use log::debug;

use raptly::command::Command;
use raptly::config::{self, Config};
use raptly::scheduler;
use raptly::snapshot;
use raptly::state::SystemState;

/// Lifecycle operation to perform on snapshots
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SnapshotTask {
    /// Create snapshots that do not exist yet
    Create,
    /// Drop existing snapshots
    Drop,
}

/// Manage aptly snapshots
#[derive(Args, Debug)]
pub struct SnapshotArgs {
    /// Operation to perform
    #[arg(value_enum)]
    pub task: SnapshotTask,

    /// Snapshot name, or "all" for every configured snapshot
    #[arg(default_value = "all")]
    pub name: String,
}

/// Execute the `snapshot` command.
pub fn execute(args: SnapshotArgs, config_path: &Path) -> Result<()> {
    if !config_path.exists() {
        anyhow::bail!("Configuration file not found: {}", config_path.display());
    }
    let config = config::from_file(config_path)?;
    debug!("Snapshots configured: {:?}", config.snapshot.keys());

    let mut state = SystemState::new();
    state.refresh()?;

    let commands = build_batch(&args, &config, &state)?;
    scheduler::run(commands, &state)?;
    Ok(())
}

fn build_batch(args: &SnapshotArgs, config: &Config, state: &SystemState) -> Result<Vec<Command>> {
    let selected: Vec<(&String, &raptly::config::SnapshotConfig)> = if args.name == "all" {
        config.snapshot.iter().collect()
    } else {
        match config.snapshot.get_key_value(&args.name) {
            Some(entry) => vec![entry],
            None => anyhow::bail!(
                "Requested snapshot is not defined in config file: {}",
                args.name
            ),
        }
    };

    let mut commands = Vec::new();
    for (name, snapshot_config) in selected {
        let command = match args.task {
            SnapshotTask::Create => snapshot::create_command(name, snapshot_config, state)?,
            SnapshotTask::Drop => snapshot::drop_command(name, state),
        };
        if let Some(command) = command {
            commands.push(command);
        }
    }
    Ok(commands)
}
