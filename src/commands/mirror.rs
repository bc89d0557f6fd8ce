//! Mirror command implementation
//!
//! `raptly mirror <task> [name]` builds create/update/drop commands for the
//! configured mirrors (all of them, or a single named one), resolves them
//! into a safe order and executes the batch sequentially.

use std::path::Path;

use anyhow::Result;
use clap::{Args, ValueEnum};
use log::debug;

use raptly::command::Command;
use raptly::config::{self, Config};
use raptly::mirror;
use raptly::scheduler;
use raptly::state::SystemState;

/// Lifecycle operation to perform on mirrors
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum MirrorTask {
    /// Create mirrors that do not exist yet
    Create,
    /// Update existing (or just-created) mirrors
    Update,
    /// Drop existing mirrors
    Drop,
}

/// Manage aptly mirrors
#[derive(Args, Debug)]
pub struct MirrorArgs {
    /// Operation to perform
    #[arg(value_enum)]
    pub task: MirrorTask,

    /// Mirror name, or "all" for every configured mirror
    #[arg(default_value = "all")]
    pub name: String,
}

/// Execute the `mirror` command.
pub fn execute(args: MirrorArgs, config_path: &Path) -> Result<()> {
    if !config_path.exists() {
        anyhow::bail!("Configuration file not found: {}", config_path.display());
    }
    let config = config::from_file(config_path)?;
    debug!("Mirrors configured: {:?}", config.mirror.keys());

    let mut state = SystemState::new();
    state.refresh()?;

    let commands = build_batch(&args, &config, &state)?;
    scheduler::run(commands, &state)?;
    Ok(())
}

fn build_batch(args: &MirrorArgs, config: &Config, state: &SystemState) -> Result<Vec<Command>> {
    let selected: Vec<(&String, &raptly::config::MirrorConfig)> = if args.name == "all" {
        config.mirror.iter().collect()
    } else {
        match config.mirror.get_key_value(&args.name) {
            Some(entry) => vec![entry],
            None => anyhow::bail!(
                "Requested mirror is not defined in config file: {}",
                args.name
            ),
        }
    };

    let mut commands = Vec::new();
    for (name, mirror_config) in selected {
        let command = match args.task {
            MirrorTask::Create => mirror::create_command(name, mirror_config, state)?,
            MirrorTask::Update => mirror::update_command(name, mirror_config, state)?,
            MirrorTask::Drop => mirror::drop_command(name, state),
        };
        if let Some(command) = command {
            commands.push(command);
        }
    }
    Ok(commands)
}
