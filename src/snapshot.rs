//! # Snapshot Operations
//!
//! Builders turning one snapshot config entry into a [`Command`] for the
//! scheduler.
//!
//! Snapshots can be taken from a mirror, from a local repo, or derived from
//! another snapshot through a package query (a filter). Filters are why the
//! scheduler exists at all: a filtered snapshot requires its source snapshot,
//! which may itself be created in the same batch, so batch order cannot
//! simply follow the config file.

use log::debug;

use crate::command::{Command, DepKind};
use crate::config::SnapshotConfig;
use crate::error::Result;
use crate::state::SystemState;

/// Build the `aptly snapshot create`/`filter` command for one config entry.
///
/// Returns `Ok(None)` when the snapshot already exists; snapshots are
/// immutable, so there is nothing to re-do.
pub fn create_command(
    name: &str,
    config: &SnapshotConfig,
    state: &SystemState,
) -> Result<Option<Command>> {
    if state.snapshots.contains(name) {
        debug!("Snapshot already exists, skipping create: {}", name);
        return Ok(None);
    }

    let mut command = match config {
        SnapshotConfig::Mirror { mirror } => {
            let mut command = Command::new(vec![
                "aptly".to_string(),
                "snapshot".to_string(),
                "create".to_string(),
                name.to_string(),
                "from".to_string(),
                "mirror".to_string(),
                mirror.clone(),
            ]);
            command.require(DepKind::Mirror, mirror)?;
            command
        }
        SnapshotConfig::Repo { repo } => Command::new(vec![
            "aptly".to_string(),
            "snapshot".to_string(),
            "create".to_string(),
            name.to_string(),
            "from".to_string(),
            "repo".to_string(),
            repo.clone(),
        ]),
        SnapshotConfig::Filter { filter } => {
            let mut command = Command::new(vec![
                "aptly".to_string(),
                "snapshot".to_string(),
                "filter".to_string(),
                filter.source.clone(),
                name.to_string(),
                filter.query.clone(),
            ]);
            command.require(DepKind::Snapshot, &filter.source)?;
            command
        }
    };

    command.provide(DepKind::Snapshot, name)?;
    Ok(Some(command))
}

/// Build the `aptly snapshot drop` command for one config entry.
///
/// Dropping a snapshot the system does not know is a no-op skip.
pub fn drop_command(name: &str, state: &SystemState) -> Option<Command> {
    if !state.snapshots.contains(name) {
        debug!("Snapshot does not exist, skipping drop: {}", name);
        return None;
    }
    Some(Command::new(vec![
        "aptly".to_string(),
        "snapshot".to_string(),
        "drop".to_string(),
        name.to_string(),
    ]))
}
