//! # Fixed-Point Command Scheduler
//!
//! This is the heart of raptly. Configured operations arrive as an unordered
//! batch of [`Command`]s whose provides/requires sets span a capability
//! namespace (see [`crate::command`]); this module computes a safe total
//! execution order by combining those declarations with the pre-batch
//! [`DependencyOracle`].
//!
//! ## Algorithm
//!
//! Resolution is a fixed-point iteration of full scans over the unscheduled
//! commands, always in original input order:
//!
//! 1. A command is eligible when every tag it requires is either already in
//!    the satisfied set or answered `true` by the oracle.
//! 2. Eligible commands are appended to the schedule in scan order and their
//!    provides merge into the satisfied set *immediately*, so a command can
//!    depend on one scheduled earlier in the very same pass.
//! 3. A pass that schedules nothing while commands remain means a dependency
//!    cycle or an unsatisfiable requirement; resolution fails with the
//!    leftover commands and their unsatisfied tags.
//!
//! The number of passes is bounded by the longest dependency chain, so the
//! cost is O(passes x commands x requirements) — fine for the tens to low
//! hundreds of commands a config file produces. Scanning in input order
//! keeps the output deterministic for identical input, which matters for
//! reproducible logs.
//!
//! Scheduling is pure: no external invocation happens until [`run`] walks
//! the resolved order, strictly sequentially. aptly's behavior under
//! concurrent mutation is not guaranteed safe, so there is no parallelism
//! even where the dependency graph would allow it.

use std::collections::BTreeSet;

use log::{debug, info};

use crate::command::{Command, Dependency};
use crate::error::{Error, Result};
use crate::state::DependencyOracle;

/// Compute a safe execution order for `commands`.
///
/// On success the returned vector is a permutation of the input: every
/// command appears exactly once, and each command's requirements are
/// satisfied by the provides of commands before it or by the oracle. On
/// failure nothing has been executed and the error enumerates the commands
/// that could not be placed.
pub fn order(commands: Vec<Command>, oracle: &dyn DependencyOracle) -> Result<Vec<Command>> {
    debug!(
        "Ordering commands: {:?}",
        commands.iter().map(Command::to_string).collect::<Vec<_>>()
    );

    let total = commands.len();
    let mut satisfied: BTreeSet<Dependency> = BTreeSet::new();
    // Commands are identified by their index in the input batch.
    let mut scheduled: Vec<usize> = Vec::with_capacity(total);
    let mut placed = vec![false; total];

    loop {
        let mut progressed = false;

        for (idx, command) in commands.iter().enumerate() {
            if placed[idx] {
                continue;
            }
            if is_eligible(command, &satisfied, oracle)? {
                // Merge provides right away so later commands in this same
                // pass can chain onto this one.
                satisfied.extend(command.provides().iter().cloned());
                scheduled.push(idx);
                placed[idx] = true;
                progressed = true;
            }
        }

        if scheduled.len() == total {
            break;
        }
        if !progressed {
            return Err(unresolved_error(&commands, &placed, &satisfied, oracle)?);
        }
    }

    // Permutation of the input by construction: each index is placed at
    // most once and the loop only ends once all are placed.
    let mut slots: Vec<Option<Command>> = commands.into_iter().map(Some).collect();
    let mut ordered = Vec::with_capacity(total);
    for idx in scheduled {
        if let Some(command) = slots[idx].take() {
            ordered.push(command);
        }
    }
    debug_assert_eq!(ordered.len(), total);

    info!(
        "Reordered commands: {:?}",
        ordered.iter().map(Command::to_string).collect::<Vec<_>>()
    );
    Ok(ordered)
}

/// Order the batch, then execute it one command at a time.
///
/// The first failing command aborts the remainder; already-executed
/// commands are not rolled back.
pub fn run(commands: Vec<Command>, oracle: &dyn DependencyOracle) -> Result<()> {
    let mut ordered = order(commands, oracle)?;
    for command in &mut ordered {
        command.execute()?;
    }
    Ok(())
}

fn is_eligible(
    command: &Command,
    satisfied: &BTreeSet<Dependency>,
    oracle: &dyn DependencyOracle,
) -> Result<bool> {
    for requirement in command.requires() {
        if satisfied.contains(requirement) {
            continue;
        }
        // No command scheduled so far provides it; maybe it already exists
        // outside this batch.
        if !oracle.has_dependency(requirement)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Build the diagnostic for a no-progress pass with commands remaining.
fn unresolved_error(
    commands: &[Command],
    placed: &[bool],
    satisfied: &BTreeSet<Dependency>,
    oracle: &dyn DependencyOracle,
) -> Result<Error> {
    let mut leftover = Vec::new();
    let mut missing = BTreeSet::new();
    for (idx, command) in commands.iter().enumerate() {
        if placed[idx] {
            continue;
        }
        leftover.push(command.to_string());
        for requirement in command.requires() {
            if !satisfied.contains(requirement) && !oracle.has_dependency(requirement)? {
                missing.insert(requirement.to_string());
            }
        }
    }
    Ok(Error::UnresolvedDependencies {
        commands: leftover,
        missing: missing.into_iter().collect(),
    })
}
