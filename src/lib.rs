//! # raptly Library
//!
//! This library provides the core functionality for automating aptly mirror
//! and snapshot management from a declarative YAML configuration. It is used
//! by the `raptly` command-line tool but can also be embedded by other
//! applications that drive aptly.
//!
//! ## Core Concepts
//!
//! - **Configuration (`config`)**: The schema for the YAML file declaring
//!   mirrors and snapshots.
//! - **Commands (`command`)**: Each lifecycle operation becomes a `Command`
//!   wrapping an aptly argument vector plus the capability tags it requires
//!   and provides.
//! - **System State (`state`)**: A point-in-time capture of the mirrors,
//!   snapshots and trusted GPG keys that already exist, taken once before a
//!   batch is scheduled.
//! - **Scheduler (`scheduler`)**: Fixed-point dependency resolution turning
//!   an unordered batch of commands into a safe total execution order, using
//!   the captured state to short-circuit requirements that are already
//!   satisfied outside the batch.
//! - **Factories (`mirror`, `snapshot`)**: Translate config entries into
//!   commands, skipping work aptly has already done.
//!
//! ## Execution Flow
//!
//! 1. Parse the configuration file.
//! 2. Capture system state (`SystemState::refresh`).
//! 3. Build a command batch from the selected config entries.
//! 4. Resolve the batch into an execution order (`scheduler::order`).
//! 5. Execute the order strictly sequentially, aborting on first failure.
//!
//! Scheduling is pure and happens entirely before any external invocation,
//! so a resolution failure is all-or-nothing: nothing has run yet.

pub mod command;
pub mod config;
pub mod error;
pub mod mirror;
pub mod scheduler;
pub mod snapshot;
pub mod state;

#[cfg(test)]
mod scheduler_proptest;
