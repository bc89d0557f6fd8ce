//! # Commands and Capability Tags
//!
//! This module defines the unit of external work that the scheduler orders:
//! a [`Command`] wrapping an argument vector, the set of capability tags it
//! requires before it can run, and the set of tags it provides once it has
//! been scheduled.
//!
//! ## Key Components
//!
//! - **`DepKind`**: The kinds of capability that exist in the dependency
//!   namespace (mirrors, snapshots, local repos, publish endpoints, GPG keys
//!   and the `any` wildcard).
//! - **`Dependency`**: A `(kind, identifier)` pair with value equality. Two
//!   tags with equal kind and name are interchangeable for matching.
//! - **`Command`**: The scheduling unit. `require`/`provide` record tags,
//!   `execute` performs the external invocation exactly once.
//!
//! `require` and `provide` have no side effects; only `execute` touches the
//! outside world. The kinds accepted by each operation differ: a command can
//! provide a publish endpoint but never require one, and `any` can only ever
//! be required, to be answered by pre-existing system state.

use std::collections::BTreeSet;
use std::fmt;
use std::process;

use log::debug;

use crate::error::{Error, Result};

/// The kinds of capability used as dependency currency between commands and
/// external state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DepKind {
    Mirror,
    Snapshot,
    Repo,
    Publish,
    GpgKey,
    Any,
}

impl DepKind {
    /// Kinds a command may declare as a requirement.
    fn requirable(self) -> bool {
        matches!(
            self,
            DepKind::Mirror | DepKind::Snapshot | DepKind::Repo | DepKind::Any
        )
    }

    /// Kinds a command may declare as provided.
    fn providable(self) -> bool {
        matches!(
            self,
            DepKind::Mirror | DepKind::Snapshot | DepKind::Repo | DepKind::Publish
        )
    }
}

impl fmt::Display for DepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DepKind::Mirror => "mirror",
            DepKind::Snapshot => "snapshot",
            DepKind::Repo => "repo",
            DepKind::Publish => "publish",
            DepKind::GpgKey => "gpg_key",
            DepKind::Any => "any",
        };
        f.write_str(name)
    }
}

/// A capability tag: "a thing of this kind, with this name, exists".
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Dependency {
    pub kind: DepKind,
    pub name: String,
}

impl Dependency {
    pub fn new(kind: DepKind, name: impl Into<String>) -> Self {
        Dependency {
            kind,
            name: name.into(),
        }
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.name)
    }
}

/// A unit of external work: an argv to invoke plus its dependency contract.
///
/// The argv is opaque to the scheduler; only the requires/provides sets take
/// part in ordering. The first successful execution is memoized, so a
/// command can safely appear in retried batch logic without re-running the
/// external tool.
#[derive(Debug, Clone)]
pub struct Command {
    argv: Vec<String>,
    requires: BTreeSet<Dependency>,
    provides: BTreeSet<Dependency>,
    finished: Option<i32>,
}

impl Command {
    /// Create a command from an argument vector. The first element is the
    /// program, the rest its arguments.
    pub fn new(argv: Vec<String>) -> Self {
        Command {
            argv,
            requires: BTreeSet::new(),
            provides: BTreeSet::new(),
            finished: None,
        }
    }

    /// Record that this command needs `kind/name` to exist before it runs.
    pub fn require(&mut self, kind: DepKind, name: impl Into<String>) -> Result<()> {
        if !kind.requirable() {
            return Err(Error::InvalidTag {
                kind: kind.to_string(),
                operation: "require".to_string(),
            });
        }
        self.requires.insert(Dependency::new(kind, name));
        Ok(())
    }

    /// Record that `kind/name` exists once this command has been scheduled.
    pub fn provide(&mut self, kind: DepKind, name: impl Into<String>) -> Result<()> {
        if !kind.providable() {
            return Err(Error::InvalidTag {
                kind: kind.to_string(),
                operation: "provide".to_string(),
            });
        }
        self.provides.insert(Dependency::new(kind, name));
        Ok(())
    }

    /// The tags that must be satisfied before this command may run.
    pub fn requires(&self) -> &BTreeSet<Dependency> {
        &self.requires
    }

    /// The tags satisfied once this command has been scheduled.
    pub fn provides(&self) -> &BTreeSet<Dependency> {
        &self.provides
    }

    /// Whether `execute` has already completed successfully.
    pub fn is_finished(&self) -> bool {
        self.finished.is_some()
    }

    /// Run the external command, exactly once across this command's
    /// lifetime.
    ///
    /// A second call returns the memoized exit status without re-invoking
    /// the process. A non-zero exit surfaces as
    /// [`Error::ExternalCommand`] carrying the rendered argv and the status
    /// code; failures are not memoized.
    pub fn execute(&mut self) -> Result<i32> {
        if let Some(status) = self.finished {
            debug!("Command already executed: {}", self);
            return Ok(status);
        }

        let program = self.argv.first().ok_or_else(|| Error::ExternalCommand {
            command: "<empty argv>".to_string(),
            status: 127,
        })?;

        debug!("Running command: {}", self);
        let status = process::Command::new(program)
            .args(&self.argv[1..])
            .status()?;

        if !status.success() {
            return Err(Error::ExternalCommand {
                command: self.to_string(),
                status: status.code().unwrap_or(-1),
            });
        }

        let code = status.code().unwrap_or(0);
        self.finished = Some(code);
        Ok(code)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.argv.join(" "))
    }
}
