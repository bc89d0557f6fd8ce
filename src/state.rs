//! # System State Oracle
//!
//! Before a batch is scheduled, raptly captures a point-in-time view of the
//! external world: which mirrors and snapshots aptly already knows about, and
//! which public keys sit in the trusted GPG keyring. The scheduler consults
//! this view to short-circuit requirements that are already satisfied
//! outside the current batch.
//!
//! The view is captured once per run by [`SystemState::refresh`] and treated
//! as immutable afterwards. It is deliberately *not* refreshed between
//! command executions; safety for the divergence that accumulates as the
//! batch runs comes entirely from the provides/requires bookkeeping in the
//! scheduler, not from re-querying the world.
//!
//! The [`DependencyOracle`] trait is the seam the scheduler depends on, so
//! tests can substitute a stub oracle without shelling out to aptly.

use std::collections::BTreeSet;
use std::process;

use log::debug;

use crate::command::{DepKind, Dependency};
use crate::error::{Error, Result};

/// Read-only answer to "is this capability already satisfied by
/// pre-existing external state?".
pub trait DependencyOracle {
    fn has_dependency(&self, dependency: &Dependency) -> Result<bool>;
}

/// Pre-batch snapshot of aptly and keyring state.
#[derive(Debug, Clone, Default)]
pub struct SystemState {
    pub mirrors: BTreeSet<String>,
    pub snapshots: BTreeSet<String>,
    pub gpg_keys: BTreeSet<String>,
}

impl SystemState {
    pub fn new() -> Self {
        SystemState::default()
    }

    /// (Re)populate all three sets by querying the external tools.
    ///
    /// Must be called once before each scheduling run that should reflect
    /// current external state.
    pub fn refresh(&mut self) -> Result<()> {
        self.read_gpg()?;
        self.read_mirrors()?;
        self.read_snapshots()?;
        Ok(())
    }

    fn read_mirrors(&mut self) -> Result<()> {
        let output = capture(&["aptly", "mirror", "list", "-raw"])?;
        debug!("aptly mirror list returned: {}", output);
        self.mirrors = parse_raw_list(&output);
        Ok(())
    }

    fn read_snapshots(&mut self) -> Result<()> {
        let output = capture(&["aptly", "snapshot", "list", "-raw"])?;
        debug!("aptly snapshot list returned: {}", output);
        self.snapshots = parse_raw_list(&output);
        Ok(())
    }

    fn read_gpg(&mut self) -> Result<()> {
        let output = capture(&[
            "gpg",
            "--no-default-keyring",
            "--keyring",
            "trustedkeys.gpg",
            "--list-keys",
            "--with-colons",
        ])?;
        debug!("gpg returned: {}", output);
        self.gpg_keys = parse_gpg_colons(&output);
        Ok(())
    }
}

impl DependencyOracle for SystemState {
    fn has_dependency(&self, dependency: &Dependency) -> Result<bool> {
        match dependency.kind {
            DepKind::Mirror => Ok(self.mirrors.contains(&dependency.name)),
            DepKind::Snapshot => Ok(self.snapshots.contains(&dependency.name)),
            DepKind::GpgKey => Ok(self.gpg_keys.contains(&dependency.name)),
            kind => Err(Error::UnknownDependency {
                kind: kind.to_string(),
            }),
        }
    }
}

/// Run an external command and capture its stdout.
fn capture(argv: &[&str]) -> Result<String> {
    let output = process::Command::new(argv[0]).args(&argv[1..]).output()?;
    if !output.status.success() {
        return Err(Error::ExternalCommand {
            command: argv.join(" "),
            status: output.status.code().unwrap_or(-1),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Parse `aptly ... list -raw` output: one name per line.
fn parse_raw_list(output: &str) -> BTreeSet<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse `gpg --with-colons` key listings.
///
/// For every `pub` record the key id (field 5) is registered twice: in full
/// and in its short form with the first 8 characters dropped, because config
/// files reference either form.
fn parse_gpg_colons(output: &str) -> BTreeSet<String> {
    let mut keys = BTreeSet::new();
    for line in output.lines() {
        let fields: Vec<&str> = line.split(':').collect();
        if fields.first() == Some(&"pub") {
            if let Some(key) = fields.get(4) {
                if key.is_empty() {
                    continue;
                }
                keys.insert(key.to_string());
                if let Some(short) = key.get(8..) {
                    if !short.is_empty() {
                        keys.insert(short.to_string());
                    }
                }
            }
        }
    }
    keys
}
