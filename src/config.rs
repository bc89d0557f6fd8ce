//! # Configuration Schema and Parsing
//!
//! This module defines the data structures that represent the raptly YAML
//! configuration file, as well as the logic for parsing it.
//!
//! ## Layout
//!
//! The file has two top-level maps:
//!
//! ```yaml
//! mirror:
//!   main:
//!     archive: http://archive.ubuntu.com/ubuntu/
//!     distribution: noble
//!     components: [main, universe]
//!     architectures: [amd64]
//!     gpg-keys: ["790BC7277767219C42C86F933B4FE6ACC0B21F32"]
//! snapshot:
//!   main-2026:
//!     mirror: main
//!   main-2026-filtered:
//!     filter:
//!       source: main-2026
//!       query: "Name (% icinga*)"
//! ```
//!
//! A snapshot entry takes exactly one of three source forms: `mirror:`,
//! `repo:` or `filter:`. The forms are modelled as an untagged enum, so a
//! block that matches none of them is rejected at parse time instead of
//! surfacing later as a broken aptly invocation.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The whole configuration file: named mirrors and named snapshots.
///
/// `BTreeMap` keeps iteration order stable, which keeps generated batches
/// (and therefore logs and schedules) reproducible across runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Mirrors to manage, keyed by mirror name.
    #[serde(default)]
    pub mirror: BTreeMap<String, MirrorConfig>,
    /// Snapshots to manage, keyed by snapshot name.
    #[serde(default)]
    pub snapshot: BTreeMap<String, SnapshotConfig>,
}

/// One mirror definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MirrorConfig {
    /// Archive URL the mirror replicates.
    pub archive: String,
    /// Distribution to mirror (e.g. "noble", "bookworm").
    pub distribution: String,
    /// Components to mirror (e.g. "main", "universe").
    pub components: Vec<String>,
    /// Restrict to these architectures; empty means aptly's default.
    #[serde(default)]
    pub architectures: Vec<String>,
    /// Also mirror source packages.
    #[serde(default)]
    pub sources: bool,
    /// Also mirror udeb (installer) packages.
    #[serde(default)]
    pub udeb: bool,
    /// GPG key ids the archive is signed with; fetched into the trusted
    /// keyring before the mirror is created or updated.
    #[serde(default, rename = "gpg-keys")]
    pub gpg_keys: Vec<String>,
    /// Fallback download URLs for the keys above, index-aligned with
    /// `gpg-keys`. Used when the keyserver does not have a key.
    #[serde(default, rename = "gpg-urls")]
    pub gpg_urls: Vec<String>,
}

/// One snapshot definition: what the snapshot is taken from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SnapshotConfig {
    /// Capture the current contents of a mirror.
    Mirror { mirror: String },
    /// Capture the current contents of a local repo.
    Repo { repo: String },
    /// Derive from another snapshot by package query.
    Filter { filter: FilterConfig },
}

/// Source and package query for a filtered snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Name of the snapshot to filter.
    pub source: String,
    /// aptly package query selecting the packages to keep.
    pub query: String,
}

/// Parse a YAML string into a [`Config`].
pub fn parse(input: &str) -> Result<Config> {
    serde_yaml::from_str(input).map_err(|e| Error::ConfigParse {
        message: e.to_string(),
        hint: Some(
            "expected top-level 'mirror:' and 'snapshot:' maps; \
             snapshot entries need one of 'mirror:', 'repo:' or 'filter:'"
                .to_string(),
        ),
    })
}

/// Load and parse a configuration file from disk.
pub fn from_file(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)?;
    parse(&contents)
}
