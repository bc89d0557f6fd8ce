//! # Error Handling
//!
//! This module defines the centralized error handling mechanism for the
//! `raptly` application. It uses the `thiserror` library to create a
//! comprehensive `Error` enum that covers all anticipated failure modes,
//! providing clear and descriptive error messages.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum that represents all possible errors that can
//!   occur within the application. Each variant corresponds to a specific
//!   type of error and includes contextual information to aid in debugging.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`, used
//!   throughout the application to simplify function signatures.
//!
//! The taxonomy splits into scheduling errors (`UnresolvedDependencies`),
//! tag-validation errors (`InvalidTag`, `UnknownDependency`), external
//! process failures (`ExternalCommand`, `GpgKeyFetch`) and the usual
//! configuration/IO wrappers. None of these are retried: every error
//! propagates up to the batch caller and terminates the run.

use thiserror::Error;

/// Main error type for raptly operations
#[derive(Error, Debug)]
pub enum Error {
    /// The scheduler reached a fixed point with commands still unscheduled.
    ///
    /// This means either a dependency cycle between commands, or a
    /// requirement that no command provides and the system state does not
    /// satisfy. Nothing has been executed when this is raised.
    #[error("Commands with unresolved dependencies: {commands:?} (missing: {missing:?})")]
    UnresolvedDependencies {
        /// Rendered command lines of the commands left unscheduled.
        commands: Vec<String>,
        /// The requirement tags that could not be satisfied.
        missing: Vec<String>,
    },

    /// A `require`/`provide` call used a tag kind the operation does not
    /// accept (e.g. providing `any`, requiring `publish`).
    #[error("Invalid dependency kind '{kind}' for {operation}")]
    InvalidTag { kind: String, operation: String },

    /// The system-state oracle was asked about a kind it cannot answer.
    ///
    /// Only mirrors, snapshots and GPG keys exist as pre-captured external
    /// state; anything else is a programming error in the caller.
    #[error("Unknown dependency kind to resolve: {kind}")]
    UnknownDependency { kind: String },

    /// An external command terminated with a non-zero status.
    #[error("Command failed with status {status}: {command}")]
    ExternalCommand { command: String, status: i32 },

    /// A GPG public key could not be obtained from the keyserver and no
    /// fallback URL was configured (or the fallback failed too).
    #[error("Could not fetch GPG key {key}: {message}")]
    GpgKeyFetch { key: String, message: String },

    /// An error in the YAML configuration contents (as opposed to syntax).
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
