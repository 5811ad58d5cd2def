// src/error.rs

//! Error types for the mason build orchestrator

use thiserror::Error;

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// All errors that can occur during resolution and installation
#[derive(Debug, Error)]
pub enum Error {
    /// I/O failure with operation context
    #[error("{0}")]
    IoError(String),

    /// Bare I/O passthrough
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Recipe file could not be parsed
    #[error("{0}")]
    ParseError(String),

    /// Recipe content is structurally invalid
    #[error("invalid recipe: {0}")]
    ValidationError(String),

    /// A dependency is satisfied by neither the module oracle nor any
    /// recipe on the search path
    #[error("no recipe found for dependency {name}-{version}")]
    MissingRecipe { name: String, version: String },

    /// A full expansion+drain pass made no progress while packages remain
    /// pending (circular or permanently-blocked dependency)
    #[error("unresolvable dependency graph: {blocked} is still waiting on {waiting_on}")]
    UnresolvableDependencies { blocked: String, waiting_on: String },

    /// A build step exited with a non-zero status
    #[error("{phase} step for {package} failed with exit code {code}: {stderr}")]
    StepFailed {
        package: String,
        phase: String,
        code: i32,
        stderr: String,
    },

    /// A build step exceeded the configured timeout
    #[error("{phase} step for {package} timed out after {seconds}s")]
    StepTimeout {
        package: String,
        phase: String,
        seconds: u64,
    },

    /// An expected file or directory is missing after installation
    #[error("sanity check failed for {package}: missing {path}")]
    SanityCheckFailed { package: String, path: String },
}
