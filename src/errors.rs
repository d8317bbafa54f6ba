// src/errors.rs

//! Crate-wide error type.
//!
//! The first four variants form the error surface of command execution:
//! callers of [`crate::exec::ExecutionCoordinator::execute`] only ever see
//! those, plus `Other` for unexpected plumbing failures.

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShellrunnerError {
    /// Empty, blank or oversized command.
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    /// Carries the deny-list pattern that matched.
    #[error("Security violation: command is not safe '{0}'")]
    SecurityViolation(String),

    /// Carries the wall-clock time elapsed before the process was killed.
    #[error("Command execution timed out after {0:?}")]
    ExecutionTimeout(Duration),

    #[error("Execution failure: {0}")]
    ExecutionFailure(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, ShellrunnerError>;
