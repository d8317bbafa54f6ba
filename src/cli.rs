// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::types::BackendKind;

/// Command-line arguments for `shellrunner`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "shellrunner",
    version,
    about = "Validate and run shell commands locally or in ephemeral cluster pods.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `SHELLRUNNER_CONFIG`, or `Shellrunner.toml` in the current
    /// working directory (built-in defaults are used if that file is absent).
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SHELLRUNNER_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    /// Override the `[executor].backend` setting from the config file.
    #[arg(long, value_enum, value_name = "BACKEND", global = true)]
    pub backend: Option<BackendKind>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run an ad-hoc command and print its combined output.
    ///
    /// The process exits with the command's exit code.
    Exec {
        /// Timeout in seconds (default: `[executor].default_timeout_secs`).
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,

        /// The command, passed verbatim to the shell.
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// Check a command against the security policy without running it.
    Check {
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// Manage stored tasks.
    #[command(subcommand)]
    Task(TaskCommand),
}

#[derive(Debug, Clone, Subcommand)]
pub enum TaskCommand {
    /// List all tasks.
    List,
    /// Show one task and its execution history.
    Show { id: String },
    /// Find tasks whose name contains QUERY (case-insensitive).
    Find { query: String },
    /// Create (or replace) a task.
    Create(CreateTaskArgs),
    /// Delete a task.
    Delete { id: String },
    /// Execute a task's command and record the execution.
    Run { id: String },
}

#[derive(Debug, Clone, Args)]
pub struct CreateTaskArgs {
    /// Explicit id; a random one is generated when omitted.
    #[arg(long)]
    pub id: Option<String>,

    #[arg(long)]
    pub name: String,

    #[arg(long, default_value = "")]
    pub owner: String,

    #[arg(long)]
    pub command: String,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
