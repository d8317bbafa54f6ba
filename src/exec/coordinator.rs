// src/exec/coordinator.rs

//! Single entry point for running a command: validate, dispatch to the
//! backend chosen at startup, and fold the result into an `ExecutionRecord`.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::Result;
use crate::exec::backend::ExecutionBackend;
use crate::security;

/// Separator placed between stdout and stderr in combined output.
pub const STDERR_SEPARATOR: &str = "\nERROR:\n";

/// One entry of a task's execution history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub exit_code: i32,
    /// stdout, then stderr after [`STDERR_SEPARATOR`] if it is non-blank.
    pub output: String,
}

pub struct ExecutionCoordinator {
    backend: Box<dyn ExecutionBackend>,
}

impl ExecutionCoordinator {
    pub fn new(backend: Box<dyn ExecutionBackend>) -> Self {
        Self { backend }
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Validate and run `command`.
    ///
    /// Validation failures are returned before any backend resource is
    /// allocated. Backend errors are propagated unchanged; nothing is retried.
    pub async fn execute(&self, command: &str, timeout: Duration) -> Result<ExecutionRecord> {
        security::validate(command)?;

        let started_at = Utc::now();
        let result = self.backend.run(command, timeout).await?;
        let finished_at = Utc::now();

        info!(
            backend = self.backend.name(),
            exit_code = result.exit_code(),
            elapsed_ms = (finished_at - started_at).num_milliseconds(),
            "execution finished"
        );

        Ok(ExecutionRecord {
            started_at,
            finished_at,
            exit_code: result.exit_code(),
            output: format_output(result.stdout(), result.stderr()),
        })
    }
}

/// Combine both streams into one human-readable block.
pub fn format_output(stdout: &str, stderr: &str) -> String {
    let mut combined = stdout.to_string();
    if !stderr.trim().is_empty() {
        combined.push_str(STDERR_SEPARATOR);
        combined.push_str(stderr);
    }
    combined.trim().to_string()
}
