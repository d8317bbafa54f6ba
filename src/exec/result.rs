// src/exec/result.rs

/// Outcome of one execution attempt, as produced by a backend.
///
/// Both streams have trailing whitespace trimmed at construction and the
/// value is immutable afterwards. For the container backend `exit_code` is
/// only 0 / 1 / 124 and `stderr` carries diagnostics, never pod output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    exit_code: i32,
    stdout: String,
    stderr: String,
}

impl ExecutionResult {
    pub fn new(exit_code: i32, stdout: impl AsRef<str>, stderr: impl AsRef<str>) -> Self {
        Self {
            exit_code,
            stdout: stdout.as_ref().trim_end().to_string(),
            stderr: stderr.as_ref().trim_end().to_string(),
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }

    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    pub fn stderr(&self) -> &str {
        &self.stderr
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}
