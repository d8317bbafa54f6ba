use std::sync::{Arc, Mutex};
use std::time::Duration;

use shellrunner::errors::{Result, ShellrunnerError};
use shellrunner::exec::{BoxFuture, ExecutionBackend, ExecutionResult};

/// What a [`FakeBackend`] answers to every call.
#[derive(Debug, Clone)]
pub enum FakeResponse {
    Result(ExecutionResult),
    Timeout,
    Failure(String),
}

/// A backend that:
/// - records every `(command, timeout)` it is asked to run
/// - answers with a fixed [`FakeResponse`] without spawning anything.
#[derive(Clone)]
pub struct FakeBackend {
    response: FakeResponse,
    calls: Arc<Mutex<Vec<(String, Duration)>>>,
}

impl FakeBackend {
    pub fn new(response: FakeResponse) -> Self {
        Self {
            response,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn returning(exit_code: i32, stdout: &str, stderr: &str) -> Self {
        Self::new(FakeResponse::Result(ExecutionResult::new(exit_code, stdout, stderr)))
    }

    /// Shared view of the calls, usable after the backend is boxed.
    pub fn calls(&self) -> Arc<Mutex<Vec<(String, Duration)>>> {
        Arc::clone(&self.calls)
    }
}

impl ExecutionBackend for FakeBackend {
    fn name(&self) -> &str {
        "fake"
    }

    fn run<'a>(
        &'a self,
        command: &'a str,
        timeout: Duration,
    ) -> BoxFuture<'a, Result<ExecutionResult>> {
        Box::pin(async move {
            self.calls.lock().unwrap().push((command.to_string(), timeout));

            match &self.response {
                FakeResponse::Result(r) => Ok(r.clone()),
                FakeResponse::Timeout => Err(ShellrunnerError::ExecutionTimeout(timeout)),
                FakeResponse::Failure(msg) => Err(ShellrunnerError::ExecutionFailure(msg.clone())),
            }
        })
    }
}
