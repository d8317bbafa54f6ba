// src/exec/local.rs

//! Local subprocess backend.
//!
//! The command is handed verbatim to a shell (`bash -lc` by default). Both
//! output pipes are drained by their own task, started before the wait
//! begins: a child that fills an unread pipe would otherwise block forever
//! and the wait would only end at the timeout.
//!
//! On Unix the shell leads its own process group. A timeout kills the whole
//! group, so commands the shell started die with it.

use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, info, warn};

use crate::config::LocalSection;
use crate::errors::{Result, ShellrunnerError};
use crate::exec::backend::{BoxFuture, ExecutionBackend};
use crate::exec::ExecutionResult;

/// Runs commands as shell subprocesses on this host.
#[derive(Debug, Clone)]
pub struct LocalProcessBackend {
    shell: String,
    shell_flag: String,
}

impl LocalProcessBackend {
    pub fn new(settings: &LocalSection) -> Self {
        Self {
            shell: settings.shell.clone(),
            shell_flag: settings.shell_flag.clone(),
        }
    }

    /// Spawn the shell, drain both streams and wait for exit within `timeout`.
    ///
    /// - Spawn failures map to `ExecutionFailure`.
    /// - If `timeout` elapses, the process group is killed (no softer signal first)
    ///   and reaped, then `ExecutionTimeout` is returned.
    /// - Collecting output after a normal exit shares the same deadline, so a
    ///   detached grandchild holding a pipe open cannot stall the call.
    pub async fn run_command(&self, command: &str, timeout: Duration) -> Result<ExecutionResult> {
        let started = Instant::now();
        let deadline = started + timeout;

        let mut cmd = Command::new(&self.shell);
        cmd.arg(&self.shell_flag)
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = cmd.spawn().map_err(|e| {
            ShellrunnerError::ExecutionFailure(format!("spawning `{}`: {e}", self.shell))
        })?;

        let pgid = child.id();
        debug!(pid = pgid, shell = %self.shell, "spawned command process");

        let mut stdout = StreamDrain::spawn(child.stdout.take())?;
        let mut stderr = StreamDrain::spawn(child.stderr.take())?;

        let waited = time::timeout_at(deadline, child.wait()).await;
        let status = match waited {
            Ok(status) => status.map_err(|e| {
                ShellrunnerError::ExecutionFailure(format!("waiting for command process: {e}"))
            })?,
            Err(_) => {
                let elapsed = started.elapsed();
                warn!(
                    pid = child.id(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "command timed out; killing process group"
                );
                kill_process_group(pgid);
                // `kill` also waits, so the child is reaped before we return.
                if let Err(e) = child.kill().await {
                    warn!(error = %e, "failed to kill timed-out process");
                }
                return Err(ShellrunnerError::ExecutionTimeout(elapsed));
            }
        };

        let drained = time::timeout_at(deadline, async {
            tokio::try_join!(stdout.collect(), stderr.collect())
        })
        .await;
        let (out, err) = match drained {
            Ok(joined) => joined?,
            Err(_) => {
                let elapsed = started.elapsed();
                warn!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    "process exited but its output pipes stayed open past the timeout"
                );
                kill_process_group(pgid);
                return Err(ShellrunnerError::ExecutionTimeout(elapsed));
            }
        };

        let exit_code = exit_code(status);
        info!(
            exit_code,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "command process exited"
        );

        Ok(ExecutionResult::new(exit_code, out, err))
    }
}

impl ExecutionBackend for LocalProcessBackend {
    fn name(&self) -> &str {
        "local"
    }

    fn run<'a>(
        &'a self,
        command: &'a str,
        timeout: Duration,
    ) -> BoxFuture<'a, Result<ExecutionResult>> {
        Box::pin(self.run_command(command, timeout))
    }
}

/// Background reader accumulating one output stream.
///
/// The reader task is aborted when this is dropped, so no exit path leaves a
/// drain running.
struct StreamDrain {
    handle: JoinHandle<std::io::Result<Vec<u8>>>,
}

impl StreamDrain {
    fn spawn<R>(stream: Option<R>) -> Result<Self>
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let mut stream = stream.ok_or_else(|| {
            ShellrunnerError::ExecutionFailure("child output stream was not piped".to_string())
        })?;

        let handle = tokio::spawn(async move {
            let mut buf = Vec::new();
            stream.read_to_end(&mut buf).await?;
            Ok(buf)
        });

        Ok(Self { handle })
    }

    /// Wait for EOF and decode what was read (lossy UTF-8).
    async fn collect(&mut self) -> Result<String> {
        let bytes = (&mut self.handle)
            .await
            .map_err(|e| ShellrunnerError::ExecutionFailure(format!("output reader failed: {e}")))?
            .map_err(|e| ShellrunnerError::ExecutionFailure(format!("reading output: {e}")))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl Drop for StreamDrain {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// SIGKILL every process in the group led by the spawned shell.
///
/// The group outlives its reaped leader while any member is alive, and its
/// id cannot be reused until then.
#[cfg(unix)]
fn kill_process_group(pgid: Option<u32>) {
    let Some(pgid) = pgid.and_then(|id| libc::pid_t::try_from(id).ok()) else {
        return;
    };
    // SAFETY: killpg takes plain integers and touches no memory of ours.
    let rc = unsafe { libc::killpg(pgid, libc::SIGKILL) };
    if rc != 0 {
        // ESRCH: every member has already exited.
        debug!(pgid, error = %std::io::Error::last_os_error(), "killpg failed");
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pgid: Option<u32>) {}

/// Real exit code, or `128 + signal` for a signalled process on Unix.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    -1
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh_backend() -> LocalProcessBackend {
        LocalProcessBackend::new(&LocalSection {
            shell: "sh".to_string(),
            shell_flag: "-c".to_string(),
        })
    }

    #[tokio::test]
    async fn reports_real_exit_code_and_both_streams() {
        let r = sh_backend()
            .run_command("echo out; echo err >&2; exit 3", Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(r.exit_code(), 3);
        assert_eq!(r.stdout(), "out");
        assert_eq!(r.stderr(), "err");
    }

    #[tokio::test]
    async fn missing_shell_is_an_execution_failure() {
        let backend = LocalProcessBackend::new(&LocalSection {
            shell: "/definitely/not/a/shell".to_string(),
            shell_flag: "-c".to_string(),
        });
        let err = backend.run_command("echo hi", Duration::from_secs(1)).await.unwrap_err();
        assert!(matches!(err, ShellrunnerError::ExecutionFailure(_)));
    }

    #[tokio::test]
    async fn stdin_is_not_inherited() {
        // `cat` sees EOF immediately instead of waiting on the test's stdin.
        let r = sh_backend().run_command("cat", Duration::from_secs(5)).await.unwrap();
        assert_eq!(r.exit_code(), 0);
        assert_eq!(r.stdout(), "");
    }

    #[tokio::test]
    async fn background_writer_holding_the_pipe_times_out() {
        let err = sh_backend()
            .run_command("(sleep 3; echo late) & echo early", Duration::from_millis(500))
            .await
            .unwrap_err();
        assert!(matches!(err, ShellrunnerError::ExecutionTimeout(_)));
    }
}
