// src/exec/container/mod.rs

//! Ephemeral-pod backend.
//!
//! One attempt goes Created → Waiting → {Succeeded, Failed, TimedOut,
//! Errored} → Deleted. The pod is deleted on every path before
//! [`ContainerBackend::run_command`] returns, and the cluster handle is
//! dropped with it. The delete is bounded by `delete_timeout_ms`; one that
//! does not answer in time is logged like any other failed delete.
//!
//! Unlike the local backend, failures never escape as errors: a timeout
//! becomes exit code 124 and anything else exit code 1, with the cause in
//! `stderr`. The pod's exit status is not recovered; the phase decides
//! between 0 and 1 and the logs are returned as `stdout`.

pub mod cluster;
pub mod workload;

use std::sync::Arc;
use std::time::Duration;

use anyhow::bail;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::config::ContainerSection;
use crate::errors::Result;
use crate::exec::backend::{BoxFuture, ExecutionBackend};
use crate::exec::ExecutionResult;

pub use cluster::{ClusterConnector, KubeConnector, PodApi};
pub use workload::{PodPhase, WorkloadSpec};

/// Exit code reported when the pod does not finish in time.
pub const TIMEOUT_EXIT_CODE: i32 = 124;
pub const TIMEOUT_MESSAGE: &str = "Command execution timed out";

/// How the Waiting state ended, if it ended without error.
enum Completion {
    Finished { phase: PodPhase, logs: String },
    TimedOut,
}

pub struct ContainerBackend {
    connector: Arc<dyn ClusterConnector>,
    image: String,
    namespace: String,
    max_timeout: Duration,
    poll_interval: Duration,
    delete_timeout: Duration,
}

impl ContainerBackend {
    /// Connect to the cluster described by kubeconfig / in-cluster settings.
    ///
    /// Fails with `ExecutionFailure` if no cluster configuration can be
    /// resolved. Clients themselves are opened per attempt.
    pub async fn connect(settings: &ContainerSection) -> Result<Self> {
        let connector = KubeConnector::infer(&settings.namespace).await?;
        Ok(Self::with_connector(Arc::new(connector), settings))
    }

    pub fn with_connector(connector: Arc<dyn ClusterConnector>, settings: &ContainerSection) -> Self {
        Self {
            connector,
            image: settings.image.clone(),
            namespace: settings.namespace.clone(),
            max_timeout: settings.max_timeout(),
            poll_interval: settings.poll_interval(),
            delete_timeout: settings.delete_timeout(),
        }
    }

    /// The caller's timeout, clamped to the configured ceiling.
    pub fn effective_timeout(&self, requested: Duration) -> Duration {
        requested.min(self.max_timeout)
    }

    /// Run `command` in a new pod. Never fails; see the module docs.
    pub async fn run_command(&self, command: &str, timeout: Duration) -> ExecutionResult {
        let bound = self.effective_timeout(timeout);
        let spec = WorkloadSpec::new(&self.image, &self.namespace, command);

        let pods = match self.connector.open().await {
            Ok(pods) => pods,
            Err(e) => {
                error!(pod = %spec.name, error = %format!("{e:#}"), "could not open cluster client");
                return errored(&e);
            }
        };

        let outcome = self.drive(pods.as_ref(), &spec, bound).await;

        // Deleted: unconditional, bounded, and a failed delete never masks the outcome.
        let deleted = time::timeout(self.delete_timeout, pods.delete(&spec.name)).await;
        match deleted {
            Ok(Ok(())) => info!(pod = %spec.name, "pod cleaned up"),
            Ok(Err(e)) => warn!(pod = %spec.name, error = %format!("{e:#}"), "failed to clean up pod"),
            Err(_) => warn!(
                pod = %spec.name,
                timeout_ms = self.delete_timeout.as_millis() as u64,
                "failed to clean up pod: delete did not return in time"
            ),
        }
        drop(pods);

        match outcome {
            Ok(Completion::Finished { phase, logs }) => {
                let exit_code = if phase == PodPhase::Succeeded { 0 } else { 1 };
                ExecutionResult::new(exit_code, logs, "")
            }
            Ok(Completion::TimedOut) => ExecutionResult::new(TIMEOUT_EXIT_CODE, "", TIMEOUT_MESSAGE),
            Err(e) => {
                error!(pod = %spec.name, error = %format!("{e:#}"), "container execution failed");
                errored(&e)
            }
        }
    }

    /// Created → Waiting → terminal phase / timeout, then harvest logs.
    async fn drive(
        &self,
        pods: &dyn PodApi,
        spec: &WorkloadSpec,
        bound: Duration,
    ) -> anyhow::Result<Completion> {
        info!(
            pod = %spec.name,
            namespace = %spec.namespace,
            image = %spec.image,
            cmd = %spec.command,
            "creating pod"
        );
        pods.create(spec).await?;

        let waited = time::timeout(bound, self.await_terminal(pods, &spec.name)).await;
        let phase = match waited {
            Ok(phase) => phase?,
            Err(_) => {
                warn!(
                    pod = %spec.name,
                    timeout_ms = bound.as_millis() as u64,
                    "pod did not complete within timeout"
                );
                return Ok(Completion::TimedOut);
            }
        };

        let logs = pods.logs(&spec.name).await?;
        info!(pod = %spec.name, %phase, logs_len = logs.len(), "pod completed");

        Ok(Completion::Finished { phase, logs })
    }

    async fn await_terminal(&self, pods: &dyn PodApi, name: &str) -> anyhow::Result<PodPhase> {
        let mut ticker = time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match pods.phase(name).await? {
                Some(phase) if phase.is_terminal() => return Ok(phase),
                Some(phase) => debug!(pod = name, %phase, "waiting for pod"),
                None => bail!("pod {name} disappeared before reaching a terminal phase"),
            }
        }
    }
}

impl ExecutionBackend for ContainerBackend {
    fn name(&self) -> &str {
        "container"
    }

    fn run<'a>(
        &'a self,
        command: &'a str,
        timeout: Duration,
    ) -> BoxFuture<'a, Result<ExecutionResult>> {
        Box::pin(async move { Ok(self.run_command(command, timeout).await) })
    }
}

fn errored(cause: &anyhow::Error) -> ExecutionResult {
    ExecutionResult::new(1, "", format!("container execution failed: {cause:#}"))
}
