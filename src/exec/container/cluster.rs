// src/exec/container/cluster.rs

//! Cluster access seam for the container backend.
//!
//! [`ClusterConnector`] opens one [`PodApi`] handle per execution attempt;
//! dropping the handle releases the underlying client. Production code uses
//! [`KubeConnector`]; tests substitute an in-memory cluster.

use anyhow::{Context, Result};
use k8s_openapi::api::core::v1::Pod;
use kube::api::{Api, DeleteParams, LogParams, PostParams};
use kube::{Client, Config};
use tracing::debug;

use crate::errors::ShellrunnerError;
use crate::exec::backend::BoxFuture;

use super::workload::{CONTAINER_NAME, PodPhase, WorkloadSpec};

/// Pod operations within one namespace, for one execution attempt.
pub trait PodApi: Send + Sync {
    fn create<'a>(&'a self, spec: &'a WorkloadSpec) -> BoxFuture<'a, Result<()>>;

    /// Current phase, or `None` if the pod does not exist.
    fn phase<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<Option<PodPhase>>>;

    fn logs<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<String>>;

    /// Delete the pod. Deleting a pod that does not exist is not an error.
    fn delete<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<()>>;
}

/// Opens a fresh cluster handle. Called once per execution attempt.
pub trait ClusterConnector: Send + Sync {
    fn open(&self) -> BoxFuture<'_, Result<Box<dyn PodApi>>>;
}

/// `kube`-backed connector bound to a single namespace.
pub struct KubeConnector {
    config: Config,
    namespace: String,
}

impl KubeConnector {
    /// Resolve cluster settings from kubeconfig or the in-cluster environment.
    pub async fn infer(namespace: &str) -> crate::errors::Result<Self> {
        let config = Config::infer().await.map_err(|e| {
            ShellrunnerError::ExecutionFailure(format!("resolving cluster configuration: {e}"))
        })?;

        debug!(cluster_url = %config.cluster_url, namespace, "cluster configuration resolved");

        Ok(Self {
            config,
            namespace: namespace.to_string(),
        })
    }
}

impl ClusterConnector for KubeConnector {
    fn open(&self) -> BoxFuture<'_, Result<Box<dyn PodApi>>> {
        Box::pin(async move {
            let client =
                Client::try_from(self.config.clone()).context("building cluster client")?;
            let pods: Api<Pod> = Api::namespaced(client, &self.namespace);
            Ok(Box::new(KubePods { pods }) as Box<dyn PodApi>)
        })
    }
}

struct KubePods {
    pods: Api<Pod>,
}

impl PodApi for KubePods {
    fn create<'a>(&'a self, spec: &'a WorkloadSpec) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.pods
                .create(&PostParams::default(), &spec.to_pod())
                .await
                .with_context(|| format!("creating pod {}", spec.name))?;
            Ok(())
        })
    }

    fn phase<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<Option<PodPhase>>> {
        Box::pin(async move {
            let pod = self
                .pods
                .get_opt(name)
                .await
                .with_context(|| format!("reading pod {name}"))?;

            // A pod with no reported phase yet has not been scheduled.
            Ok(pod.map(|p| {
                p.status
                    .and_then(|s| s.phase)
                    .map(|phase| PodPhase::parse(&phase))
                    .unwrap_or(PodPhase::Pending)
            }))
        })
    }

    fn logs<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move {
            let params = LogParams {
                container: Some(CONTAINER_NAME.to_string()),
                ..LogParams::default()
            };
            self.pods
                .logs(name, &params)
                .await
                .with_context(|| format!("fetching logs of pod {name}"))
        })
    }

    fn delete<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let params = DeleteParams {
                grace_period_seconds: Some(0),
                ..DeleteParams::default()
            };
            match self.pods.delete(name, &params).await {
                Ok(_) => Ok(()),
                Err(kube::Error::Api(resp)) if resp.code == 404 => {
                    debug!(pod = name, "pod already gone");
                    Ok(())
                }
                Err(e) => Err(e).with_context(|| format!("deleting pod {name}")),
            }
        })
    }
}
