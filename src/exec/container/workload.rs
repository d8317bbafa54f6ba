// src/exec/container/workload.rs

//! Backend-neutral description of the single-use pod, and its phases.

use std::collections::BTreeMap;
use std::fmt;

use k8s_openapi::api::core::v1::{Container, Pod, PodSpec, ResourceRequirements};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use uuid::Uuid;

pub const NAME_PREFIX: &str = "task-exec-";
pub const CONTAINER_NAME: &str = "executor";
pub const APP_LABEL: &str = "task-executor";

/// Fixed resource envelope for every pod. Not configurable.
pub const REQUEST_MEMORY: &str = "64Mi";
pub const REQUEST_CPU: &str = "50m";
pub const LIMIT_MEMORY: &str = "128Mi";
pub const LIMIT_CPU: &str = "100m";

/// Everything needed to create the pod for one execution attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadSpec {
    pub name: String,
    pub namespace: String,
    pub image: String,
    pub command: String,
    pub labels: BTreeMap<String, String>,
}

impl WorkloadSpec {
    /// New spec with a freshly generated, unique pod name.
    pub fn new(image: &str, namespace: &str, command: &str) -> Self {
        let mut labels = BTreeMap::new();
        labels.insert("app".to_string(), APP_LABEL.to_string());
        labels.insert("task-id".to_string(), Uuid::new_v4().to_string());

        Self {
            name: generate_name(),
            namespace: namespace.to_string(),
            image: image.to_string(),
            command: command.to_string(),
            labels,
        }
    }

    /// Container entrypoint: the image's shell running the command verbatim.
    pub fn entrypoint(&self) -> Vec<String> {
        vec!["sh".to_string(), "-c".to_string(), self.command.clone()]
    }

    pub fn to_pod(&self) -> Pod {
        let quantities = |memory: &str, cpu: &str| {
            BTreeMap::from([
                ("memory".to_string(), Quantity(memory.to_string())),
                ("cpu".to_string(), Quantity(cpu.to_string())),
            ])
        };

        Pod {
            metadata: ObjectMeta {
                name: Some(self.name.clone()),
                namespace: Some(self.namespace.clone()),
                labels: Some(self.labels.clone()),
                ..Default::default()
            },
            spec: Some(PodSpec {
                restart_policy: Some("Never".to_string()),
                containers: vec![Container {
                    name: CONTAINER_NAME.to_string(),
                    image: Some(self.image.clone()),
                    command: Some(self.entrypoint()),
                    image_pull_policy: Some("IfNotPresent".to_string()),
                    resources: Some(ResourceRequirements {
                        requests: Some(quantities(REQUEST_MEMORY, REQUEST_CPU)),
                        limits: Some(quantities(LIMIT_MEMORY, LIMIT_CPU)),
                        ..Default::default()
                    }),
                    ..Default::default()
                }],
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}

/// `task-exec-` followed by 8 random hex characters.
pub fn generate_name() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("{NAME_PREFIX}{}", &id[..8])
}

/// Pod lifecycle phase as reported by the cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PodPhase {
    Pending,
    Running,
    Succeeded,
    Failed,
    Unknown,
}

impl PodPhase {
    pub fn parse(s: &str) -> Self {
        match s {
            "Pending" => PodPhase::Pending,
            "Running" => PodPhase::Running,
            "Succeeded" => PodPhase::Succeeded,
            "Failed" => PodPhase::Failed,
            _ => PodPhase::Unknown,
        }
    }

    /// Succeeded and Failed are final; logs are available from then on.
    pub fn is_terminal(self) -> bool {
        matches!(self, PodPhase::Succeeded | PodPhase::Failed)
    }
}

impl fmt::Display for PodPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PodPhase::Pending => "Pending",
            PodPhase::Running => "Running",
            PodPhase::Succeeded => "Succeeded",
            PodPhase::Failed => "Failed",
            PodPhase::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_prefixed_and_unique() {
        let a = generate_name();
        let b = generate_name();
        assert!(a.starts_with(NAME_PREFIX));
        assert_eq!(a.len(), NAME_PREFIX.len() + 8);
        assert_ne!(a, b);
    }

    #[test]
    fn pod_never_restarts_and_is_resource_bounded() {
        let spec = WorkloadSpec::new("busybox:latest", "shell-runner", "echo hi");
        let pod = spec.to_pod();

        assert_eq!(pod.metadata.name.as_deref(), Some(spec.name.as_str()));
        assert_eq!(pod.metadata.namespace.as_deref(), Some("shell-runner"));
        let labels = pod.metadata.labels.unwrap();
        assert_eq!(labels.get("app").map(String::as_str), Some(APP_LABEL));
        assert!(labels.contains_key("task-id"));

        let pod_spec = pod.spec.unwrap();
        assert_eq!(pod_spec.restart_policy.as_deref(), Some("Never"));
        assert_eq!(pod_spec.containers.len(), 1);

        let container = &pod_spec.containers[0];
        assert_eq!(container.image.as_deref(), Some("busybox:latest"));
        assert_eq!(
            container.command.clone().unwrap(),
            vec!["sh".to_string(), "-c".to_string(), "echo hi".to_string()]
        );

        let resources = container.resources.clone().unwrap();
        let limits = resources.limits.unwrap();
        let requests = resources.requests.unwrap();
        assert_eq!(limits["memory"], Quantity(LIMIT_MEMORY.to_string()));
        assert_eq!(limits["cpu"], Quantity(LIMIT_CPU.to_string()));
        assert_eq!(requests["memory"], Quantity(REQUEST_MEMORY.to_string()));
        assert_eq!(requests["cpu"], Quantity(REQUEST_CPU.to_string()));
    }

    #[test]
    fn only_succeeded_and_failed_are_terminal() {
        assert!(PodPhase::parse("Succeeded").is_terminal());
        assert!(PodPhase::parse("Failed").is_terminal());
        assert!(!PodPhase::parse("Running").is_terminal());
        assert!(!PodPhase::parse("Pending").is_terminal());
        assert_eq!(PodPhase::parse("Evicted"), PodPhase::Unknown);
    }
}
