//! In-memory stand-in for a cluster, implementing the container backend's
//! `ClusterConnector` / `PodApi` seam.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{Result, bail};
use shellrunner::exec::BoxFuture;
use shellrunner::exec::container::{ClusterConnector, PodApi, PodPhase, WorkloadSpec};

/// How every pod created in this cluster behaves.
#[derive(Debug, Clone)]
pub enum PodScript {
    /// Reports `Running` for `after_polls` phase queries, then `phase`.
    Completes {
        phase: PodPhase,
        logs: String,
        after_polls: usize,
    },
    /// Never leaves `Running`.
    Hangs,
    /// Disappears on the first phase query.
    Vanishes,
}

#[derive(Debug, Default, Clone, Copy)]
struct Faults {
    open: bool,
    create_after_persisting: bool,
    logs: bool,
    delete: bool,
    delete_hangs: bool,
}

#[derive(Debug)]
struct ClusterState {
    script: PodScript,
    faults: Faults,
    /// Live pods: name -> phase queries served so far.
    pods: HashMap<String, usize>,
    created: Vec<WorkloadSpec>,
    opened: usize,
    open_handles: usize,
}

#[derive(Debug, Clone)]
pub struct FakeCluster {
    state: Arc<Mutex<ClusterState>>,
}

impl FakeCluster {
    pub fn new(script: PodScript) -> Self {
        Self {
            state: Arc::new(Mutex::new(ClusterState {
                script,
                faults: Faults::default(),
                pods: HashMap::new(),
                created: Vec::new(),
                opened: 0,
                open_handles: 0,
            })),
        }
    }

    pub fn completing(phase: PodPhase, logs: &str) -> Self {
        Self::new(PodScript::Completes {
            phase,
            logs: logs.to_string(),
            after_polls: 2,
        })
    }

    pub fn hanging() -> Self {
        Self::new(PodScript::Hangs)
    }

    pub fn vanishing() -> Self {
        Self::new(PodScript::Vanishes)
    }

    /// Opening a client fails.
    pub fn failing_open(self) -> Self {
        self.state.lock().unwrap().faults.open = true;
        self
    }

    /// `create` stores the pod but still reports an error.
    pub fn failing_create_after_persisting(self) -> Self {
        self.state.lock().unwrap().faults.create_after_persisting = true;
        self
    }

    pub fn failing_logs(self) -> Self {
        self.state.lock().unwrap().faults.logs = true;
        self
    }

    /// `delete` errors and leaves the pod in place.
    pub fn failing_delete(self) -> Self {
        self.state.lock().unwrap().faults.delete = true;
        self
    }

    /// `delete` never returns.
    pub fn hanging_delete(self) -> Self {
        self.state.lock().unwrap().faults.delete_hangs = true;
        self
    }

    pub fn connector(&self) -> Arc<dyn ClusterConnector> {
        Arc::new(self.clone())
    }

    /// Equivalent of asking the cluster for a pod by name.
    pub fn exists(&self, name: &str) -> bool {
        self.state.lock().unwrap().pods.contains_key(name)
    }

    pub fn created(&self) -> Vec<WorkloadSpec> {
        self.state.lock().unwrap().created.clone()
    }

    pub fn live_pods(&self) -> usize {
        self.state.lock().unwrap().pods.len()
    }

    /// Number of client handles opened so far.
    pub fn opened(&self) -> usize {
        self.state.lock().unwrap().opened
    }

    /// Number of client handles not yet released.
    pub fn open_handles(&self) -> usize {
        self.state.lock().unwrap().open_handles
    }
}

impl ClusterConnector for FakeCluster {
    fn open(&self) -> BoxFuture<'_, Result<Box<dyn PodApi>>> {
        Box::pin(async move {
            let mut state = self.state.lock().unwrap();
            if state.faults.open {
                bail!("cluster unreachable");
            }
            state.opened += 1;
            state.open_handles += 1;
            Ok(Box::new(FakePods {
                state: Arc::clone(&self.state),
            }) as Box<dyn PodApi>)
        })
    }
}

struct FakePods {
    state: Arc<Mutex<ClusterState>>,
}

impl Drop for FakePods {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.lock() {
            state.open_handles -= 1;
        }
    }
}

impl PodApi for FakePods {
    fn create<'a>(&'a self, spec: &'a WorkloadSpec) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let mut state = self.state.lock().unwrap();
            if state.pods.contains_key(&spec.name) {
                bail!("pod {} already exists", spec.name);
            }
            state.pods.insert(spec.name.clone(), 0);
            state.created.push(spec.clone());
            if state.faults.create_after_persisting {
                bail!("create request timed out");
            }
            Ok(())
        })
    }

    fn phase<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<Option<PodPhase>>> {
        Box::pin(async move {
            let mut state = self.state.lock().unwrap();
            let script = state.script.clone();
            let polls = match state.pods.get_mut(name) {
                Some(polls) => {
                    *polls += 1;
                    *polls
                }
                None => return Ok(None),
            };

            match script {
                PodScript::Completes { phase, after_polls, .. } if polls > after_polls => {
                    Ok(Some(phase))
                }
                PodScript::Completes { .. } | PodScript::Hangs => Ok(Some(PodPhase::Running)),
                PodScript::Vanishes => {
                    state.pods.remove(name);
                    Ok(None)
                }
            }
        })
    }

    fn logs<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move {
            let state = self.state.lock().unwrap();
            if state.faults.logs {
                bail!("log stream reset");
            }
            if !state.pods.contains_key(name) {
                bail!("pod {name} not found");
            }
            match &state.script {
                PodScript::Completes { logs, .. } => Ok(logs.clone()),
                _ => Ok(String::new()),
            }
        })
    }

    fn delete<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let hangs = {
                let mut state = self.state.lock().unwrap();
                if state.faults.delete {
                    bail!("delete rejected");
                }
                if !state.faults.delete_hangs {
                    state.pods.remove(name);
                }
                state.faults.delete_hangs
            };
            if hangs {
                std::future::pending::<()>().await;
            }
            Ok(())
        })
    }
}
