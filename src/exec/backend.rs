// src/exec/backend.rs

//! Pluggable execution backend abstraction.
//!
//! The coordinator talks to an `ExecutionBackend` instead of a concrete
//! strategy. Production code picks one of:
//!
//! - [`LocalProcessBackend`]: shell subprocess on this host.
//! - [`ContainerBackend`]: ephemeral pod in a cluster.
//!
//! Tests can provide their own implementation that never spawns anything.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tracing::info;

use crate::config::ConfigFile;
use crate::errors::Result;
use crate::exec::{ContainerBackend, ExecutionResult, LocalProcessBackend};
use crate::types::BackendKind;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Trait abstracting how a validated command is executed.
///
/// Implementations own every resource they allocate for one call (process,
/// pod) and must release it before the returned future resolves.
pub trait ExecutionBackend: Send + Sync {
    /// Short name used in logs ("local", "container", ...).
    fn name(&self) -> &str;

    /// Run `command` and wait for it, bounded by `timeout`.
    fn run<'a>(
        &'a self,
        command: &'a str,
        timeout: Duration,
    ) -> BoxFuture<'a, Result<ExecutionResult>>;
}

/// Build the backend selected by `[executor].backend`.
///
/// Selecting the container backend resolves cluster connection settings
/// here, so an unreachable cluster configuration fails at startup with
/// `ExecutionFailure`.
pub async fn build_backend(cfg: &ConfigFile) -> Result<Box<dyn ExecutionBackend>> {
    let backend: Box<dyn ExecutionBackend> = match cfg.executor.backend {
        BackendKind::Local => Box::new(LocalProcessBackend::new(&cfg.local)),
        BackendKind::Container => Box::new(ContainerBackend::connect(&cfg.container).await?),
    };

    info!(backend = backend.name(), "execution backend ready");
    Ok(backend)
}
