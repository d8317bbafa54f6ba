// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::types::BackendKind;

/// Configuration exactly as read from a TOML file, before validation.
///
/// ```toml
/// [executor]
/// backend = "container"
/// default_timeout_secs = 5
///
/// [container]
/// image = "busybox:latest"
/// namespace = "shell-runner"
/// max_timeout_secs = 30
///
/// [store]
/// path = ".shellrunner/tasks.toml"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub executor: ExecutorSection,

    #[serde(default)]
    pub local: LocalSection,

    #[serde(default)]
    pub container: ContainerSection,

    #[serde(default)]
    pub store: StoreSection,
}

/// Validated configuration.
///
/// Only obtainable through `ConfigFile::try_from(RawConfigFile)` (or the
/// loader helpers), so holders can rely on the invariants in `validate.rs`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub executor: ExecutorSection,
    pub local: LocalSection,
    pub container: ContainerSection,
    pub store: StoreSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            executor: raw.executor,
            local: raw.local,
            container: raw.container,
            store: raw.store,
        }
    }
}

/// `[executor]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutorSection {
    /// `"local"` (default) or `"container"`.
    #[serde(default)]
    pub backend: BackendKind,

    /// Timeout requested for task executions when the caller gives none.
    #[serde(default = "default_timeout_secs")]
    pub default_timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    5
}

impl ExecutorSection {
    pub fn default_timeout(&self) -> Duration {
        Duration::from_secs(self.default_timeout_secs)
    }
}

impl Default for ExecutorSection {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            default_timeout_secs: default_timeout_secs(),
        }
    }
}

/// `[local]` section: how the local backend launches its shell.
#[derive(Debug, Clone, Deserialize)]
pub struct LocalSection {
    #[serde(default = "default_shell")]
    pub shell: String,

    /// Flag putting the shell in "run this script and exit" mode.
    #[serde(default = "default_shell_flag")]
    pub shell_flag: String,
}

fn default_shell() -> String {
    if cfg!(windows) { "cmd" } else { "bash" }.to_string()
}

fn default_shell_flag() -> String {
    if cfg!(windows) { "/C" } else { "-lc" }.to_string()
}

impl Default for LocalSection {
    fn default() -> Self {
        Self {
            shell: default_shell(),
            shell_flag: default_shell_flag(),
        }
    }
}

/// `[container]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ContainerSection {
    #[serde(default = "default_image")]
    pub image: String,

    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Ceiling applied to every container execution, whatever the caller asks.
    #[serde(default = "default_max_timeout_secs")]
    pub max_timeout_secs: u64,

    /// How often the pod phase is polled while waiting.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Upper bound on the cleanup delete issued after every execution.
    #[serde(default = "default_delete_timeout_ms")]
    pub delete_timeout_ms: u64,
}

fn default_image() -> String {
    "busybox:latest".to_string()
}

fn default_namespace() -> String {
    "shell-runner".to_string()
}

fn default_max_timeout_secs() -> u64 {
    30
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_delete_timeout_ms() -> u64 {
    10_000
}

impl ContainerSection {
    pub fn max_timeout(&self) -> Duration {
        Duration::from_secs(self.max_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn delete_timeout(&self) -> Duration {
        Duration::from_millis(self.delete_timeout_ms)
    }
}

impl Default for ContainerSection {
    fn default() -> Self {
        Self {
            image: default_image(),
            namespace: default_namespace(),
            max_timeout_secs: default_max_timeout_secs(),
            poll_interval_ms: default_poll_interval_ms(),
            delete_timeout_ms: default_delete_timeout_ms(),
        }
    }
}

/// `[store]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreSection {
    /// TOML file holding tasks. If `None`, tasks live in memory only.
    #[serde(default)]
    pub path: Option<PathBuf>,
}
