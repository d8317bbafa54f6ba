#![allow(dead_code)]

use std::path::PathBuf;

use shellrunner::config::{ConfigFile, ContainerSection, RawConfigFile};
use shellrunner::task::Task;
use shellrunner::types::BackendKind;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn backend(mut self, kind: BackendKind) -> Self {
        self.config.executor.backend = kind;
        self
    }

    pub fn default_timeout_secs(mut self, secs: u64) -> Self {
        self.config.executor.default_timeout_secs = secs;
        self
    }

    pub fn shell(mut self, shell: &str, flag: &str) -> Self {
        self.config.local.shell = shell.to_string();
        self.config.local.shell_flag = flag.to_string();
        self
    }

    pub fn image(mut self, image: &str) -> Self {
        self.config.container.image = image.to_string();
        self
    }

    pub fn namespace(mut self, namespace: &str) -> Self {
        self.config.container.namespace = namespace.to_string();
        self
    }

    pub fn max_timeout_secs(mut self, secs: u64) -> Self {
        self.config.container.max_timeout_secs = secs;
        self
    }

    pub fn poll_interval_ms(mut self, ms: u64) -> Self {
        self.config.container.poll_interval_ms = ms;
        self
    }

    pub fn delete_timeout_ms(mut self, ms: u64) -> Self {
        self.config.container.delete_timeout_ms = ms;
        self
    }

    pub fn store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.store.path = Some(path.into());
        self
    }

    pub fn build_raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Container settings with short poll and cleanup bounds, for fast tests.
pub fn fast_container_settings(max_timeout_secs: u64) -> ContainerSection {
    ConfigFileBuilder::new()
        .max_timeout_secs(max_timeout_secs)
        .poll_interval_ms(10)
        .delete_timeout_ms(200)
        .build()
        .container
}

/// Builder for `Task`.
pub struct TaskBuilder {
    task: Task,
}

impl TaskBuilder {
    pub fn new(name: &str, command: &str) -> Self {
        Self {
            task: Task::new(name, "tester", command),
        }
    }

    pub fn id(mut self, id: &str) -> Self {
        self.task.id = id.to_string();
        self
    }

    pub fn owner(mut self, owner: &str) -> Self {
        self.task.owner = owner.to_string();
        self
    }

    pub fn build(self) -> Task {
        self.task
    }
}
