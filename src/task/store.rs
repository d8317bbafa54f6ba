// src/task/store.rs

//! Keyed task storage.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, RwLock};

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{Result, ShellrunnerError};
use crate::fs::FileSystem;
use crate::task::Task;

/// Plain keyed-record store for tasks. Tasks are keyed by `Task::id`.
pub trait TaskStore: Send + Sync {
    /// All tasks, ordered by id.
    fn all(&self) -> Result<Vec<Task>>;

    fn get(&self, id: &str) -> Result<Option<Task>>;

    /// Insert or replace.
    fn save(&self, task: Task) -> Result<Task>;

    /// Returns whether a task was removed.
    fn delete(&self, id: &str) -> Result<bool>;

    /// Tasks whose name contains `query`, ignoring case.
    fn find_by_name(&self, query: &str) -> Result<Vec<Task>> {
        let query = query.to_lowercase();
        Ok(self
            .all()?
            .into_iter()
            .filter(|t| t.name.to_lowercase().contains(&query))
            .collect())
    }
}

fn poisoned() -> ShellrunnerError {
    ShellrunnerError::Other(anyhow!("task store lock poisoned"))
}

/// Volatile store; contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryTaskStore {
    tasks: RwLock<BTreeMap<String, Task>>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TaskStore for MemoryTaskStore {
    fn all(&self) -> Result<Vec<Task>> {
        let tasks = self.tasks.read().map_err(|_| poisoned())?;
        Ok(tasks.values().cloned().collect())
    }

    fn get(&self, id: &str) -> Result<Option<Task>> {
        let tasks = self.tasks.read().map_err(|_| poisoned())?;
        Ok(tasks.get(id).cloned())
    }

    fn save(&self, task: Task) -> Result<Task> {
        let mut tasks = self.tasks.write().map_err(|_| poisoned())?;
        tasks.insert(task.id.clone(), task.clone());
        Ok(task)
    }

    fn delete(&self, id: &str) -> Result<bool> {
        let mut tasks = self.tasks.write().map_err(|_| poisoned())?;
        Ok(tasks.remove(id).is_some())
    }
}

/// On-disk layout: one `[[task]]` table per task.
#[derive(Debug, Default, Serialize, Deserialize)]
struct TaskDocument {
    #[serde(default)]
    task: Vec<Task>,
}

/// Store persisted as a TOML document. Every mutation rewrites the file.
#[derive(Debug)]
pub struct FileTaskStore {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileTaskStore {
    pub fn new(fs: Arc<dyn FileSystem>, path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// A missing file is an empty store.
    fn load(&self) -> Result<BTreeMap<String, Task>> {
        if !self.fs.exists(&self.path) {
            return Ok(BTreeMap::new());
        }
        let contents = self.fs.read_to_string(&self.path)?;
        let doc: TaskDocument = toml::from_str(&contents)?;
        Ok(doc.task.into_iter().map(|t| (t.id.clone(), t)).collect())
    }

    fn persist(&self, tasks: BTreeMap<String, Task>) -> Result<()> {
        let doc = TaskDocument {
            task: tasks.into_values().collect(),
        };
        let contents = toml::to_string(&doc)?;
        self.fs.write(&self.path, contents.as_bytes())?;
        debug!(path = %self.path.display(), tasks = doc.task.len(), "task store written");
        Ok(())
    }
}

impl TaskStore for FileTaskStore {
    fn all(&self) -> Result<Vec<Task>> {
        let _guard = self.lock.lock().map_err(|_| poisoned())?;
        Ok(self.load()?.into_values().collect())
    }

    fn get(&self, id: &str) -> Result<Option<Task>> {
        let _guard = self.lock.lock().map_err(|_| poisoned())?;
        Ok(self.load()?.remove(id))
    }

    fn save(&self, task: Task) -> Result<Task> {
        let _guard = self.lock.lock().map_err(|_| poisoned())?;
        let mut tasks = self.load()?;
        tasks.insert(task.id.clone(), task.clone());
        self.persist(tasks)?;
        Ok(task)
    }

    fn delete(&self, id: &str) -> Result<bool> {
        let _guard = self.lock.lock().map_err(|_| poisoned())?;
        let mut tasks = self.load()?;
        if tasks.remove(id).is_none() {
            return Ok(false);
        }
        self.persist(tasks)?;
        Ok(true)
    }
}
