// src/task/service.rs

//! Task operations.
//!
//! [`TaskService`] manages records and needs no execution backend;
//! [`TaskRunner`] executes a stored task and appends to its history.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use uuid::Uuid;

use crate::errors::{Result, ShellrunnerError};
use crate::exec::ExecutionCoordinator;
use crate::security;
use crate::task::{Task, TaskStore};

#[derive(Clone)]
pub struct TaskService {
    store: Arc<dyn TaskStore>,
}

impl TaskService {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    pub fn list(&self) -> Result<Vec<Task>> {
        self.store.all()
    }

    pub fn get(&self, id: &str) -> Result<Task> {
        self.store
            .get(id)?
            .ok_or_else(|| ShellrunnerError::TaskNotFound(id.to_string()))
    }

    /// Store a task, replacing any task with the same id.
    ///
    /// The command must pass the security policy; a blank id is replaced by a
    /// random one.
    pub fn create(&self, mut task: Task) -> Result<Task> {
        security::validate(&task.command)?;

        if task.id.trim().is_empty() {
            task.id = Uuid::new_v4().to_string();
        }

        let saved = self.store.save(task)?;
        info!(task = %saved.id, name = %saved.name, "task saved");
        Ok(saved)
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        if !self.store.delete(id)? {
            return Err(ShellrunnerError::TaskNotFound(id.to_string()));
        }
        info!(task = %id, "task deleted");
        Ok(())
    }

    /// Tasks whose name contains `query` (case-insensitive). Never empty.
    pub fn find(&self, query: &str) -> Result<Vec<Task>> {
        let found = self.store.find_by_name(query)?;
        if found.is_empty() {
            return Err(ShellrunnerError::TaskNotFound(format!(
                "no tasks found containing: {query}"
            )));
        }
        Ok(found)
    }
}

pub struct TaskRunner {
    tasks: TaskService,
    coordinator: ExecutionCoordinator,
    timeout: Duration,
}

impl TaskRunner {
    /// `timeout` is the window requested for every task execution.
    pub fn new(tasks: TaskService, coordinator: ExecutionCoordinator, timeout: Duration) -> Self {
        Self {
            tasks,
            coordinator,
            timeout,
        }
    }

    /// Run the task's command and append the execution to its history.
    ///
    /// Errors from validation or the backend leave the history untouched.
    pub async fn execute(&self, id: &str) -> Result<Task> {
        let task = self.tasks.get(id)?;

        info!(task = %task.id, backend = self.coordinator.backend_name(), "executing task");
        let record = self.coordinator.execute(&task.command, self.timeout).await?;

        // Re-read so concurrent updates made while the command ran are kept.
        let mut task = self.tasks.get(id)?;
        task.executions.push(record);
        self.tasks.store.save(task)
    }
}
