// src/task/model.rs

use serde::{Deserialize, Serialize};

use crate::exec::ExecutionRecord;

/// A named, stored command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Assigned by the service when left blank.
    #[serde(default)]
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub owner: String,

    pub command: String,

    /// Oldest first.
    #[serde(default)]
    pub executions: Vec<ExecutionRecord>,
}

impl Task {
    pub fn new(name: impl Into<String>, owner: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            owner: owner.into(),
            command: command.into(),
            executions: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn last_execution(&self) -> Option<&ExecutionRecord> {
        self.executions.last()
    }
}
