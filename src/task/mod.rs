// src/task/mod.rs

//! Named tasks wrapping a command, with their execution history.
//!
//! - [`model`] holds the `Task` record.
//! - [`store`] defines the `TaskStore` trait with in-memory and file-backed
//!   implementations.
//! - [`service`] implements record management on top of a store, and task
//!   execution through the `ExecutionCoordinator`.

pub mod model;
pub mod service;
pub mod store;

pub use model::Task;
pub use service::{TaskRunner, TaskService};
pub use store::{FileTaskStore, MemoryTaskStore, TaskStore};
