// src/exec/mod.rs

//! Command execution layer.
//!
//! - [`backend`] defines the `ExecutionBackend` trait and builds the backend
//!   selected in the config.
//! - [`local`] runs commands in a shell subprocess on this host.
//! - [`container`] runs commands in an ephemeral pod and always deletes it.
//! - [`coordinator`] validates, dispatches and shapes results into
//!   `ExecutionRecord`s; it is the only entry point the task service uses.
//! - [`result`] holds the `ExecutionResult` every backend returns.

pub mod backend;
pub mod container;
pub mod coordinator;
pub mod local;
pub mod result;

pub use backend::{BoxFuture, ExecutionBackend, build_backend};
pub use container::ContainerBackend;
pub use coordinator::{ExecutionCoordinator, ExecutionRecord, format_output};
pub use local::LocalProcessBackend;
pub use result::ExecutionResult;
