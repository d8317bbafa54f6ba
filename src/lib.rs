// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod security;
pub mod task;
pub mod types;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::debug;

use crate::cli::{CliArgs, Command, CreateTaskArgs, TaskCommand};
use crate::config::{ConfigFile, load_or_default};
use crate::exec::{ExecutionCoordinator, ExecutionRecord, build_backend};
use crate::fs::RealFileSystem;
use crate::task::{FileTaskStore, MemoryTaskStore, Task, TaskRunner, TaskService, TaskStore};

/// High-level entry point used by `main.rs`.
///
/// Loads config, builds the backend once, and runs the requested command.
/// Returns the process exit code.
pub async fn run(args: CliArgs) -> Result<i32> {
    let config_path = args.config.as_ref().map(PathBuf::from);
    let mut cfg = load_or_default(config_path.as_deref())?;
    if let Some(backend) = args.backend {
        cfg.executor.backend = backend;
    }

    match args.command {
        Command::Check { command } => {
            let command = command.join(" ");
            security::validate(&command)?;
            println!("ok: command passes the security policy");
            Ok(0)
        }
        Command::Exec { timeout, command } => {
            let coordinator = coordinator(&cfg).await?;
            let timeout = timeout
                .map(Duration::from_secs)
                .unwrap_or_else(|| cfg.executor.default_timeout());
            let record = coordinator.execute(&command.join(" "), timeout).await?;
            if !record.output.is_empty() {
                println!("{}", record.output);
            }
            Ok(record.exit_code)
        }
        Command::Task(task_cmd) => {
            run_task_command(&cfg, task_cmd).await?;
            Ok(0)
        }
    }
}

async fn coordinator(cfg: &ConfigFile) -> Result<ExecutionCoordinator> {
    let backend = build_backend(cfg).await?;
    Ok(ExecutionCoordinator::new(backend))
}

fn task_store(cfg: &ConfigFile) -> Arc<dyn TaskStore> {
    match cfg.store.path {
        Some(ref path) => {
            debug!(path = %path.display(), "using file task store");
            Arc::new(FileTaskStore::new(Arc::new(RealFileSystem), path.clone()))
        }
        None => {
            debug!("no [store].path configured; tasks are kept in memory");
            Arc::new(MemoryTaskStore::new())
        }
    }
}

/// Only `task run` builds the execution backend.
async fn run_task_command(cfg: &ConfigFile, cmd: TaskCommand) -> Result<()> {
    let service = TaskService::new(task_store(cfg));

    match cmd {
        TaskCommand::List => {
            let tasks = service.list()?;
            println!("tasks ({}):", tasks.len());
            for task in &tasks {
                print_task_summary(task);
            }
        }
        TaskCommand::Show { id } => print_task(&service.get(&id)?),
        TaskCommand::Find { query } => {
            for task in &service.find(&query)? {
                print_task_summary(task);
            }
        }
        TaskCommand::Create(CreateTaskArgs { id, name, owner, command }) => {
            let mut task = Task::new(name, owner, command);
            if let Some(id) = id {
                task = task.with_id(id);
            }
            let saved = service.create(task)?;
            println!("{}", saved.id);
        }
        TaskCommand::Delete { id } => {
            service.delete(&id)?;
            println!("deleted {id}");
        }
        TaskCommand::Run { id } => {
            let runner = TaskRunner::new(
                service,
                coordinator(cfg).await?,
                cfg.executor.default_timeout(),
            );
            let task = runner.execute(&id).await?;
            if let Some(record) = task.last_execution() {
                print_execution(record);
            }
        }
    }

    Ok(())
}

fn print_task_summary(task: &Task) {
    println!("  - {} [{}] {}", task.id, task.name, task.command);
}

fn print_task(task: &Task) {
    println!("id:      {}", task.id);
    println!("name:    {}", task.name);
    println!("owner:   {}", task.owner);
    println!("command: {}", task.command);
    println!("executions ({}):", task.executions.len());
    for record in &task.executions {
        print_execution(record);
    }
}

fn print_execution(record: &ExecutionRecord) {
    println!(
        "  - {} .. {} exit={}",
        record.started_at.to_rfc3339(),
        record.finished_at.to_rfc3339(),
        record.exit_code
    );
    for line in record.output.lines() {
        println!("      {line}");
    }
}
