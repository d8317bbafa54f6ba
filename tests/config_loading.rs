// tests/config_loading.rs

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use tempfile::NamedTempFile;

use shellrunner::config::{load_and_validate, load_or_default};
use shellrunner::errors::ShellrunnerError;
use shellrunner::types::BackendKind;

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn full_config_is_parsed() {
    let file = config_file(
        r#"
[executor]
backend = "container"
default_timeout_secs = 10

[local]
shell = "sh"
shell_flag = "-c"

[container]
image = "alpine:3.20"
namespace = "jobs"
max_timeout_secs = 45
poll_interval_ms = 250

[store]
path = "/var/lib/shellrunner/tasks.toml"
"#,
    );

    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.executor.backend, BackendKind::Container);
    assert_eq!(cfg.executor.default_timeout(), Duration::from_secs(10));
    assert_eq!(cfg.local.shell, "sh");
    assert_eq!(cfg.container.image, "alpine:3.20");
    assert_eq!(cfg.container.namespace, "jobs");
    assert_eq!(cfg.container.max_timeout(), Duration::from_secs(45));
    assert_eq!(cfg.container.poll_interval(), Duration::from_millis(250));
    assert_eq!(
        cfg.store.path.as_deref(),
        Some(Path::new("/var/lib/shellrunner/tasks.toml"))
    );
}

#[test]
fn empty_file_yields_defaults() {
    let file = config_file("");
    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.executor.backend, BackendKind::Local);
    assert_eq!(cfg.executor.default_timeout_secs, 5);
    assert_eq!(cfg.container.image, "busybox:latest");
    assert_eq!(cfg.container.namespace, "shell-runner");
    assert_eq!(cfg.container.max_timeout_secs, 30);
    assert_eq!(cfg.container.delete_timeout(), Duration::from_secs(10));
}

#[test]
fn unknown_backend_is_a_parse_error() {
    let file = config_file("[executor]\nbackend = \"docker\"\n");
    assert!(matches!(load_and_validate(file.path()), Err(ShellrunnerError::TomlError(_))));
}

#[test]
fn zero_timeouts_are_rejected() {
    let file = config_file("[container]\nmax_timeout_secs = 0\n");
    match load_and_validate(file.path()) {
        Err(ShellrunnerError::ConfigError(msg)) => assert!(msg.contains("max_timeout_secs")),
        other => panic!("expected ConfigError, got {other:?}"),
    }

    let file = config_file("[executor]\ndefault_timeout_secs = 0\n");
    assert!(matches!(load_and_validate(file.path()), Err(ShellrunnerError::ConfigError(_))));

    let file = config_file("[container]\ndelete_timeout_ms = 0\n");
    match load_and_validate(file.path()) {
        Err(ShellrunnerError::ConfigError(msg)) => assert!(msg.contains("delete_timeout_ms")),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn invalid_namespace_is_rejected() {
    let file = config_file("[container]\nnamespace = \"Shell_Runner\"\n");
    match load_and_validate(file.path()) {
        Err(ShellrunnerError::ConfigError(msg)) => assert!(msg.contains("Shell_Runner")),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn explicit_missing_path_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    assert!(matches!(load_or_default(Some(&missing)), Err(ShellrunnerError::IoError(_))));
}
