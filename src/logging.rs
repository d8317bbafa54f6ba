// src/logging.rs

//! Logging setup for `shellrunner` using `tracing` + `tracing-subscriber`.
//!
//! The filter comes from, in order:
//! 1. `--log-level`, applied to `shellrunner` itself;
//! 2. `SHELLRUNNER_LOG`, any `EnvFilter` directive string
//!    (e.g. `debug` or `shellrunner=debug,kube=info`);
//! 3. [`DEFAULT_DIRECTIVES`].
//!
//! Cluster client crates stay at `warn` unless a directive names them.
//! Logs go to STDERR so that stdout carries only command output.

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

use crate::cli::LogLevel;

pub const LOG_ENV_VAR: &str = "SHELLRUNNER_LOG";

pub const DEFAULT_DIRECTIVES: &str = "info";

/// Third-party targets that are noisy at `info` and below.
const QUIET_TARGETS: &[&str] = &["kube", "hyper", "hyper_util", "tower", "rustls"];

/// Initialise the global logging subscriber. Call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env = std::env::var(LOG_ENV_VAR).ok();
    let filter = build_filter(cli_level, env.as_deref())?;

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

fn build_filter(cli_level: Option<LogLevel>, env: Option<&str>) -> Result<EnvFilter> {
    let directives = match (cli_level, env) {
        (Some(level), _) => format!("{},shellrunner={}", DEFAULT_DIRECTIVES, level_name(level)),
        (None, Some(env)) if !env.trim().is_empty() => env.trim().to_string(),
        _ => DEFAULT_DIRECTIVES.to_string(),
    };

    let mut filter = EnvFilter::try_new(&directives)
        .with_context(|| format!("invalid {LOG_ENV_VAR} directives: {directives:?}"))?;
    for target in QUIET_TARGETS {
        if !directives.contains(target) {
            filter = filter.add_directive(format!("{target}=warn").parse()?);
        }
    }
    Ok(filter)
}

fn level_name(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_level_applies_to_this_crate() {
        let filter = build_filter(Some(LogLevel::Debug), Some("error")).unwrap();
        let rendered = filter.to_string().to_lowercase();
        assert!(rendered.contains("shellrunner=debug"));
        assert!(rendered.contains("kube=warn"));
    }

    #[test]
    fn env_accepts_per_target_directives() {
        let filter = build_filter(None, Some("shellrunner=trace,kube=info")).unwrap();
        let rendered = filter.to_string().to_lowercase();
        assert!(rendered.contains("shellrunner=trace"));
        assert!(rendered.contains("kube=info"));
        assert!(!rendered.contains("kube=warn"));
    }

    #[test]
    fn malformed_env_is_an_error() {
        assert!(build_filter(None, Some("shellrunner=loud")).is_err());
    }

    #[test]
    fn blank_env_falls_back_to_defaults() {
        let rendered = build_filter(None, Some("  ")).unwrap().to_string().to_lowercase();
        assert!(rendered.contains("info"));
        assert!(rendered.contains("hyper=warn"));
    }
}
