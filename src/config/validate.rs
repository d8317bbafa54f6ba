// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, ShellrunnerError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::ShellrunnerError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_executor(cfg)?;
    validate_local(cfg)?;
    validate_container(cfg)?;
    Ok(())
}

fn validate_executor(cfg: &RawConfigFile) -> Result<()> {
    // `backend` is strongly typed and validated during deserialization.

    if cfg.executor.default_timeout_secs == 0 {
        return Err(config_error(
            "[executor].default_timeout_secs must be >= 1 (got 0)",
        ));
    }
    Ok(())
}

fn validate_local(cfg: &RawConfigFile) -> Result<()> {
    if cfg.local.shell.trim().is_empty() {
        return Err(config_error("[local].shell must not be empty"));
    }
    Ok(())
}

fn validate_container(cfg: &RawConfigFile) -> Result<()> {
    let container = &cfg.container;

    if container.image.trim().is_empty() {
        return Err(config_error("[container].image must not be empty"));
    }
    if !is_dns_label(&container.namespace) {
        return Err(ShellrunnerError::ConfigError(format!(
            "[container].namespace '{}' is not a valid DNS-1123 label",
            container.namespace
        )));
    }
    if container.max_timeout_secs == 0 {
        return Err(config_error(
            "[container].max_timeout_secs must be >= 1 (got 0)",
        ));
    }
    if container.poll_interval_ms == 0 {
        return Err(config_error(
            "[container].poll_interval_ms must be >= 1 (got 0)",
        ));
    }
    if container.delete_timeout_ms == 0 {
        return Err(config_error(
            "[container].delete_timeout_ms must be >= 1 (got 0)",
        ));
    }
    Ok(())
}

/// Lowercase alphanumerics and '-', 1..=63 chars, alphanumeric at both ends.
fn is_dns_label(s: &str) -> bool {
    let bytes = s.as_bytes();
    let edge_ok = |b: &u8| b.is_ascii_lowercase() || b.is_ascii_digit();

    !bytes.is_empty()
        && bytes.len() <= 63
        && bytes.first().is_some_and(edge_ok)
        && bytes.last().is_some_and(edge_ok)
        && bytes.iter().all(|b| edge_ok(b) || *b == b'-')
}

fn config_error(msg: &str) -> ShellrunnerError {
    ShellrunnerError::ConfigError(msg.to_string())
}
