// src/security.rs

//! Command gatekeeper.
//!
//! A coarse, case-insensitive substring filter run before every execution on
//! every backend. It is not a parser: "drm " contains "rm " and is rejected,
//! while "format" does not contain "mkfs" and passes. Matches are reported in
//! [`DENY_LIST`] declaration order, so the first entry found wins, not the
//! earliest position in the command.

use tracing::debug;

use crate::errors::{Result, ShellrunnerError};

/// Longest accepted command, in characters.
pub const MAX_COMMAND_LEN: usize = 250;

/// Substrings that unconditionally block a command. Order matters.
pub const DENY_LIST: &[&str] = &[
    // destructive filesystem / privilege / power
    "rm ", " rm", "sudo ", "shutdown", "reboot", "halt",
    // fork bomb
    ":(){:|:&};:",
    "mkfs", "dd ",
    // redirection idioms
    ">|", ">>", "<(",
    // network egress
    "curl ", "wget ", "nc ", "netcat", "telnet",
    // remote access
    "scp ", "ssh ", "ftp ",
    // process control
    "kill ", "pkill ", "killall",
    // permissions and accounts
    "chmod ", "chown ", "useradd ", "userdel ", "passwd ",
    // container / orchestration
    "docker ", "kubectl ", "helm ",
];

/// Check `command` against the policy.
///
/// Fails with `InvalidCommand` for blank or oversized input and with
/// `SecurityViolation` (carrying the trimmed pattern) on a deny-list hit.
/// The deny-list is consulted before the length check.
pub fn validate(command: &str) -> Result<()> {
    if command.trim().is_empty() {
        return Err(ShellrunnerError::InvalidCommand(
            "command cannot be empty".to_string(),
        ));
    }

    if let Some(pattern) = first_violation(command) {
        debug!(pattern, "command rejected by deny-list");
        return Err(ShellrunnerError::SecurityViolation(pattern.trim().to_string()));
    }

    if command.chars().count() > MAX_COMMAND_LEN {
        return Err(ShellrunnerError::InvalidCommand(format!(
            "command exceeds maximum length of {MAX_COMMAND_LEN} characters"
        )));
    }

    Ok(())
}

/// First deny-list entry contained in `command`, ignoring case.
pub fn first_violation(command: &str) -> Option<&'static str> {
    let lower = command.to_lowercase();
    DENY_LIST.iter().copied().find(|pat| lower.contains(pat))
}
