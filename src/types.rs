// src/types.rs

use serde::Deserialize;

/// Which execution strategy the process uses. Chosen once at startup.
///
/// - `Local`: run the command in a shell subprocess on this host (default).
/// - `Container`: run the command in an ephemeral pod in the configured
///   cluster namespace.
///
/// Parsed by serde from `[executor].backend` and by clap from `--backend`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Local,
    Container,
}
