//! Registry Adapter Errors
//!
//! Typed failures surfaced to framework callers. Client-side errors pass
//! through unchanged; decode failures on instance metadata are handled with
//! sentinel defaults and never reach this taxonomy.

use std::time::Duration;

/// Errors produced by the registry adapter
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Invalid or missing configuration, fatal at first use
    #[error("invalid registry configuration: {0}")]
    Config(String),

    /// The background executor did not become ready within the startup bound
    #[error("registry executor failed to initialize: {0}")]
    ExecutorInitFailed(String),

    /// An operation was submitted after the executor was stopped
    #[error("registry executor is stopped")]
    ExecutorStopped,

    /// The caller-side blocking bound elapsed; the underlying task keeps
    /// running and its result is discarded
    #[error("registry operation timed out after {elapsed:?}")]
    Timeout { elapsed: Duration },

    /// An error raised by the registry client, surfaced unchanged
    #[error("registry client error: {0}")]
    Client(anyhow::Error),
}
