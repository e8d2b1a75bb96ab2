use std::time::Duration;

use thiserror::Error;

/// Transport/API failure from a control plane. The original diagnostic body
/// is preserved verbatim in the message fields.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("API error {status}: {message}")]
    Status { status: u16, message: String },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Transient failures are safe to retry for side-effect-free reads:
    /// transport errors, throttling, and server-side 5xx.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Which teardown step failed, so the caller knows what to clean up manually.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeardownStep {
    Disk,
    Cluster,
    Network,
}

impl std::fmt::Display for TeardownStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disk => write!(f, "disk"),
            Self::Cluster => write!(f, "cluster"),
            Self::Network => write!(f, "network"),
        }
    }
}

/// Failure taxonomy of the lifecycle manager. Mutations are never silently
/// retried; a partially-applied create names what it left behind.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// Create failed. `partial` lists resources that were already applied
    /// and are left behind (the message names them too).
    #[error("provisioning failed: {message}")]
    Provisioning {
        message: String,
        partial: Vec<String>,
    },

    #[error("scaling node pool '{pool}' failed: {message}")]
    Scaling { pool: String, message: String },

    #[error("{kind} '{name}' not found")]
    NotFound { kind: &'static str, name: String },

    #[error("teardown failed at the {step} step: {message}")]
    Teardown {
        step: TeardownStep,
        message: String,
    },

    /// Polling exceeded its bound without reaching a terminal state. The
    /// remote operation may still be in progress; this is not a reported
    /// failure and the wait may be retried.
    #[error("timed out after {}s waiting for {what}; the operation may still be in progress", .waited.as_secs())]
    Timeout { what: String, waited: Duration },

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl LifecycleError {
    pub fn not_found(kind: &'static str, name: &str) -> Self {
        Self::NotFound {
            kind,
            name: name.to_string(),
        }
    }
}
