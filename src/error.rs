//! Typed errors returned by collaborators behind a port.
//!
//! Application-level code (settings, CLI, catalog opening) uses `anyhow`; this enum is the
//! narrow vocabulary a port needs to decide between simulating and surfacing a failure.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failure reported by one collaborator call.
#[derive(Debug, Error)]
pub enum PortError {
    /// Credentials, keys or target locations are absent. Never a failure: triggers simulation.
    #[error("{port} is not configured: {detail}")]
    NotConfigured { port: String, detail: String },

    #[error("{port} unavailable: {detail}")]
    Unavailable { port: String, detail: String },

    #[error("{port} timed out after {after:?}")]
    Timeout { port: String, after: Duration },

    #[error("not found: {path}")]
    NotFound { path: String },

    #[error("transfer of {path} failed: {detail}")]
    Transfer { path: String, detail: String },

    #[error("content generation failed: {0}")]
    Generation(String),

    #[error("upload to {target} failed: {detail}")]
    Upload { target: String, detail: String },

    #[error("{port} rejected credentials: {detail}")]
    Auth { port: String, detail: String },

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("persistence failed: {0}")]
    Persistence(String),

    #[error("failed to {operation} at {}: {source}", path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PortError {
    /// Build an [`PortError::Io`] for `operation` on `path`.
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    /// True for collaborator-side failures that may be replaced by a simulated result.
    ///
    /// `NotFound`, `Validation` and `Persistence` always surface; `NotConfigured` is handled
    /// before this check.
    pub fn is_degradable(&self) -> bool {
        matches!(
            self,
            Self::Unavailable { .. }
                | Self::Timeout { .. }
                | Self::Transfer { .. }
                | Self::Generation(_)
                | Self::Upload { .. }
                | Self::Auth { .. }
                | Self::Io { .. }
        )
    }

    pub fn is_not_configured(&self) -> bool {
        matches!(self, Self::NotConfigured { .. })
    }

    /// Short kind label used in logs and stage failure reasons.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotConfigured { .. } => "not_configured",
            Self::Unavailable { .. } => "unavailable",
            Self::Timeout { .. } => "timeout",
            Self::NotFound { .. } => "not_found",
            Self::Transfer { .. } => "transfer",
            Self::Generation(_) => "generation",
            Self::Upload { .. } => "upload",
            Self::Auth { .. } => "auth",
            Self::Validation(_) => "validation",
            Self::Persistence(_) => "persistence",
            Self::Io { .. } => "io",
        }
    }
}
