//! Error types for everblog-sync.

use std::path::PathBuf;

use thiserror::Error;

use everblog_core::ConfigError;
use everblog_remote::RemoteError;
use everblog_renderer::RenderError;

/// All errors that can arise from sync operations. Every variant aborts the
/// run; nothing is retried.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The configured notebook or tag does not exist remotely.
    #[error("cannot find {kind} \"{name}\"")]
    NotFound { kind: &'static str, name: String },

    /// A remote call failed.
    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),

    /// An error from the rendering engine.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// An error loading site configuration.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The async runtime could not be started.
    #[error("cannot start runtime: {0}")]
    Runtime(#[source] std::io::Error),

    /// JSON serialization/deserialization error (build state).
    #[error("build state JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
