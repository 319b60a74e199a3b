//! Error types for everblog-remote.

use thiserror::Error;

/// Failure of a remote call. Never retried; callers abort the run.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Connection, TLS or timeout failure.
    #[error("{operation}: transport error: {source}")]
    Transport {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The service answered with a non-success status (auth, rate limit,
    /// permission denied, ...).
    #[error("{operation}: service returned {status}: {body}")]
    Status {
        operation: &'static str,
        status: u16,
        body: String,
    },

    /// The response body did not match the expected shape.
    #[error("{operation}: malformed response: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// An in-band fault reported by a store implementation.
    #[error("{operation}: {message}")]
    Fault {
        operation: &'static str,
        message: String,
    },
}

impl RemoteError {
    /// Name of the remote operation that failed.
    pub fn operation(&self) -> &'static str {
        match self {
            RemoteError::Client(_) => "client",
            RemoteError::Transport { operation, .. }
            | RemoteError::Status { operation, .. }
            | RemoteError::Decode { operation, .. }
            | RemoteError::Fault { operation, .. } => operation,
        }
    }
}
