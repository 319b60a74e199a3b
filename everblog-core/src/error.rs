//! Error types for everblog-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while loading or writing site configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure, annotated with the path involved.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML serialization error (write path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load, with the file path and serde_yaml's line context.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `everblog.yaml` does not exist in the site directory.
    #[error("config not found at {path}; run `everblog init` first")]
    ConfigNotFound { path: PathBuf },

    /// `everblog init` refuses to replace an existing config.
    #[error("config already exists at {path}")]
    AlreadyExists { path: PathBuf },

    /// Neither the config file nor `EVERBLOG_TOKEN` provide a token.
    #[error("no auth token configured; set `token` in everblog.yaml or EVERBLOG_TOKEN")]
    MissingToken,

    /// Both or neither of `notebook` / `tag` were given.
    #[error("exactly one of `notebook` or `tag` must be set")]
    InvalidTarget,

    #[error("page_size must be greater than zero")]
    InvalidPageSize,
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.into(),
        source,
    }
}
