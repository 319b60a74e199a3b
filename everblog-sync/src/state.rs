//! Build state: when the site was last built and what was written.
//!
//! Persists a [`BuildState`] JSON document at `<site>/.everblog/state.json`.
//! Writes use an atomic `.tmp` + rename.

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use everblog_core::{paths, Timestamp};

use crate::error::{io_err, SyncError};

/// Site-relative file path → SHA-256 hex digest of what was last written.
pub type FileHashes = HashMap<String, String>;

/// On-disk build state. The default (never built) has `last_build` at the
/// Unix epoch.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuildState {
    pub last_build: DateTime<Utc>,
    #[serde(default)]
    pub files: FileHashes,
}

impl BuildState {
    /// `last_build` in the note service's unit.
    pub fn last_build_timestamp(&self) -> Timestamp {
        Timestamp::from_datetime(self.last_build)
    }
}

/// Load the build state for `site`. A missing file means the site was never
/// built.
pub fn load_at(site: &Path) -> Result<BuildState, SyncError> {
    let path = paths::state_path(site);
    if !path.exists() {
        return Ok(BuildState::default());
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    Ok(serde_json::from_str(&contents)?)
}

/// Save the build state for `site` atomically.
pub fn save_at(site: &Path, state: &BuildState) -> Result<(), SyncError> {
    let path = paths::state_path(site);
    let Some(dir) = path.parent() else {
        return Err(io_err(path, std::io::Error::other("invalid state path")));
    };
    std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;

    let json = serde_json::to_string_pretty(state)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, &json).map_err(|e| io_err(&tmp, e))?;
    std::fs::rename(&tmp, &path).map_err(|e| io_err(&path, e))?;
    Ok(())
}
