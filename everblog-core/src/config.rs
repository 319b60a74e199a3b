//! Site configuration stored in `<site>/everblog.yaml`.
//!
//! # API pattern
//!
//! [`load_at`] / [`save_at`] / [`init_at`] take the site directory
//! explicitly. [`SiteConfig::resolve`] validates the raw file and applies
//! defaults; [`settings_at`] does both and reads `EVERBLOG_TOKEN`.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{io_err, ConfigError};
use crate::paths;

pub const DEFAULT_PAGE_SIZE: u32 = 50;
pub const TOKEN_ENV: &str = "EVERBLOG_TOKEN";

const SANDBOX_USER_STORE_URL: &str = "https://sandbox.evernote.com/edam/user";
const PRODUCTION_USER_STORE_URL: &str = "https://www.evernote.com/edam/user";

// ---------------------------------------------------------------------------
// Raw file shape
// ---------------------------------------------------------------------------

/// `everblog.yaml` as written on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SiteConfig {
    pub note_store_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_store_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sandbox: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notebook: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    /// Post template overrides, relative to the site directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub templates_dir: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Resolved settings
// ---------------------------------------------------------------------------

/// Which remote collection is published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Notebook(String),
    Tag(String),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Notebook(name) => write!(f, "notebook '{name}'"),
            Target::Tag(name) => write!(f, "tag '{name}'"),
        }
    }
}

/// Account/session parameters. Built once, never mutated.
#[derive(Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    pub note_store_url: String,
    pub user_store_url: String,
    pub token: String,
    pub sandbox: bool,
}

impl fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("note_store_url", &self.note_store_url)
            .field("user_store_url", &self.user_store_url)
            .field("token", &"<redacted>")
            .field("sandbox", &self.sandbox)
            .finish()
    }
}

/// Everything a sync run needs from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub site: PathBuf,
    pub remote: RemoteConfig,
    pub target: Target,
    pub page_size: u32,
    pub templates_dir: Option<PathBuf>,
}

/// True when the note-store endpoint points at the sandbox service.
pub fn is_sandbox_url(url: &str) -> bool {
    url.contains("sandbox")
}

impl SiteConfig {
    /// Validate and apply defaults. `env_token`, when set, wins over the
    /// file's `token`.
    pub fn resolve(self, site: &Path, env_token: Option<String>) -> Result<Settings, ConfigError> {
        let target = match (non_blank(self.notebook), non_blank(self.tag)) {
            (Some(notebook), None) => Target::Notebook(notebook),
            (None, Some(tag)) => Target::Tag(tag),
            _ => return Err(ConfigError::InvalidTarget),
        };

        let token = non_blank(env_token)
            .or_else(|| non_blank(self.token))
            .ok_or(ConfigError::MissingToken)?;

        let page_size = self.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        if page_size == 0 {
            return Err(ConfigError::InvalidPageSize);
        }

        let sandbox = self
            .sandbox
            .unwrap_or_else(|| is_sandbox_url(&self.note_store_url));
        let user_store_url = self.user_store_url.unwrap_or_else(|| {
            if sandbox {
                SANDBOX_USER_STORE_URL.to_string()
            } else {
                PRODUCTION_USER_STORE_URL.to_string()
            }
        });

        Ok(Settings {
            site: site.to_path_buf(),
            remote: RemoteConfig {
                note_store_url: self.note_store_url,
                user_store_url,
                token,
                sandbox,
            },
            target,
            page_size,
            templates_dir: self.templates_dir.map(|dir| site.join(dir)),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// ---------------------------------------------------------------------------
// Load / save
// ---------------------------------------------------------------------------

/// Load `<site>/everblog.yaml`.
///
/// Returns `ConfigError::ConfigNotFound` if absent,
/// `ConfigError::Parse` (with path + line context) if malformed YAML.
pub fn load_at(site: &Path) -> Result<SiteConfig, ConfigError> {
    let path = paths::config_path(site);
    if !path.exists() {
        return Err(ConfigError::ConfigNotFound { path });
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse { path, source: e })
}

/// Load and resolve, taking the token override from `EVERBLOG_TOKEN`.
pub fn settings_at(site: &Path) -> Result<Settings, ConfigError> {
    load_at(site)?.resolve(site, std::env::var(TOKEN_ENV).ok())
}

/// Atomically save `<site>/everblog.yaml`.
///
/// Write flow: serialize → `.yaml.tmp` sibling → `chmod 0600` → `rename`.
/// The file may hold the auth token, hence the restrictive mode.
pub fn save_at(site: &Path, config: &SiteConfig) -> Result<(), ConfigError> {
    std::fs::create_dir_all(site).map_err(|e| io_err(site, e))?;
    let path = paths::config_path(site);
    let tmp_path = path.with_extension("yaml.tmp");

    let yaml = serde_yaml::to_string(config)?;
    std::fs::write(&tmp_path, yaml).map_err(|e| io_err(&tmp_path, e))?;
    set_file_permissions(&tmp_path)?;
    std::fs::rename(&tmp_path, &path).map_err(|e| io_err(&path, e))?;
    Ok(())
}

/// Write a starter config. Never overwrites an existing file.
pub fn init_at(site: &Path, config: &SiteConfig) -> Result<PathBuf, ConfigError> {
    let path = paths::config_path(site);
    if path.exists() {
        return Err(ConfigError::AlreadyExists { path });
    }
    save_at(site, config)?;
    Ok(path)
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|e| io_err(path, e))
}

#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
