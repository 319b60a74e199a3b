//! Site layout.
//!
//! ```text
//! <site>/
//!   everblog.yaml          (sync configuration)
//!   _config.yml            (site config, mirrored from the `_config.yml` note)
//!   .everblog/state.json   (last build + written file hashes)
//!   source/
//!     _posts/<name>.html
//!     images/<name>/
//! ```

use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "everblog.yaml";
pub const SITE_CONFIG_NOTE: &str = "_config.yml";
pub const POST_EXTENSION: &str = "html";

const STATE_DIR: &str = ".everblog";
const STATE_FILE: &str = "state.json";

pub fn config_path(site: &Path) -> PathBuf {
    site.join(CONFIG_FILE)
}

pub fn site_config_path(site: &Path) -> PathBuf {
    site.join(SITE_CONFIG_NOTE)
}

pub fn posts_dir(site: &Path) -> PathBuf {
    site.join("source").join("_posts")
}

pub fn images_root(site: &Path) -> PathBuf {
    site.join("source").join("images")
}

/// `source/_posts/<name>.html`
pub fn post_path(site: &Path, name: &str) -> PathBuf {
    posts_dir(site).join(format!("{name}.{POST_EXTENSION}"))
}

/// `source/images/<name>/`
pub fn image_dir(site: &Path, name: &str) -> PathBuf {
    images_root(site).join(name)
}

pub fn state_path(site: &Path) -> PathBuf {
    site.join(STATE_DIR).join(STATE_FILE)
}
