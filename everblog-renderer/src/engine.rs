//! Tera rendering engine for post files.
//!
//! The embedded `post.html.tera` produces Hexo front matter followed by the
//! note body. A site may override it (or add partials it includes) by
//! placing `.tera` files in its configured templates directory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tera::Tera;

use everblog_core::FetchedNote;

use crate::context::PostContext;
use crate::error::RenderError;

/// Name of the template used for every post.
pub const POST_TEMPLATE: &str = "post.html.tera";

const TPLS: &[(&str, &str)] = &[(POST_TEMPLATE, include_str!("templates/post.html.tera"))];

// ---------------------------------------------------------------------------
// Template loading
// ---------------------------------------------------------------------------

fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RenderError {
    RenderError::Io { path: path.into(), source }
}

/// Every `.tera` file under `dir`, keyed by its `/`-separated path relative
/// to `dir`. A missing directory yields nothing.
fn site_templates(dir: &Path) -> Result<Vec<(String, String)>, RenderError> {
    let mut found = Vec::new();
    if !dir.is_dir() {
        return Ok(found);
    }
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        for entry in std::fs::read_dir(&current).map_err(|e| io_err(&current, e))? {
            let path = entry.map_err(|e| io_err(&current, e))?.path();
            if path.is_dir() {
                pending.push(path);
                continue;
            }
            if path.extension().and_then(|ext| ext.to_str()) != Some("tera") {
                continue;
            }
            let Ok(rel) = path.strip_prefix(dir) else {
                continue;
            };
            let name = rel.to_string_lossy().replace('\\', "/");
            let body = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
            found.push((name, body));
        }
    }
    Ok(found)
}

/// Embedded templates, replaced or extended by the site's own.
fn build_tera(site_template_dir: Option<&Path>) -> Result<Tera, RenderError> {
    let mut templates: HashMap<String, String> = TPLS
        .iter()
        .map(|(name, body)| (name.to_string(), body.to_string()))
        .collect();
    if let Some(dir) = site_template_dir {
        templates.extend(site_templates(dir)?);
    }

    let mut tera = Tera::default();
    tera.add_raw_templates(templates)?;
    Ok(tera)
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Renders fetched notes into post file contents. Create once per run and
/// reuse.
pub struct Renderer {
    tera: Tera,
    web_api_url_prefix: Option<String>,
}

impl Renderer {
    /// Renderer with the embedded template only.
    pub fn new() -> Result<Self, RenderError> {
        Self::with_templates(None)
    }

    /// Renderer whose embedded templates are overridden by any `.tera` files
    /// found under `site_template_dir` (missing directory = no overrides).
    pub fn with_templates(site_template_dir: Option<&Path>) -> Result<Self, RenderError> {
        Ok(Renderer {
            tera: build_tera(site_template_dir)?,
            web_api_url_prefix: None,
        })
    }

    /// Account URL prefix exposed to templates as `web_api_url_prefix` and
    /// used to build `share_url`.
    pub fn set_web_api_url_prefix(&mut self, prefix: Option<String>) {
        self.web_api_url_prefix = prefix;
    }

    /// Render the post file body for `note`.
    pub fn render_post(&self, note: &FetchedNote) -> Result<String, RenderError> {
        let ctx = PostContext::from_note(note, self.web_api_url_prefix.as_deref());
        self.render_with_context(&ctx)
    }

    /// Render using a caller-provided [`PostContext`].
    pub fn render_with_context(&self, ctx: &PostContext) -> Result<String, RenderError> {
        let tera_ctx = ctx.to_tera_context()?;
        Ok(self.tera.render(POST_TEMPLATE, &tera_ctx)?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
