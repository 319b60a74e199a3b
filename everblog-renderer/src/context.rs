//! Post context: serializable rendering payload built from a [`FetchedNote`].

use serde::{Deserialize, Serialize};

use everblog_core::{FetchedNote, Timestamp};

use crate::error::RenderError;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Flat rendering payload for `post.html.tera`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostContext {
    pub title: String,
    /// Derived local name, also the post file stem.
    pub name: String,
    pub guid: String,
    /// Creation time, falling back to `updated` when the service omits it.
    pub date: String,
    pub updated: String,
    pub tags: Vec<String>,
    pub note_key: Option<String>,
    /// Public link for shared notes, when the account's URL prefix is known.
    pub share_url: Option<String>,
    /// Account URL prefix for building resource links in custom templates.
    pub web_api_url_prefix: Option<String>,
    /// Note body, passed through verbatim.
    pub content: String,
    pub meta: MetaCtx,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaCtx {
    pub everblog_version: String,
}

impl PostContext {
    /// Build a [`PostContext`] from a fetched note.
    pub fn from_note(note: &FetchedNote, web_api_url_prefix: Option<&str>) -> Self {
        let updated = format_timestamp(note.meta.updated);
        let date = note
            .meta
            .created
            .map(format_timestamp)
            .unwrap_or_else(|| updated.clone());

        let share_url = match (web_api_url_prefix, note.note_key.as_deref()) {
            (Some(prefix), Some(key)) => Some(share_url(prefix, &note.meta.guid.0, key)),
            _ => None,
        };

        PostContext {
            title: note.meta.title.trim().to_string(),
            name: note.name.clone(),
            guid: note.meta.guid.0.clone(),
            date,
            updated,
            tags: note.tags.clone(),
            note_key: note.note_key.clone(),
            share_url,
            web_api_url_prefix: web_api_url_prefix.map(str::to_string),
            content: note.content.clone(),
            meta: MetaCtx {
                everblog_version: env!("CARGO_PKG_VERSION").to_string(),
            },
        }
    }

    /// Convert to a [`tera::Context`] for rendering.
    pub fn to_tera_context(&self) -> Result<tera::Context, RenderError> {
        tera::Context::from_serialize(self).map_err(RenderError::from)
    }
}

/// `<prefix>sh/<guid>/<key>`; the prefix is used as given plus a `/` if missing.
pub fn share_url(web_api_url_prefix: &str, guid: &str, key: &str) -> String {
    let sep = if web_api_url_prefix.ends_with('/') { "" } else { "/" };
    format!("{web_api_url_prefix}{sep}sh/{guid}/{key}")
}

fn format_timestamp(ts: Timestamp) -> String {
    ts.to_datetime()
        .map(|dt| dt.format(DATE_FORMAT).to_string())
        .unwrap_or_else(|| ts.to_string())
}
