//! Domain types shared by the remote client, renderer and sync engine.
//!
//! Remote payloads use the note service's camelCase field names.

use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Unique identifier of a remote entity (notebook, tag or note).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Guid(pub String);

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for Guid {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Guid {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Milliseconds since the Unix epoch, the unit the note service uses for
/// `created` / `updated`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub const EPOCH: Timestamp = Timestamp(0);

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt.timestamp_millis())
    }

    /// `None` when the value is outside chrono's representable range.
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.0).single()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<i64> for Timestamp {
    fn from(ms: i64) -> Self {
        Self(ms)
    }
}

// ---------------------------------------------------------------------------
// Remote entities
// ---------------------------------------------------------------------------

/// A remote notebook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notebook {
    pub guid: Guid,
    pub name: String,
}

/// A remote tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub guid: Guid,
    pub name: String,
}

/// Note metadata as returned by a `findNotes` page. Content is fetched
/// separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteMetadata {
    pub guid: Guid,
    pub title: String,
    #[serde(default)]
    pub created: Option<Timestamp>,
    pub updated: Timestamp,
    pub notebook_guid: Guid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_guids: Option<Vec<Guid>>,
}

impl NoteMetadata {
    /// True when at least one tag is attached.
    pub fn has_tags(&self) -> bool {
        self.tag_guids.as_ref().is_some_and(|tags| !tags.is_empty())
    }
}

/// Search filter for `findNotes`: a notebook, or a set of tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notebook_guid: Option<Guid>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tag_guids: Vec<Guid>,
}

impl NoteFilter {
    pub fn notebook(guid: Guid) -> Self {
        Self {
            notebook_guid: Some(guid),
            tag_guids: Vec::new(),
        }
    }

    pub fn tags(guids: Vec<Guid>) -> Self {
        Self {
            notebook_guid: None,
            tag_guids: guids,
        }
    }
}

/// One page of `findNotes` results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotesPage {
    pub start_index: u32,
    #[serde(default)]
    pub total_notes: Option<u32>,
    pub notes: Vec<NoteMetadata>,
}

/// A qualifying note whose body has been fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedNote {
    /// Derived local name (file stem under `source/_posts/`).
    pub name: String,
    pub meta: NoteMetadata,
    pub content: String,
    /// First 16 characters of the share key; `None` when not shared.
    pub note_key: Option<String>,
    pub tags: Vec<String>,
}

/// The authenticated account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
}

/// Public profile of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUserInfo {
    pub username: String,
    pub web_api_url_prefix: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
