//! The sync engine: resolve the target collection, page through its notes
//! and fetch everything that changed since the last build.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use futures::future::try_join_all;

use everblog_core::config::DEFAULT_PAGE_SIZE;
use everblog_core::{paths, FetchedNote, Guid, NoteFilter, NoteMetadata, Target, Timestamp};
use everblog_remote::{NoteStore, RemoteError};

use crate::error::SyncError;

/// Number of characters of a share token kept as the note key.
pub const NOTE_KEY_LEN: usize = 16;

// ---------------------------------------------------------------------------
// Target policy
// ---------------------------------------------------------------------------

/// Which kind of collection is published. Decides the search filter, how
/// local names are derived, where tags come from and whether the
/// `_config.yml` note is special.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Notebook,
    Tag,
}

impl TargetKind {
    pub fn of(target: &Target) -> Self {
        match target {
            Target::Notebook(_) => Self::Notebook,
            Target::Tag(_) => Self::Tag,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Notebook => "notebook",
            Self::Tag => "tag",
        }
    }

    /// `<title>` for notebooks, `<notebook>@<title>` for tags. Path
    /// separators become `-` so the name stays inside the posts directory.
    pub fn derived_name(self, title: &str, notebook_name: Option<&str>) -> String {
        let name = match (self, notebook_name) {
            (Self::Tag, Some(notebook)) => format!("{}@{}", notebook.trim(), title.trim()),
            _ => title.trim().to_string(),
        };
        name.replace(['/', '\\'], "-")
    }

    /// The `_config.yml` note of a published notebook mirrors the site
    /// config instead of becoming a post.
    pub fn is_sentinel(self, title: &str) -> bool {
        self == Self::Notebook && title.trim() == paths::SITE_CONFIG_NOTE
    }
}

// ---------------------------------------------------------------------------
// Remote lookups
// ---------------------------------------------------------------------------

/// Look up the configured notebook or tag by name (both sides trimmed) and
/// build the matching search filter.
pub async fn resolve_filter_target<S: NoteStore>(
    store: &S,
    target: &Target,
) -> Result<NoteFilter, SyncError> {
    let not_found = |name: &str| SyncError::NotFound {
        kind: TargetKind::of(target).label(),
        name: name.to_string(),
    };
    match target {
        Target::Notebook(name) => {
            let wanted = name.trim();
            let notebook = store
                .list_notebooks()
                .await?
                .into_iter()
                .find(|nb| nb.name.trim() == wanted)
                .ok_or_else(|| not_found(wanted))?;
            tracing::debug!("notebook \"{wanted}\" is {}", notebook.guid);
            Ok(NoteFilter::notebook(notebook.guid))
        }
        Target::Tag(name) => {
            let wanted = name.trim();
            let tag = store
                .list_tags()
                .await?
                .into_iter()
                .find(|tag| tag.name.trim() == wanted)
                .ok_or_else(|| not_found(wanted))?;
            tracing::debug!("tag \"{wanted}\" is {}", tag.guid);
            Ok(NoteFilter::tags(vec![tag.guid]))
        }
    }
}

/// Share the note and keep the first [`NOTE_KEY_LEN`] characters of the
/// returned token. Sharing makes the note public.
pub async fn get_note_key<S: NoteStore>(store: &S, guid: &Guid) -> Result<String, RemoteError> {
    let token = store.share_note(guid).await?;
    Ok(note_key(&token))
}

pub(crate) fn note_key(token: &str) -> String {
    token.chars().take(NOTE_KEY_LEN).collect()
}

/// URL prefix of the authenticated account's web API.
pub async fn get_web_api_url_prefix<S: NoteStore>(store: &S) -> Result<String, RemoteError> {
    let user = store.get_user().await?;
    let info = store.get_public_user_info(&user.username).await?;
    Ok(info.web_api_url_prefix)
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// Everything learned while paging through the target collection.
#[derive(Debug, Default)]
pub struct Listing {
    /// Notes whose content was fetched, in page order.
    pub fetched: Vec<FetchedNote>,
    /// The `_config.yml` note, when it had to be fetched.
    pub site_config: Option<FetchedNote>,
    /// Derived names left alone because the local copy is current.
    pub skipped: Vec<String>,
    /// Derived names of every qualifying note, fetched or not.
    pub qualifying: BTreeSet<String>,
    /// Number of `find_notes` calls made.
    pub pages: u32,
}

/// Pages through one target collection. Pages are fetched one after another;
/// the notes within a page are fetched concurrently.
pub struct SyncEngine<'a, S> {
    store: &'a S,
    site: &'a Path,
    kind: TargetKind,
    page_size: u32,
    last_build: Timestamp,
    share: bool,
}

impl<'a, S: NoteStore> SyncEngine<'a, S> {
    pub fn new(store: &'a S, site: &'a Path, target: &Target) -> Self {
        Self {
            store,
            site,
            kind: TargetKind::of(target),
            page_size: DEFAULT_PAGE_SIZE,
            last_build: Timestamp::EPOCH,
            share: true,
        }
    }

    /// Notes per `find_notes` call; at least 1.
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Notes updated strictly before this and present locally are skipped.
    pub fn last_build(mut self, last_build: Timestamp) -> Self {
        self.last_build = last_build;
        self
    }

    /// When false no note is shared and every `note_key` is `None`.
    pub fn share_notes(mut self, share: bool) -> Self {
        self.share = share;
        self
    }

    fn local_path(&self, name: &str, sentinel: bool) -> PathBuf {
        if sentinel {
            paths::site_config_path(self.site)
        } else {
            paths::post_path(self.site, name)
        }
    }

    /// Walk every page matching `filter` and fetch the notes that changed.
    /// Ends at the first page shorter than the page size.
    pub async fn list_qualifying_notes(&self, filter: &NoteFilter) -> Result<Listing, SyncError> {
        let mut listing = Listing::default();
        let mut notebook_names = HashMap::new();
        let mut offset = 0;

        loop {
            let page = self
                .store
                .find_notes(filter, offset, self.page_size)
                .await?;
            listing.pages += 1;
            let page_len = page.notes.len();
            tracing::debug!("page at offset {offset}: {page_len} notes");

            if self.kind == TargetKind::Tag {
                self.resolve_notebook_names(&page.notes, &mut notebook_names)
                    .await?;
            }

            let mut pending = Vec::new();
            for note in page.notes {
                let notebook_name = notebook_names.get(&note.notebook_guid).cloned();
                let name = self
                    .kind
                    .derived_name(&note.title, notebook_name.as_deref());
                let sentinel = self.kind.is_sentinel(&note.title);
                if !sentinel {
                    listing.qualifying.insert(name.clone());
                }

                if note.updated < self.last_build && self.local_path(&name, sentinel).exists() {
                    tracing::debug!("up to date: {name}");
                    listing.skipped.push(name);
                    continue;
                }
                pending.push(self.fetch_note(note, name, notebook_name, sentinel));
            }

            for note in try_join_all(pending).await? {
                if self.kind.is_sentinel(&note.meta.title) {
                    listing.site_config = Some(note);
                } else {
                    listing.fetched.push(note);
                }
            }

            if page_len < self.page_size as usize {
                break;
            }
            offset += self.page_size;
        }
        Ok(listing)
    }

    /// Fill `cache` with the names of the notebooks referenced by `notes`.
    async fn resolve_notebook_names(
        &self,
        notes: &[NoteMetadata],
        cache: &mut HashMap<Guid, String>,
    ) -> Result<(), SyncError> {
        let missing: Vec<Guid> = notes
            .iter()
            .map(|note| &note.notebook_guid)
            .filter(|guid| !cache.contains_key(*guid))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .cloned()
            .collect();
        let notebooks = try_join_all(missing.iter().map(|guid| self.store.get_notebook(guid))).await?;
        for (guid, notebook) in missing.into_iter().zip(notebooks) {
            cache.insert(guid, notebook.name);
        }
        Ok(())
    }

    /// Content, note key and tags of one note, fetched together.
    async fn fetch_note(
        &self,
        note: NoteMetadata,
        name: String,
        notebook_name: Option<String>,
        sentinel: bool,
    ) -> Result<FetchedNote, SyncError> {
        let guid = &note.guid;
        let share = self.share && !sentinel;
        let synthesized_tags = match self.kind {
            TargetKind::Tag => notebook_name.map(|notebook| vec![notebook]),
            TargetKind::Notebook => None,
        };
        let has_tags = note.has_tags();

        let content = self.store.get_note_content(guid);
        let key = async {
            if share {
                get_note_key(self.store, guid).await.map(Some)
            } else {
                Ok(None)
            }
        };
        let tags = async {
            if let Some(tags) = synthesized_tags {
                Ok(tags)
            } else if has_tags {
                self.store.get_note_tag_names(guid).await
            } else {
                Ok(Vec::new())
            }
        };
        let (content, note_key, tags) = tokio::try_join!(content, key, tags)?;

        tracing::debug!("fetched: {name}");
        Ok(FetchedNote {
            name,
            meta: note,
            content,
            note_key,
            tags,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
