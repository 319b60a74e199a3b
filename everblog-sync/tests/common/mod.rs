//! In-memory note service for engine and pipeline tests.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Mutex;

use everblog_core::{
    Guid, NoteFilter, NoteMetadata, Notebook, NotesPage, PublicUserInfo, RemoteConfig, Settings,
    Tag, Target, Timestamp, User,
};
use everblog_remote::{NoteStore, RemoteError};

pub const PREFIX: &str = "https://www.example.com/shard/s1/";

/// Calls received, in order.
#[derive(Debug, Default, Clone)]
pub struct Calls {
    pub find_notes: Vec<(u32, u32)>,
    pub content: Vec<Guid>,
    pub tag_names: Vec<Guid>,
    pub share: Vec<Guid>,
    pub get_notebook: Vec<Guid>,
    pub list_notebooks: usize,
    pub list_tags: usize,
    pub get_user: usize,
}

pub struct FakeNote {
    pub meta: NoteMetadata,
    pub content: String,
    pub tag_names: Vec<String>,
}

#[derive(Default)]
pub struct FakeNoteStore {
    pub notebooks: Vec<Notebook>,
    pub tags: Vec<Tag>,
    pub notes: Vec<FakeNote>,
    /// `get_note_content` fails for this note.
    pub broken_note: Option<Guid>,
    calls: Mutex<Calls>,
}

pub fn meta(guid: &str, title: &str, notebook: &str, updated: i64) -> NoteMetadata {
    NoteMetadata {
        guid: Guid::from(guid),
        title: title.to_string(),
        created: None,
        updated: Timestamp(updated),
        notebook_guid: Guid::from(notebook),
        tag_guids: None,
    }
}

/// Share token the fake hands out; longer than a note key.
pub fn share_token(guid: &Guid) -> String {
    format!("{guid}-0123456789abcdefghijklmnop")
}

impl FakeNoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notebook(mut self, guid: &str, name: &str) -> Self {
        self.notebooks.push(Notebook {
            guid: Guid::from(guid),
            name: name.to_string(),
        });
        self
    }

    pub fn tag(mut self, guid: &str, name: &str) -> Self {
        self.tags.push(Tag {
            guid: Guid::from(guid),
            name: name.to_string(),
        });
        self
    }

    pub fn note(mut self, meta: NoteMetadata) -> Self {
        let content = format!("<p>{}</p>", meta.title);
        self.notes.push(FakeNote {
            meta,
            content,
            tag_names: Vec::new(),
        });
        self
    }

    pub fn tagged_note(mut self, mut meta: NoteMetadata, tags: &[(&str, &str)]) -> Self {
        meta.tag_guids = Some(tags.iter().map(|(guid, _)| Guid::from(*guid)).collect());
        let content = format!("<p>{}</p>", meta.title);
        self.notes.push(FakeNote {
            meta,
            content,
            tag_names: tags.iter().map(|(_, name)| name.to_string()).collect(),
        });
        self
    }

    pub fn with_content(mut self, guid: &str, content: &str) -> Self {
        if let Some(note) = self.notes.iter_mut().find(|n| n.meta.guid.0 == guid) {
            note.content = content.to_string();
        }
        self
    }

    pub fn calls(&self) -> Calls {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, f: impl FnOnce(&mut Calls)) {
        f(&mut self.calls.lock().unwrap());
    }

    fn find(&self, operation: &'static str, guid: &Guid) -> Result<&FakeNote, RemoteError> {
        self.notes
            .iter()
            .find(|n| &n.meta.guid == guid)
            .ok_or_else(|| RemoteError::Fault {
                operation,
                message: format!("no note {guid}"),
            })
    }

    fn matches(filter: &NoteFilter, note: &NoteMetadata) -> bool {
        let notebook_ok = filter
            .notebook_guid
            .as_ref()
            .map_or(true, |nb| &note.notebook_guid == nb);
        let tags_ok = filter.tag_guids.is_empty()
            || note
                .tag_guids
                .as_ref()
                .is_some_and(|tags| tags.iter().any(|t| filter.tag_guids.contains(t)));
        notebook_ok && tags_ok
    }
}

impl NoteStore for FakeNoteStore {
    async fn list_notebooks(&self) -> Result<Vec<Notebook>, RemoteError> {
        self.record(|c| c.list_notebooks += 1);
        Ok(self.notebooks.clone())
    }

    async fn list_tags(&self) -> Result<Vec<Tag>, RemoteError> {
        self.record(|c| c.list_tags += 1);
        Ok(self.tags.clone())
    }

    async fn find_notes(
        &self,
        filter: &NoteFilter,
        offset: u32,
        max_notes: u32,
    ) -> Result<NotesPage, RemoteError> {
        self.record(|c| c.find_notes.push((offset, max_notes)));
        let matching: Vec<NoteMetadata> = self
            .notes
            .iter()
            .filter(|n| Self::matches(filter, &n.meta))
            .map(|n| n.meta.clone())
            .collect();
        let total = matching.len() as u32;
        Ok(NotesPage {
            start_index: offset,
            total_notes: Some(total),
            notes: matching
                .into_iter()
                .skip(offset as usize)
                .take(max_notes as usize)
                .collect(),
        })
    }

    async fn get_note_content(&self, guid: &Guid) -> Result<String, RemoteError> {
        self.record(|c| c.content.push(guid.clone()));
        if self.broken_note.as_ref() == Some(guid) {
            return Err(RemoteError::Fault {
                operation: "getNoteContent",
                message: "RATE_LIMIT_REACHED".to_string(),
            });
        }
        Ok(self.find("getNoteContent", guid)?.content.clone())
    }

    async fn get_note_tag_names(&self, guid: &Guid) -> Result<Vec<String>, RemoteError> {
        self.record(|c| c.tag_names.push(guid.clone()));
        Ok(self.find("getNoteTagNames", guid)?.tag_names.clone())
    }

    async fn get_notebook(&self, guid: &Guid) -> Result<Notebook, RemoteError> {
        self.record(|c| c.get_notebook.push(guid.clone()));
        self.notebooks
            .iter()
            .find(|nb| &nb.guid == guid)
            .cloned()
            .ok_or_else(|| RemoteError::Fault {
                operation: "getNotebook",
                message: format!("no notebook {guid}"),
            })
    }

    async fn get_user(&self) -> Result<User, RemoteError> {
        self.record(|c| c.get_user += 1);
        Ok(User {
            username: "alice".to_string(),
        })
    }

    async fn get_public_user_info(&self, username: &str) -> Result<PublicUserInfo, RemoteError> {
        Ok(PublicUserInfo {
            username: username.to_string(),
            web_api_url_prefix: PREFIX.to_string(),
        })
    }

    async fn share_note(&self, guid: &Guid) -> Result<String, RemoteError> {
        self.record(|c| c.share.push(guid.clone()));
        self.find("shareNote", guid)?;
        Ok(share_token(guid))
    }
}

pub fn settings(site: &Path, target: Target, page_size: u32) -> Settings {
    Settings {
        site: site.to_path_buf(),
        remote: RemoteConfig {
            note_store_url: "http://127.0.0.1:9/notestore".to_string(),
            user_store_url: "http://127.0.0.1:9/user".to_string(),
            token: "test-token".to_string(),
            sandbox: false,
        },
        target,
        page_size,
        templates_dir: None,
    }
}

pub fn touch(path: &Path, content: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}
