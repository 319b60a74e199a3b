//! The remote note service, seen as an opaque set of operations.

use std::future::Future;

use everblog_core::{Guid, NoteFilter, Notebook, NotesPage, PublicUserInfo, Tag, User};

use crate::error::RemoteError;

/// Operations consumed from the note service.
///
/// Note-store calls (`list_*`, `find_notes`, `get_note_*`, `get_notebook`,
/// `share_note`) and user-store calls (`get_user`,
/// `get_public_user_info`) may live behind different endpoints.
pub trait NoteStore {
    fn list_notebooks(&self) -> impl Future<Output = Result<Vec<Notebook>, RemoteError>> + Send;

    fn list_tags(&self) -> impl Future<Output = Result<Vec<Tag>, RemoteError>> + Send;

    /// One page of notes matching `filter`, starting at `offset`, at most
    /// `max_notes` long.
    fn find_notes(
        &self,
        filter: &NoteFilter,
        offset: u32,
        max_notes: u32,
    ) -> impl Future<Output = Result<NotesPage, RemoteError>> + Send;

    fn get_note_content(
        &self,
        guid: &Guid,
    ) -> impl Future<Output = Result<String, RemoteError>> + Send;

    fn get_note_tag_names(
        &self,
        guid: &Guid,
    ) -> impl Future<Output = Result<Vec<String>, RemoteError>> + Send;

    fn get_notebook(&self, guid: &Guid)
        -> impl Future<Output = Result<Notebook, RemoteError>> + Send;

    fn get_user(&self) -> impl Future<Output = Result<User, RemoteError>> + Send;

    fn get_public_user_info(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<PublicUserInfo, RemoteError>> + Send;

    /// Make the note publicly shared and return its share key.
    fn share_note(&self, guid: &Guid) -> impl Future<Output = Result<String, RemoteError>> + Send;
}
