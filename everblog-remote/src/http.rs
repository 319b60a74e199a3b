//! JSON-over-HTTP gateway client.
//!
//! Every operation is `POST <store-url>/<operationName>` with a JSON body and
//! a bearer token. The response body is the JSON encoding of the operation's
//! return value.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use everblog_core::{Guid, NoteFilter, Notebook, NotesPage, PublicUserInfo, RemoteConfig, Tag, User};

use crate::error::RemoteError;
use crate::store::NoteStore;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy)]
enum Endpoint {
    NoteStore,
    UserStore,
}

/// [`NoteStore`] backed by a remote HTTP gateway.
#[derive(Clone)]
pub struct HttpNoteStore {
    client: Client,
    note_store_url: String,
    user_store_url: String,
    token: String,
}

impl HttpNoteStore {
    pub fn new(remote: &RemoteConfig) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(concat!("everblog/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(RemoteError::Client)?;
        Ok(Self {
            client,
            note_store_url: remote.note_store_url.trim_end_matches('/').to_string(),
            user_store_url: remote.user_store_url.trim_end_matches('/').to_string(),
            token: remote.token.clone(),
        })
    }

    async fn call<R: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        operation: &'static str,
        body: Value,
    ) -> Result<R, RemoteError> {
        let base = match endpoint {
            Endpoint::NoteStore => &self.note_store_url,
            Endpoint::UserStore => &self.user_store_url,
        };
        tracing::debug!("remote call: {operation}");

        let response = self
            .client
            .post(format!("{base}/{operation}"))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|source| RemoteError::Transport { operation, source })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|source| RemoteError::Transport { operation, source })?;
        if !status.is_success() {
            return Err(RemoteError::Status {
                operation,
                status: status.as_u16(),
                body: text,
            });
        }

        serde_json::from_str(&text).map_err(|source| RemoteError::Decode { operation, source })
    }
}

impl NoteStore for HttpNoteStore {
    async fn list_notebooks(&self) -> Result<Vec<Notebook>, RemoteError> {
        self.call(Endpoint::NoteStore, "listNotebooks", json!({})).await
    }

    async fn list_tags(&self) -> Result<Vec<Tag>, RemoteError> {
        self.call(Endpoint::NoteStore, "listTags", json!({})).await
    }

    async fn find_notes(
        &self,
        filter: &NoteFilter,
        offset: u32,
        max_notes: u32,
    ) -> Result<NotesPage, RemoteError> {
        let body = json!({ "filter": filter, "offset": offset, "maxNotes": max_notes });
        self.call(Endpoint::NoteStore, "findNotes", body).await
    }

    async fn get_note_content(&self, guid: &Guid) -> Result<String, RemoteError> {
        self.call(Endpoint::NoteStore, "getNoteContent", json!({ "guid": guid }))
            .await
    }

    async fn get_note_tag_names(&self, guid: &Guid) -> Result<Vec<String>, RemoteError> {
        self.call(Endpoint::NoteStore, "getNoteTagNames", json!({ "guid": guid }))
            .await
    }

    async fn get_notebook(&self, guid: &Guid) -> Result<Notebook, RemoteError> {
        self.call(Endpoint::NoteStore, "getNotebook", json!({ "guid": guid }))
            .await
    }

    async fn get_user(&self) -> Result<User, RemoteError> {
        self.call(Endpoint::UserStore, "getUser", json!({})).await
    }

    async fn get_public_user_info(&self, username: &str) -> Result<PublicUserInfo, RemoteError> {
        let body = json!({ "username": username });
        self.call(Endpoint::UserStore, "getPublicUserInfo", body).await
    }

    async fn share_note(&self, guid: &Guid) -> Result<String, RemoteError> {
        self.call(Endpoint::NoteStore, "shareNote", json!({ "guid": guid }))
            .await
    }
}
