//! Everblog core library: domain types, site configuration, site layout.
//!
//! - [`types`]: remote entities and newtypes
//! - [`config`]: `everblog.yaml` load / save / resolve
//! - [`paths`]: where posts, images and build state live
//! - [`error`]: [`ConfigError`]

pub mod config;
pub mod error;
pub mod paths;
pub mod types;

pub use config::{RemoteConfig, Settings, SiteConfig, Target};
pub use error::ConfigError;
pub use types::{
    FetchedNote, Guid, NoteFilter, NoteMetadata, Notebook, NotesPage, PublicUserInfo, Tag,
    Timestamp, User,
};
