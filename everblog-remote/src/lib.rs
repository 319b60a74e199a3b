//! # everblog-remote
//!
//! The [`NoteStore`] seam between the sync engine and the note service, plus
//! [`HttpNoteStore`], its JSON-over-HTTP implementation.

pub mod error;
pub mod http;
pub mod store;

pub use error::RemoteError;
pub use http::HttpNoteStore;
pub use store::NoteStore;
