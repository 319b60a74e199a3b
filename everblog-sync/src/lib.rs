//! # everblog-sync
//!
//! Builds a blog site from a notebook (or tag) of remote notes.
//!
//! [`pipeline::sync_site`] resolves the target collection, pages through its
//! notes, renders every note that changed since the last build into
//! `source/_posts/`, and deletes posts whose note no longer qualifies.
//! Writes are hash-gated and atomic; the build state is saved only after a
//! complete, successful run.

pub mod engine;
pub mod error;
pub mod pipeline;
pub mod state;
pub mod writer;

pub use engine::{Listing, SyncEngine, TargetKind, NOTE_KEY_LEN};
pub use error::SyncError;
pub use pipeline::{run, sync_site, SyncOptions, SyncReport};
pub use state::BuildState;
pub use writer::{DeleteResult, WriteResult};
