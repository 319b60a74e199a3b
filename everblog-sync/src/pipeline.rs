//! Sync pipeline entrypoints used by the CLI.
//!
//! [`sync_site`] runs one build against any [`NoteStore`]; [`run`] wires it
//! to the HTTP gateway on a current-thread runtime.

use std::collections::HashSet;
use std::future::Future;

use chrono::Utc;

use everblog_core::{paths, Guid, Settings, Target, Timestamp};
use everblog_remote::{HttpNoteStore, NoteStore};
use everblog_renderer::Renderer;

use crate::engine::{self, SyncEngine};
use crate::error::SyncError;
use crate::state;
use crate::writer::{self, DeleteResult, WriteResult};

/// Per-run switches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncOptions {
    /// Read remote data but share, write, delete and save nothing.
    pub dry_run: bool,
    /// Overrides the build state's `last_build`.
    pub last_build: Option<Timestamp>,
}

/// What one sync did (or would do, in a dry run).
#[derive(Debug)]
pub struct SyncReport {
    pub target: Target,
    pub dry_run: bool,
    pub last_build: Timestamp,
    pub pages: u32,
    pub writes: Vec<WriteResult>,
    pub skipped: Vec<String>,
    pub deletions: Vec<DeleteResult>,
}

/// Build `settings.site` from the notes in its target collection.
///
/// Nothing is persisted unless every step succeeds; the build state is saved
/// last, with the time the run started.
pub async fn sync_site<S: NoteStore>(
    store: &S,
    settings: &Settings,
    options: &SyncOptions,
) -> Result<SyncReport, SyncError> {
    let started_at = Utc::now();
    let site = settings.site.as_path();
    let mut build_state = state::load_at(site)?;
    let last_build = options
        .last_build
        .unwrap_or_else(|| build_state.last_build_timestamp());
    tracing::info!(
        "syncing {} into {} (last build {last_build})",
        settings.target,
        site.display()
    );

    let filter = engine::resolve_filter_target(store, &settings.target).await?;

    let mut renderer = Renderer::with_templates(settings.templates_dir.as_deref())?;
    renderer.set_web_api_url_prefix(Some(engine::get_web_api_url_prefix(store).await?));

    let listing = SyncEngine::new(store, site, &settings.target)
        .page_size(settings.page_size)
        .last_build(last_build)
        .share_notes(!options.dry_run)
        .list_qualifying_notes(&filter)
        .await?;

    let mut writes = Vec::new();
    for note in &listing.fetched {
        let content = renderer.render_post(note)?;
        let path = paths::post_path(site, &note.name);
        writes.push(writer::atomic_write(
            site,
            &path,
            &content,
            &mut build_state.files,
            options.dry_run,
        )?);
    }
    if let Some(site_config) = &listing.site_config {
        let path = paths::site_config_path(site);
        writes.push(writer::atomic_write(
            site,
            &path,
            &site_config.content,
            &mut build_state.files,
            options.dry_run,
        )?);
    }

    let deletions = writer::reconcile_local_files(site, &listing.qualifying, options.dry_run)?;

    if !options.dry_run {
        let mut tracked: HashSet<String> = listing
            .qualifying
            .iter()
            .map(|name| writer::state_key(site, &paths::post_path(site, name)))
            .collect();
        tracked.insert(writer::state_key(site, &paths::site_config_path(site)));
        build_state.files.retain(|key, _| tracked.contains(key));
        build_state.last_build = started_at;
        state::save_at(site, &build_state)?;
    }

    Ok(SyncReport {
        target: settings.target.clone(),
        dry_run: options.dry_run,
        last_build,
        pages: listing.pages,
        writes,
        skipped: listing.skipped,
        deletions,
    })
}

fn block_on<F: Future>(future: F) -> Result<F::Output, SyncError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(SyncError::Runtime)?;
    Ok(runtime.block_on(future))
}

/// Run one sync against the configured HTTP gateway.
pub fn run(settings: &Settings, options: &SyncOptions) -> Result<SyncReport, SyncError> {
    let store = HttpNoteStore::new(&settings.remote)?;
    block_on(sync_site(&store, settings, options))?
}

/// The account's web API URL prefix.
pub fn web_api_url_prefix(settings: &Settings) -> Result<String, SyncError> {
    let store = HttpNoteStore::new(&settings.remote)?;
    Ok(block_on(engine::get_web_api_url_prefix(&store))??)
}

/// Share one note and return its note key.
pub fn share(settings: &Settings, guid: &Guid) -> Result<String, SyncError> {
    let store = HttpNoteStore::new(&settings.remote)?;
    Ok(block_on(engine::get_note_key(&store, guid))??)
}
