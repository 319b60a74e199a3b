//! Local file side of a sync: hash-gated atomic writes and deletion of posts
//! that no longer qualify.
//!
//! ## `atomic_write`
//!
//! 1. Normalise line endings and SHA-256 hash the rendered content.
//! 2. Skip when the file on disk hashes the same.
//! 3. Write to `<path>.everblog.tmp`, then rename over the final path.
//! 4. Record the new hash (the caller saves the build state).

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use everblog_core::paths;

use crate::error::{io_err, SyncError};
use crate::state::FileHashes;

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Outcome of an individual file write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteResult {
    /// File was written (content changed or did not previously exist).
    Written { path: PathBuf },
    /// Rendered content matches the recorded hash; file left alone.
    Unchanged { path: PathBuf },
    /// Dry run: the file would have been written.
    WouldWrite { path: PathBuf },
}

impl WriteResult {
    pub fn path(&self) -> &Path {
        match self {
            Self::Written { path } | Self::Unchanged { path } | Self::WouldWrite { path } => path,
        }
    }
}

/// Outcome of removing one post that no longer qualifies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteResult {
    /// Post removed, together with its image directory when there was one.
    Deleted {
        path: PathBuf,
        images: Option<PathBuf>,
    },
    /// Dry run: the post (and image directory) would have been removed.
    WouldDelete {
        path: PathBuf,
        images: Option<PathBuf>,
    },
}

impl DeleteResult {
    pub fn path(&self) -> &Path {
        match self {
            Self::Deleted { path, .. } | Self::WouldDelete { path, .. } => path,
        }
    }

    pub fn images(&self) -> Option<&Path> {
        match self {
            Self::Deleted { images, .. } | Self::WouldDelete { images, .. } => images.as_deref(),
        }
    }
}

// ---------------------------------------------------------------------------
// atomic_write
// ---------------------------------------------------------------------------

/// Key under which `path` is recorded in the build state: relative to the
/// site, `/`-separated.
pub(crate) fn state_key(site: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(site).unwrap_or(path);
    rel.to_string_lossy().replace('\\', "/")
}

fn content_digest(content: &str) -> String {
    hex::encode(Sha256::digest(content.replace("\r\n", "\n").as_bytes()))
}

/// Digest of what is on disk at `path`, `None` when there is no regular
/// file there.
fn disk_digest(path: &Path) -> Result<Option<String>, SyncError> {
    if !path.is_file() {
        return Ok(None);
    }
    let bytes = std::fs::read(path).map_err(|e| io_err(path, e))?;
    Ok(Some(content_digest(&String::from_utf8_lossy(&bytes))))
}

/// Atomically write `content` to `path`, skipping the write when the file
/// on disk already holds the same content.
pub(crate) fn atomic_write(
    site: &Path,
    path: &Path,
    content: &str,
    hashes: &mut FileHashes,
    dry_run: bool,
) -> Result<WriteResult, SyncError> {
    let tmp = PathBuf::from(format!("{}.everblog.tmp", path.display()));
    atomic_write_with_tmp(site, path, content, hashes, dry_run, &tmp)
}

fn atomic_write_with_tmp(
    site: &Path,
    path: &Path,
    content: &str,
    hashes: &mut FileHashes,
    dry_run: bool,
    tmp: &Path,
) -> Result<WriteResult, SyncError> {
    let normalized = content.replace("\r\n", "\n");
    let content = normalized.as_str();

    let digest = content_digest(content);

    let key = state_key(site, path);
    if disk_digest(path)?.as_ref() == Some(&digest) {
        tracing::debug!("unchanged: {}", path.display());
        hashes.insert(key, digest);
        return Ok(WriteResult::Unchanged {
            path: path.to_path_buf(),
        });
    }

    if dry_run {
        tracing::info!("[dry-run] would write: {}", path.display());
        return Ok(WriteResult::WouldWrite {
            path: path.to_path_buf(),
        });
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    if let Some(tmp_parent) = tmp.parent() {
        std::fs::create_dir_all(tmp_parent).map_err(|e| io_err(tmp_parent, e))?;
    }
    std::fs::write(tmp, content).map_err(|e| io_err(tmp, e))?;

    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(path, e));
    }

    hashes.insert(key, digest);

    tracing::info!("wrote: {}", path.display());
    Ok(WriteResult::Written {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Deletion
// ---------------------------------------------------------------------------

/// Remove `dir` depth-first: files and sub-directories, then `dir` itself.
/// Symlinks inside `dir` are unlinked, never followed.
pub fn remove_dir_recursive(dir: &Path) -> Result<(), SyncError> {
    let entries = std::fs::read_dir(dir).map_err(|e| io_err(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| io_err(&path, e))?;
        if file_type.is_dir() {
            remove_dir_recursive(&path)?;
        } else {
            std::fs::remove_file(&path).map_err(|e| io_err(&path, e))?;
        }
    }
    std::fs::remove_dir(dir).map_err(|e| io_err(dir, e))
}

/// Remove whatever is at `path` without following it: a real directory is
/// removed recursively, a file or symlink is unlinked.
fn remove_entry(path: &Path) -> Result<(), SyncError> {
    let meta = std::fs::symlink_metadata(path).map_err(|e| io_err(path, e))?;
    if meta.is_dir() {
        remove_dir_recursive(path)
    } else {
        std::fs::remove_file(path).map_err(|e| io_err(path, e))
    }
}

/// True for a directory or a symlink, which is not followed.
fn is_image_entry(path: &Path) -> bool {
    std::fs::symlink_metadata(path).is_ok_and(|meta| meta.is_dir() || meta.file_type().is_symlink())
}

/// `Hello.html` → `Hello`, `v1.2.html` → `v1.2`, `notes` → `notes`.
pub(crate) fn post_stem(file_name: &str) -> &str {
    match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file_name,
    }
}

/// Delete every post under `source/_posts/` whose stem is not in
/// `qualifying`, together with `source/images/<stem>/`. Hidden entries are
/// ignored and a missing posts directory counts as empty.
pub fn reconcile_local_files(
    site: &Path,
    qualifying: &BTreeSet<String>,
    dry_run: bool,
) -> Result<Vec<DeleteResult>, SyncError> {
    let posts = paths::posts_dir(site);
    let entries = match std::fs::read_dir(&posts) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(io_err(&posts, e)),
    };

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| io_err(&posts, e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.starts_with('.') {
            names.push(name);
        }
    }
    names.sort();

    let mut results = Vec::new();
    for name in names {
        let stem = post_stem(&name);
        if qualifying.contains(stem) {
            continue;
        }
        let path = posts.join(&name);
        let images = Some(paths::image_dir(site, stem)).filter(|dir| is_image_entry(dir));

        if dry_run {
            tracing::info!("[dry-run] would delete: {}", path.display());
            results.push(DeleteResult::WouldDelete { path, images });
            continue;
        }

        if let Some(dir) = &images {
            remove_entry(dir)?;
        }
        if path.is_dir() {
            tracing::warn!("removing directory in posts: {}", path.display());
        }
        remove_entry(&path)?;
        tracing::info!("deleted: {}", path.display());
        results.push(DeleteResult::Deleted { path, images });
    }
    Ok(results)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_content(site: &Path, path: &Path, content: &str) -> WriteResult {
        let mut hashes = FileHashes::new();
        atomic_write(site, path, content, &mut hashes, false).unwrap()
    }

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x").unwrap();
    }

    fn qualifying(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn first_write_returns_written_and_creates_parents() {
        let site = TempDir::new().unwrap();
        let path = paths::post_path(site.path(), "Hello");
        let result = write_content(site.path(), &path, "hello");
        assert!(matches!(result, WriteResult::Written { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello");
    }

    #[test]
    fn second_write_same_content_returns_unchanged() {
        let site = TempDir::new().unwrap();
        let path = paths::post_path(site.path(), "Hello");
        let mut hashes = FileHashes::new();
        atomic_write(site.path(), &path, "same", &mut hashes, false).unwrap();
        let result = atomic_write(site.path(), &path, "same", &mut hashes, false).unwrap();
        assert!(matches!(result, WriteResult::Unchanged { .. }));
    }

    #[test]
    fn edited_file_is_rewritten_despite_recorded_hash() {
        let site = TempDir::new().unwrap();
        let path = paths::post_path(site.path(), "Hello");
        let mut hashes = FileHashes::new();
        atomic_write(site.path(), &path, "rendered", &mut hashes, false).unwrap();
        fs::write(&path, "edited by hand").unwrap();

        let result = atomic_write(site.path(), &path, "rendered", &mut hashes, false).unwrap();
        assert!(matches!(result, WriteResult::Written { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "rendered");
    }

    #[test]
    fn identical_file_without_recorded_hash_is_unchanged() {
        let site = TempDir::new().unwrap();
        let path = paths::post_path(site.path(), "Hello");
        touch(&path);
        fs::write(&path, "same\r\n").unwrap();
        let mut hashes = FileHashes::new();

        let result = atomic_write(site.path(), &path, "same\n", &mut hashes, false).unwrap();
        assert!(matches!(result, WriteResult::Unchanged { .. }));
        assert!(hashes.contains_key("source/_posts/Hello.html"));
    }

    #[test]
    fn recorded_hash_does_not_hide_a_deleted_file() {
        let site = TempDir::new().unwrap();
        let path = paths::post_path(site.path(), "Hello");
        let mut hashes = FileHashes::new();
        atomic_write(site.path(), &path, "same", &mut hashes, false).unwrap();
        fs::remove_file(&path).unwrap();

        let result = atomic_write(site.path(), &path, "same", &mut hashes, false).unwrap();
        assert!(matches!(result, WriteResult::Written { .. }));
        assert!(path.exists());
    }

    #[test]
    fn hashes_are_keyed_relative_to_site() {
        let site = TempDir::new().unwrap();
        let path = paths::post_path(site.path(), "Hello");
        let mut hashes = FileHashes::new();
        atomic_write(site.path(), &path, "x", &mut hashes, false).unwrap();
        assert!(hashes.contains_key("source/_posts/Hello.html"), "{hashes:?}");
    }

    #[test]
    fn dry_run_does_not_write_file() {
        let site = TempDir::new().unwrap();
        let path = paths::post_path(site.path(), "Nope");
        let mut hashes = FileHashes::new();
        let result = atomic_write(site.path(), &path, "content", &mut hashes, true).unwrap();
        assert!(matches!(result, WriteResult::WouldWrite { .. }));
        assert!(!path.exists());
        assert!(hashes.is_empty());
    }

    #[test]
    fn tmp_file_removed_after_write() {
        let site = TempDir::new().unwrap();
        let path = paths::post_path(site.path(), "Clean");
        write_content(site.path(), &path, "data");
        let tmp_path = PathBuf::from(format!("{}.everblog.tmp", path.display()));
        assert!(!tmp_path.exists());
    }

    #[test]
    fn crlf_and_lf_content_share_the_same_hash() {
        let site = TempDir::new().unwrap();
        let path = paths::post_path(site.path(), "Normalize");
        let mut hashes = FileHashes::new();
        atomic_write(site.path(), &path, "a\r\nb\r\n", &mut hashes, false).unwrap();
        let second = atomic_write(site.path(), &path, "a\nb\n", &mut hashes, false).unwrap();
        assert!(matches!(second, WriteResult::Unchanged { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "a\nb\n");
    }

    #[test]
    fn rename_failure_leaves_target_and_cleans_tmp() {
        let site = TempDir::new().unwrap();
        // A non-empty directory where the post should go makes the rename fail.
        let path = paths::post_path(site.path(), "Blocked");
        touch(&path.join("keep.txt"));

        let tmp_dir = TempDir::new().unwrap();
        let tmp_path = tmp_dir.path().join("Blocked.html.everblog.tmp");
        let mut hashes = FileHashes::new();
        let result =
            atomic_write_with_tmp(site.path(), &path, "new", &mut hashes, false, &tmp_path);

        assert!(matches!(result, Err(SyncError::Io { .. })));
        assert!(path.join("keep.txt").exists());
        assert!(!tmp_path.exists());
        assert!(hashes.is_empty());
    }

    #[test]
    fn remove_dir_recursive_removes_nested_tree() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("images").join("Goodbye");
        touch(&dir.join("a.png"));
        touch(&dir.join("nested").join("deeper").join("b.png"));
        fs::create_dir_all(dir.join("empty")).unwrap();

        remove_dir_recursive(&dir).unwrap();
        assert!(!dir.exists());
        assert!(root.path().join("images").exists());
    }

    #[test]
    fn remove_dir_recursive_reports_missing_path() {
        let root = TempDir::new().unwrap();
        let missing = root.path().join("missing");
        match remove_dir_recursive(&missing) {
            Err(SyncError::Io { path, .. }) => assert_eq!(path, missing),
            other => panic!("expected Io error, got {other:?}"),
        }
    }

    #[test]
    fn post_stem_drops_only_the_final_extension() {
        assert_eq!(post_stem("Hello.html"), "Hello");
        assert_eq!(post_stem("Release 1.2.html"), "Release 1.2");
        assert_eq!(post_stem("README"), "README");
    }

    #[test]
    fn reconcile_deletes_orphans_with_their_images() {
        let site = TempDir::new().unwrap();
        touch(&paths::post_path(site.path(), "Hello"));
        touch(&paths::post_path(site.path(), "Goodbye"));
        touch(&paths::image_dir(site.path(), "Goodbye").join("pic.png"));
        touch(&paths::image_dir(site.path(), "Hello").join("pic.png"));

        let results = reconcile_local_files(site.path(), &qualifying(&["Hello"]), false).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].path(), paths::post_path(site.path(), "Goodbye"));
        assert_eq!(
            results[0].images(),
            Some(paths::image_dir(site.path(), "Goodbye").as_path())
        );
        assert!(!paths::post_path(site.path(), "Goodbye").exists());
        assert!(!paths::image_dir(site.path(), "Goodbye").exists());
        assert!(paths::post_path(site.path(), "Hello").exists());
        assert!(paths::image_dir(site.path(), "Hello").exists());
    }

    #[test]
    fn reconcile_ignores_hidden_entries() {
        let site = TempDir::new().unwrap();
        let hidden = paths::posts_dir(site.path()).join(".DS_Store");
        touch(&hidden);

        let results = reconcile_local_files(site.path(), &qualifying(&[]), false).unwrap();
        assert!(results.is_empty());
        assert!(hidden.exists());
    }

    #[test]
    fn reconcile_without_posts_dir_is_a_no_op() {
        let site = TempDir::new().unwrap();
        let results = reconcile_local_files(site.path(), &qualifying(&[]), false).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn reconcile_orphan_without_images_reports_none() {
        let site = TempDir::new().unwrap();
        touch(&paths::post_path(site.path(), "Lonely"));
        let results = reconcile_local_files(site.path(), &qualifying(&[]), false).unwrap();
        assert_eq!(
            results,
            vec![DeleteResult::Deleted {
                path: paths::post_path(site.path(), "Lonely"),
                images: None,
            }]
        );
    }

    #[test]
    #[cfg(unix)]
    fn reconcile_unlinks_symlinked_images_without_following() {
        let site = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        let precious = outside.path().join("precious.png");
        fs::write(&precious, "png").unwrap();

        let post = paths::post_path(site.path(), "Goodbye");
        let images = paths::image_dir(site.path(), "Goodbye");
        touch(&post);
        fs::create_dir_all(images.parent().unwrap()).unwrap();
        std::os::unix::fs::symlink(outside.path(), &images).unwrap();

        let results = reconcile_local_files(site.path(), &qualifying(&[]), false).unwrap();

        assert_eq!(results[0].images(), Some(images.as_path()));
        assert!(fs::symlink_metadata(&images).is_err());
        assert!(!post.exists());
        assert!(precious.exists());
    }

    #[test]
    #[cfg(unix)]
    fn remove_dir_recursive_unlinks_nested_symlinks() {
        let root = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        fs::write(outside.path().join("keep.png"), "png").unwrap();
        let dir = root.path().join("Goodbye");
        fs::create_dir_all(&dir).unwrap();
        std::os::unix::fs::symlink(outside.path(), dir.join("linked")).unwrap();

        remove_dir_recursive(&dir).unwrap();
        assert!(!dir.exists());
        assert!(outside.path().join("keep.png").exists());
    }

    #[test]
    fn reconcile_dry_run_keeps_everything() {
        let site = TempDir::new().unwrap();
        let post = paths::post_path(site.path(), "Goodbye");
        let images = paths::image_dir(site.path(), "Goodbye");
        touch(&post);
        touch(&images.join("pic.png"));

        let results = reconcile_local_files(site.path(), &qualifying(&[]), true).unwrap();
        assert!(matches!(results[0], DeleteResult::WouldDelete { .. }));
        assert!(post.exists());
        assert!(images.exists());
    }
}
