//! Full tree snapshot taken before the secure pipeline deletes anything.

use crate::backup::BACKUP_TIMESTAMP_FORMAT;
use crate::error::{Result, SecureError};
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Sibling directory the snapshot of `root` is written to
pub fn snapshot_path(root: &Path, at: NaiveDateTime) -> Result<PathBuf> {
    let failed = |reason: &str| SecureError::SnapshotFailed {
        path: root.to_path_buf(),
        reason: reason.to_string(),
    };
    let canonical = std::fs::canonicalize(root).map_err(|e| failed(&e.to_string()))?;
    let name = canonical
        .file_name()
        .ok_or_else(|| failed("release root has no directory name"))?
        .to_string_lossy()
        .into_owned();
    let parent = canonical
        .parent()
        .ok_or_else(|| failed("release root has no parent directory"))?;
    Ok(parent.join(format!("{}_backup_{}", name, at.format(BACKUP_TIMESTAMP_FORMAT))))
}

/// Count non-directory entries below `dir`
fn count_files(dir: &Path) -> Result<usize> {
    let mut count = 0;
    for entry in walkdir::WalkDir::new(dir) {
        let entry = entry.map_err(|e| SecureError::SnapshotFailed {
            path: dir.to_path_buf(),
            reason: e.to_string(),
        })?;
        if !entry.file_type().is_dir() {
            count += 1;
        }
    }
    Ok(count)
}

/// Copy `from` to `to` and verify the copy has the same number of files.
///
/// Fails if `to` already exists. Returns the number of files copied.
pub async fn snapshot_tree(from: &Path, to: &Path) -> Result<usize> {
    let failed = |reason: String| SecureError::SnapshotFailed {
        path: to.to_path_buf(),
        reason,
    };

    if !from.is_dir() {
        return Err(failed(format!("{} is not a directory", from.display())).into());
    }
    if to.exists() {
        return Err(failed("snapshot destination already exists".to_string()).into());
    }

    let mut copied = 0;
    for entry in walkdir::WalkDir::new(from) {
        let entry = entry.map_err(|e| failed(e.to_string()))?;
        let rel_path = entry
            .path()
            .strip_prefix(from)
            .map_err(|e| failed(e.to_string()))?;
        let dest_path = to.join(rel_path);

        if entry.file_type().is_symlink() {
            let target = fs::read_link(entry.path())
                .await
                .map_err(|e| failed(e.to_string()))?;
            symlink(&target, &dest_path).map_err(|e| failed(e.to_string()))?;
            copied += 1;
        } else if entry.file_type().is_dir() {
            fs::create_dir_all(&dest_path)
                .await
                .map_err(|e| failed(e.to_string()))?;
        } else {
            fs::copy(entry.path(), &dest_path)
                .await
                .map_err(|e| failed(format!("{}: {}", rel_path.display(), e)))?;
            copied += 1;
        }
    }

    let expected = count_files(from)?;
    let found = count_files(to)?;
    if expected != found {
        return Err(failed(format!(
            "file count mismatch: {} in tree, {} in snapshot",
            expected, found
        ))
        .into());
    }

    log::info!("Snapshot of {} files written to {}", copied, to.display());
    Ok(copied)
}

#[cfg(unix)]
fn symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    if target.is_dir() {
        std::os::windows::fs::symlink_dir(target, link)
    } else {
        std::os::windows::fs::symlink_file(target, link)
    }
}
