//! Timestamped backups of required files and their restoration.
//!
//! Backups are flat copies named `<stem>-<DD-MM-YYYY_HH-MM-SS><ext>` inside
//! the backup directory. Two runs within the same second write the same name;
//! the later copy wins.
//!
//! Lookup requires the file stem to match exactly: backups of `a.py` never
//! include `a2-….py` or `a-old-….py`.

use crate::error::{BackupError, Result};
use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// `strftime` format of the backup timestamp component
pub const BACKUP_TIMESTAMP_FORMAT: &str = "%d-%m-%Y_%H-%M-%S";

/// A backup copy of one required file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupRecord {
    /// Original file, relative to the tree root
    pub original_path: PathBuf,
    /// Backup file (absolute)
    pub backup_path: PathBuf,
    /// Timestamp encoded in the backup name
    pub created_at: NaiveDateTime,
}

/// Manages the backup directory of one working tree
#[derive(Debug, Clone)]
pub struct BackupManager {
    root: PathBuf,
    backup_dir: PathBuf,
}

/// Split a file name into stem and extension (with leading dot, or empty)
fn split_name(relative: &Path) -> (String, String) {
    let stem = relative
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = relative
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    (stem, ext)
}

/// Backup file name for a file at a given timestamp
pub fn backup_file_name(relative: &Path, at: NaiveDateTime) -> String {
    let (stem, ext) = split_name(relative);
    format!("{stem}-{}{ext}", at.format(BACKUP_TIMESTAMP_FORMAT))
}

/// Parse the timestamp out of a backup name if it belongs to `relative`
pub fn parse_backup_name(relative: &Path, file_name: &str) -> Option<NaiveDateTime> {
    let (stem, ext) = split_name(relative);
    let rest = file_name.strip_prefix(&stem)?.strip_prefix('-')?;
    let stamp = rest.strip_suffix(ext.as_str())?;
    NaiveDateTime::parse_from_str(stamp, BACKUP_TIMESTAMP_FORMAT).ok()
}

impl BackupManager {
    /// Create a manager for `root`, storing backups under `backup_dir`
    pub fn new(root: impl Into<PathBuf>, backup_dir: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            backup_dir: backup_dir.into(),
        }
    }

    /// Backup directory (absolute)
    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    fn ensure_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.backup_dir).map_err(|e| BackupError::CreateDirFailed {
            path: self.backup_dir.clone(),
            reason: e.to_string(),
        })?;
        Ok(())
    }

    /// Copy one file into the backup directory
    pub fn backup_file(&self, relative: &Path, at: NaiveDateTime) -> Result<BackupRecord> {
        self.ensure_dir()?;

        let source_path = self.root.join(relative);
        let backup_path = self.backup_dir.join(backup_file_name(relative, at));

        std::fs::copy(&source_path, &backup_path).map_err(|e| BackupError::CopyFailed {
            source_path: source_path.clone(),
            backup_path: backup_path.clone(),
            reason: e.to_string(),
        })?;
        log::debug!("Backed up {} -> {}", source_path.display(), backup_path.display());

        Ok(BackupRecord {
            original_path: relative.to_path_buf(),
            backup_path,
            created_at: at,
        })
    }

    /// Back up every file with one shared run timestamp.
    ///
    /// Files whose names collide are refused before anything is copied.
    pub fn backup_all<'p, I>(&self, files: I, at: NaiveDateTime) -> Result<Vec<BackupRecord>>
    where
        I: IntoIterator<Item = &'p Path>,
    {
        let files: Vec<&Path> = files.into_iter().collect();
        let mut seen: HashMap<&OsStr, &Path> = HashMap::new();
        for relative in &files {
            let Some(name) = relative.file_name() else {
                continue;
            };
            if let Some(first) = seen.insert(name, relative) {
                return Err(BackupError::DuplicateName {
                    first: first.to_path_buf(),
                    second: relative.to_path_buf(),
                    name: name.to_string_lossy().into_owned(),
                }
                .into());
            }
        }

        files
            .into_iter()
            .map(|relative| self.backup_file(relative, at))
            .collect()
    }

    /// All backups of a file, newest first.
    ///
    /// Ordered by last-modified time, then by the timestamp in the name.
    pub fn list_backups(&self, relative: &Path) -> Result<Vec<BackupRecord>> {
        if !self.backup_dir.is_dir() {
            return Ok(Vec::new());
        }

        let (stem, ext) = split_name(relative);
        let pattern = format!(
            "{}/{}-*{}",
            glob::Pattern::escape(&self.backup_dir.to_string_lossy()),
            glob::Pattern::escape(&stem),
            glob::Pattern::escape(&ext),
        );
        let entries = glob::glob(&pattern).map_err(|e| BackupError::InvalidPattern {
            pattern: pattern.clone(),
            reason: e.to_string(),
        })?;

        let mut found: Vec<(SystemTime, BackupRecord)> = Vec::new();
        for entry in entries {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    log::warn!("Skipping unreadable backup entry: {}", e);
                    continue;
                }
            };
            if !path.is_file() {
                continue;
            }
            let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
                continue;
            };
            let Some(created_at) = parse_backup_name(relative, &name) else {
                continue;
            };
            let modified = std::fs::metadata(&path)
                .and_then(|m| m.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            found.push((
                modified,
                BackupRecord {
                    original_path: relative.to_path_buf(),
                    backup_path: path,
                    created_at,
                },
            ));
        }

        found.sort_by(|(ma, a), (mb, b)| mb.cmp(ma).then(b.created_at.cmp(&a.created_at)));
        Ok(found.into_iter().map(|(_, record)| record).collect())
    }

    /// Restore a file from its newest backup, overwriting in place.
    ///
    /// Returns `None` when no backup exists; nothing is written in that case.
    pub fn restore_latest(&self, relative: &Path) -> Result<Option<BackupRecord>> {
        let Some(latest) = self.list_backups(relative)?.into_iter().next() else {
            log::warn!("No backup available for {}", relative.display());
            return Ok(None);
        };

        let target = self.root.join(relative);
        let restore = || -> std::io::Result<()> {
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::copy(&latest.backup_path, &target)?;
            Ok(())
        };
        restore().map_err(|e| BackupError::RestoreFailed {
            target: target.clone(),
            backup_path: latest.backup_path.clone(),
            reason: e.to_string(),
        })?;
        log::info!(
            "Restored {} from {}",
            target.display(),
            latest.backup_path.display()
        );

        Ok(Some(latest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::time::Duration;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 10, 19)
            .and_then(|d| d.and_hms_opt(h, m, s))
            .expect("valid timestamp")
    }

    fn set_mtime(path: &Path, secs_after_epoch: u64) {
        let file = std::fs::File::options()
            .write(true)
            .open(path)
            .expect("open for mtime");
        file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs_after_epoch))
            .expect("set mtime");
    }

    #[test]
    fn test_backup_name_format() {
        assert_eq!(
            backup_file_name(Path::new("datax.py"), at(14, 11, 42)),
            "datax-19-10-2025_14-11-42.py"
        );
        assert_eq!(
            backup_file_name(Path::new("core/LICENSE"), at(9, 5, 1)),
            "LICENSE-19-10-2025_09-05-01"
        );
    }

    #[test]
    fn test_parse_requires_exact_stem() {
        let name = "a2-19-10-2025_14-11-42.py";
        assert_eq!(parse_backup_name(Path::new("a.py"), name), None);
        assert_eq!(
            parse_backup_name(Path::new("a2.py"), name),
            Some(at(14, 11, 42))
        );
        assert_eq!(
            parse_backup_name(Path::new("a.py"), "a-old-19-10-2025_14-11-42.py"),
            None
        );
        assert_eq!(
            parse_backup_name(Path::new("a.py"), "a-19-10-2025_14-11-42.txt"),
            None
        );
    }

    #[test]
    fn test_backup_all_creates_one_file_per_entry() {
        let dir = tempfile::tempdir().expect("tempdir");
        for name in ["a.py", "b.py", "c.py"] {
            std::fs::write(dir.path().join(name), name).expect("write");
        }
        let manager = BackupManager::new(dir.path(), dir.path().join("backup"));

        let files = [Path::new("a.py"), Path::new("b.py"), Path::new("c.py")];
        let records = manager.backup_all(files, at(10, 0, 0)).expect("backup");

        assert_eq!(records.len(), 3);
        let count = std::fs::read_dir(dir.path().join("backup"))
            .expect("read backup dir")
            .count();
        assert_eq!(count, 3);
        for record in &records {
            let name = record
                .backup_path
                .file_name()
                .expect("file name")
                .to_string_lossy()
                .into_owned();
            assert!(name.contains("19-10-2025_10-00-00"), "{name}");
            let stem = record.original_path.file_stem().expect("stem");
            assert!(name.starts_with(&*stem.to_string_lossy()));
        }
    }

    #[test]
    fn test_backup_all_refuses_colliding_names() {
        let dir = tempfile::tempdir().expect("tempdir");
        for (path, content) in [("core/app.py", "CORE"), ("ui/app.py", "UI")] {
            let full = dir.path().join(path);
            std::fs::create_dir_all(full.parent().expect("parent")).expect("mkdir");
            std::fs::write(full, content).expect("write");
        }
        let manager = BackupManager::new(dir.path(), dir.path().join("backup"));

        let files = [Path::new("core/app.py"), Path::new("ui/app.py")];
        let err = manager
            .backup_all(files, at(10, 0, 0))
            .expect_err("names collide");

        assert!(err.to_string().contains("app.py"), "{err}");
        assert!(!dir.path().join("backup").exists());
    }

    #[test]
    fn test_backup_missing_source_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let manager = BackupManager::new(dir.path(), dir.path().join("backup"));
        assert!(manager.backup_file(Path::new("absent.py"), at(1, 2, 3)).is_err());
    }

    #[test]
    fn test_restore_picks_most_recent_backup() {
        let dir = tempfile::tempdir().expect("tempdir");
        let backup_dir = dir.path().join("backup");
        std::fs::create_dir(&backup_dir).expect("mkdir");

        let older = backup_dir.join("a-19-10-2025_09-00-00.py");
        let newer = backup_dir.join("a-19-10-2025_10-00-00.py");
        let lookalike = backup_dir.join("a2-19-10-2025_11-00-00.py");
        std::fs::write(&older, "older").expect("write");
        std::fs::write(&newer, "newer").expect("write");
        std::fs::write(&lookalike, "other file").expect("write");
        set_mtime(&older, 1_000);
        set_mtime(&newer, 2_000);
        set_mtime(&lookalike, 3_000);

        let manager = BackupManager::new(dir.path(), &backup_dir);
        let restored = manager
            .restore_latest(Path::new("a.py"))
            .expect("restore")
            .expect("a backup exists");

        assert_eq!(restored.backup_path, newer);
        let content = std::fs::read_to_string(dir.path().join("a.py")).expect("read");
        assert_eq!(content, "newer");
    }

    #[test]
    fn test_restore_overwrites_partial_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let manager = BackupManager::new(dir.path(), dir.path().join("backup"));
        std::fs::write(dir.path().join("a.py"), "full").expect("write");
        manager.backup_file(Path::new("a.py"), at(8, 0, 0)).expect("backup");
        std::fs::write(dir.path().join("a.py"), "trunc").expect("write");

        manager.restore_latest(Path::new("a.py")).expect("restore");
        let content = std::fs::read_to_string(dir.path().join("a.py")).expect("read");
        assert_eq!(content, "full");
    }

    #[test]
    fn test_restore_without_backup_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let manager = BackupManager::new(dir.path(), dir.path().join("backup"));

        for _ in 0..2 {
            let restored = manager.restore_latest(Path::new("gone.py")).expect("restore");
            assert!(restored.is_none());
        }
        assert!(!dir.path().join("gone.py").exists());
        assert!(!dir.path().join("backup").exists());
    }

    #[test]
    fn test_restore_recreates_parent_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir(dir.path().join("core")).expect("mkdir");
        std::fs::write(dir.path().join("core/app.py"), "app").expect("write");
        let manager = BackupManager::new(dir.path(), dir.path().join("backup"));
        manager
            .backup_file(Path::new("core/app.py"), at(7, 0, 0))
            .expect("backup");

        std::fs::remove_dir_all(dir.path().join("core")).expect("rm");
        manager
            .restore_latest(Path::new("core/app.py"))
            .expect("restore")
            .expect("backup exists");
        assert!(dir.path().join("core/app.py").is_file());
    }
}
