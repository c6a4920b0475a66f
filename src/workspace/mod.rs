//! Working tree handle and required-file preflight.
//!
//! The working tree is passed explicitly to every pipeline step through a
//! [`WorkspaceHandle`], never read from the process working directory.

mod validator;

pub use validator::{PreflightCheck, PreflightReport, PreflightValidator};

use crate::config::ProjectConfig;
use crate::error::{PreflightError, Result};
use std::path::{Path, PathBuf};

/// Kind of required entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular file, backed up and restored
    File,
    /// Directory, only checked for presence
    Directory,
}

/// One entry of the required set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredEntry {
    /// Path relative to the tree root
    pub path: PathBuf,
    /// Expected kind
    pub kind: EntryKind,
}

/// Ordered set of entries that must exist before a release mutates anything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequiredFileSet {
    entries: Vec<RequiredEntry>,
}

impl RequiredFileSet {
    /// Build a set from files followed by directories, dropping duplicates
    pub fn new<F, D>(files: F, dirs: D) -> Self
    where
        F: IntoIterator<Item = PathBuf>,
        D: IntoIterator<Item = PathBuf>,
    {
        let mut set = Self::default();
        for path in files {
            set.push(path, EntryKind::File);
        }
        for path in dirs {
            set.push(path, EntryKind::Directory);
        }
        set
    }

    fn push(&mut self, path: PathBuf, kind: EntryKind) {
        if !self.entries.iter().any(|e| e.path == path) {
            self.entries.push(RequiredEntry { path, kind });
        }
    }

    /// All entries in declaration order
    pub fn entries(&self) -> &[RequiredEntry] {
        &self.entries
    }

    /// File entries only
    pub fn files(&self) -> impl Iterator<Item = &Path> {
        self.entries
            .iter()
            .filter(|e| e.kind == EntryKind::File)
            .map(|e| e.path.as_path())
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Explicit handle to the working tree a release operates on
#[derive(Debug, Clone)]
pub struct WorkspaceHandle {
    root: PathBuf,
    required: RequiredFileSet,
    version_file: PathBuf,
    backup_dir: PathBuf,
}

impl WorkspaceHandle {
    /// Create a handle; relative settings are resolved against `root`
    pub fn new(
        root: impl Into<PathBuf>,
        required: RequiredFileSet,
        version_file: impl Into<PathBuf>,
        backup_dir: impl Into<PathBuf>,
    ) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(PreflightError::RootNotFound { path: root }.into());
        }
        Ok(Self {
            root,
            required,
            version_file: version_file.into(),
            backup_dir: backup_dir.into(),
        })
    }

    /// Create a handle from project configuration
    pub fn from_config(root: impl Into<PathBuf>, config: &ProjectConfig) -> Result<Self> {
        Self::new(
            root,
            RequiredFileSet::new(
                config.required_files.iter().cloned(),
                config.required_dirs.iter().cloned(),
            ),
            config.version_file.clone(),
            config.backup_dir.clone(),
        )
    }

    /// Tree root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Required entries
    pub fn required(&self) -> &RequiredFileSet {
        &self.required
    }

    /// Version file path relative to the root
    pub fn version_file(&self) -> &Path {
        &self.version_file
    }

    /// Absolute backup directory
    pub fn backup_dir(&self) -> PathBuf {
        self.root.join(&self.backup_dir)
    }

    /// Resolve a root-relative path
    pub fn resolve(&self, relative: &Path) -> PathBuf {
        self.root.join(relative)
    }

    /// Paths staged by an explicit (non commit-all) commit
    pub fn staged_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self
            .required
            .entries()
            .iter()
            .map(|e| e.path.clone())
            .collect();
        if !paths.contains(&self.version_file) {
            paths.push(self.version_file.clone());
        }
        paths
    }
}
