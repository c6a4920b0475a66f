//! Source stripping and artifact cleanup.
//!
//! The root is scanned non-recursively; each configured strip directory is
//! scanned recursively. Nothing outside those two scopes is touched.

use crate::config::SecureConfig;
use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// How a file is treated by the strip pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileClass {
    /// On the allow-list, never deleted
    Keep,
    /// Source text, deleted
    Source,
    /// Intermediate build output, deleted
    Artifact,
    /// Anything else, left alone
    Other,
}

/// Files removed and removals that failed
#[derive(Debug, Clone, Default)]
pub struct RemovalSummary {
    /// Removed paths, relative to the root
    pub removed: Vec<PathBuf>,
    /// Paths that could not be removed, with the reason
    pub failed: Vec<(PathBuf, String)>,
}

impl RemovalSummary {
    fn merge(&mut self, other: RemovalSummary) {
        self.removed.extend(other.removed);
        self.failed.extend(other.failed);
    }
}

/// Classification rules for one secure build
#[derive(Debug, Clone)]
pub struct StripPolicy<'a> {
    config: &'a SecureConfig,
    keep: BTreeSet<String>,
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension().map(|e| e.to_string_lossy().to_lowercase())
}

impl<'a> StripPolicy<'a> {
    /// Policy from configuration, keeping `extra_keep` file names as well
    pub fn new<I, S>(config: &'a SecureConfig, extra_keep: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut keep: BTreeSet<String> = config.keep_files.iter().cloned().collect();
        keep.extend(extra_keep.into_iter().map(Into::into));
        Self { config, keep }
    }

    /// Classify a file by name and extension
    pub fn classify(&self, path: &Path) -> FileClass {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if self.keep.contains(&name) {
            return FileClass::Keep;
        }
        match extension_of(path) {
            Some(ext) if self.config.source_extensions.contains(&ext) => FileClass::Source,
            Some(ext) if self.config.artifact_extensions.contains(&ext) => FileClass::Artifact,
            _ => FileClass::Other,
        }
    }

    /// Every file in scope: root files, then files below the strip directories
    fn files_in_scope(&self, root: &Path) -> Vec<PathBuf> {
        let mut files = Vec::new();
        if let Ok(entries) = std::fs::read_dir(root) {
            for entry in entries.flatten() {
                if entry.file_type().is_ok_and(|t| t.is_file()) {
                    files.push(entry.path());
                }
            }
        }
        for dir in &self.config.strip_dirs {
            let base = root.join(dir);
            if !base.is_dir() {
                continue;
            }
            files.extend(
                walkdir::WalkDir::new(&base)
                    .into_iter()
                    .filter_map(|e| e.ok())
                    .filter(|e| e.file_type().is_file())
                    .map(|e| e.into_path()),
            );
        }
        files.sort();
        files
    }

    /// Directories in scope whose name is an artifact directory
    fn artifact_dirs_in_scope(&self, root: &Path) -> Vec<PathBuf> {
        let is_artifact = |path: &Path| {
            path.file_name()
                .is_some_and(|n| self.config.artifact_dirs.iter().any(|a| n == a.as_str()))
        };
        let mut dirs: Vec<PathBuf> = self
            .config
            .artifact_dirs
            .iter()
            .map(|name| root.join(name))
            .filter(|p| p.is_dir())
            .collect();
        for dir in &self.config.strip_dirs {
            let base = root.join(dir);
            if !base.is_dir() {
                continue;
            }
            let mut walker = walkdir::WalkDir::new(&base).min_depth(1).into_iter();
            while let Some(Ok(entry)) = walker.next() {
                if entry.file_type().is_dir() && is_artifact(entry.path()) {
                    dirs.push(entry.into_path());
                    walker.skip_current_dir();
                }
            }
        }
        dirs
    }

    fn remove_matching(&self, root: &Path, class: FileClass) -> RemovalSummary {
        let mut summary = RemovalSummary::default();
        for path in self.files_in_scope(root) {
            if self.classify(&path) != class {
                continue;
            }
            let relative = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
            match std::fs::remove_file(&path) {
                Ok(()) => {
                    log::debug!("Removed {}", relative.display());
                    summary.removed.push(relative);
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => summary.failed.push((relative, e.to_string())),
            }
        }
        summary
    }

    /// Delete source files in scope
    pub fn strip_sources(&self, root: &Path) -> RemovalSummary {
        self.remove_matching(root, FileClass::Source)
    }

    /// Delete artifact directories and intermediate files in scope
    pub fn clean_artifacts(&self, root: &Path) -> RemovalSummary {
        let mut summary = RemovalSummary::default();
        for dir in self.artifact_dirs_in_scope(root) {
            let relative = dir.strip_prefix(root).unwrap_or(&dir).to_path_buf();
            match std::fs::remove_dir_all(&dir) {
                Ok(()) => {
                    log::debug!("Removed directory {}", relative.display());
                    summary.removed.push(relative);
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => summary.failed.push((relative, e.to_string())),
            }
        }
        summary.merge(self.remove_matching(root, FileClass::Artifact));
        summary
    }
}
