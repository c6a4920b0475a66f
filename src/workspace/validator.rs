//! Required-file preflight.
//!
//! The only abort-early gate of the normal pipeline: nothing is mutated until
//! every required entry has been found.

use crate::error::{PreflightError, Result};
use crate::workspace::{EntryKind, WorkspaceHandle};
use std::path::PathBuf;

/// Preflight validator over a workspace's required set
#[derive(Debug)]
pub struct PreflightValidator<'a> {
    workspace: &'a WorkspaceHandle,
}

/// Preflight result
#[derive(Debug, Clone)]
pub struct PreflightReport {
    /// Per-entry checks in declaration order
    pub checks: Vec<PreflightCheck>,
}

/// Individual entry check
#[derive(Debug, Clone)]
pub struct PreflightCheck {
    /// Entry path relative to the root
    pub path: PathBuf,
    /// Expected kind
    pub kind: EntryKind,
    /// Whether the entry exists with the expected kind
    pub present: bool,
}

impl<'a> PreflightValidator<'a> {
    /// Create a validator for a workspace
    pub fn new(workspace: &'a WorkspaceHandle) -> Self {
        Self { workspace }
    }

    /// Check every required entry. Read-only.
    pub fn check(&self) -> PreflightReport {
        let checks = self
            .workspace
            .required()
            .entries()
            .iter()
            .map(|entry| {
                let full = self.workspace.resolve(&entry.path);
                let present = match entry.kind {
                    EntryKind::File => full.is_file(),
                    EntryKind::Directory => full.is_dir(),
                };
                if !present {
                    log::debug!("Required entry missing: {}", full.display());
                }
                PreflightCheck {
                    path: entry.path.clone(),
                    kind: entry.kind,
                    present,
                }
            })
            .collect();

        PreflightReport { checks }
    }

    /// Check and convert a non-empty missing set into an error
    pub fn ensure(&self) -> Result<PreflightReport> {
        let report = self.check();
        let missing = report.missing();
        if missing.is_empty() {
            Ok(report)
        } else {
            Err(PreflightError::MissingEntries { missing }.into())
        }
    }
}

impl PreflightReport {
    /// Entries that failed the check
    pub fn missing(&self) -> Vec<PathBuf> {
        self.checks
            .iter()
            .filter(|c| !c.present)
            .map(|c| c.path.clone())
            .collect()
    }

    /// Whether all entries were found
    pub fn passed(&self) -> bool {
        self.checks.iter().all(|c| c.present)
    }

    /// One-line summary
    pub fn summary(&self) -> String {
        let total = self.checks.len();
        let present = self.checks.iter().filter(|c| c.present).count();
        if self.passed() {
            format!("All {} required entries present", total)
        } else {
            format!("{}/{} required entries present", present, total)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::RequiredFileSet;

    fn handle(root: &std::path::Path) -> WorkspaceHandle {
        WorkspaceHandle::new(
            root,
            RequiredFileSet::new(
                vec![PathBuf::from("a.py"), PathBuf::from("b.py")],
                vec![PathBuf::from("core")],
            ),
            "version.py",
            "backup",
        )
        .expect("handle")
    }

    #[test]
    fn test_all_present() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("a.py"), "a").expect("write");
        std::fs::write(dir.path().join("b.py"), "b").expect("write");
        std::fs::create_dir(dir.path().join("core")).expect("mkdir");

        let workspace = handle(dir.path());
        let report = PreflightValidator::new(&workspace).ensure().expect("passes");
        assert!(report.passed());
        assert_eq!(report.summary(), "All 3 required entries present");
    }

    #[test]
    fn test_reports_missing_entries() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("a.py"), "a").expect("write");

        let workspace = handle(dir.path());
        let report = PreflightValidator::new(&workspace).check();
        assert_eq!(
            report.missing(),
            vec![PathBuf::from("b.py"), PathBuf::from("core")]
        );
        assert!(PreflightValidator::new(&workspace).ensure().is_err());
    }

    #[test]
    fn test_directory_must_be_a_container() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("a.py"), "a").expect("write");
        std::fs::write(dir.path().join("b.py"), "b").expect("write");
        std::fs::write(dir.path().join("core"), "not a dir").expect("write");

        let workspace = handle(dir.path());
        assert_eq!(
            PreflightValidator::new(&workspace).check().missing(),
            vec![PathBuf::from("core")]
        );
    }

    #[test]
    fn test_file_must_not_be_a_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir(dir.path().join("a.py")).expect("mkdir");
        std::fs::write(dir.path().join("b.py"), "b").expect("write");
        std::fs::create_dir(dir.path().join("core")).expect("mkdir");

        let workspace = handle(dir.path());
        assert_eq!(
            PreflightValidator::new(&workspace).check().missing(),
            vec![PathBuf::from("a.py")]
        );
    }
}
