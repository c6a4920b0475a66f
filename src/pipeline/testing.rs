//! Recording fakes for pipeline tests.

use crate::error::{GitError, Result};
use crate::git::{CommitInfo, GitOperations, PushInfo, RemoteHandle, TagInfo};
use crate::github::{DispatchOutcome, DispatchRequest, WorkflowTrigger};
use crate::workspace::{RequiredFileSet, WorkspaceHandle};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

pub const FAKE_REMOTE_URL: &str = "git@github.com:gamesstore/GamesStore.git";

pub fn run_at() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 15)
        .and_then(|d| d.and_hms_opt(14, 30, 0))
        .expect("valid timestamp")
}

pub struct FixtureTree {
    // Keeps the directory alive for the test's duration
    _dir: TempDir,
    pub root: PathBuf,
    pub workspace: WorkspaceHandle,
    pub remote: RemoteHandle,
}

impl FixtureTree {
    pub fn path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.root.join(relative)
    }

    pub fn write(&self, relative: impl AsRef<Path>, content: &str) {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent");
        }
        std::fs::write(path, content).expect("write fixture");
    }
}

/// Tree whose required set is uxmod.py, xcore.py and datax.py, with only
/// `present` created on disk
pub fn fixture_tree(present: &[&str]) -> FixtureTree {
    fixture_tree_with_version(present, "version.py")
}

pub fn fixture_tree_with_version(present: &[&str], version_file: &str) -> FixtureTree {
    let dir = TempDir::new().expect("tempdir");
    let root = dir.path().join("GamesStore");
    std::fs::create_dir(&root).expect("create root");
    for name in present {
        std::fs::write(root.join(name), format!("# {name}")).expect("write fixture");
    }
    let required = RequiredFileSet::new(
        ["uxmod.py", "xcore.py", "datax.py"].map(PathBuf::from),
        Vec::new(),
    );
    let workspace =
        WorkspaceHandle::new(&root, required, version_file, "backup").expect("workspace");
    FixtureTree {
        _dir: dir,
        root,
        workspace,
        remote: RemoteHandle::new("origin", "main"),
    }
}

/// Git fake that records every call and models local tags
#[derive(Default)]
pub struct RecordingGit {
    calls: Mutex<Vec<String>>,
    tags: Mutex<BTreeSet<String>>,
    failing: HashSet<&'static str>,
    delete_on_pull: Vec<PathBuf>,
    dangle_on_pull: Vec<PathBuf>,
}

impl RecordingGit {
    pub fn failing(mut self, operation: &'static str) -> Self {
        self.failing.insert(operation);
        self
    }

    pub fn with_tag(self, tag: &str) -> Self {
        self.tags.lock().expect("lock").insert(tag.to_string());
        self
    }

    /// Simulate the remote workflow deleting a file that comes back on pull
    pub fn deleting_on_pull(mut self, path: PathBuf) -> Self {
        self.delete_on_pull.push(path);
        self
    }

    /// Simulate a pull that leaves a dangling symlink where a file was
    #[cfg(unix)]
    pub fn dangling_on_pull(mut self, path: PathBuf) -> Self {
        self.dangle_on_pull.push(path);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("lock").clone()
    }

    fn record(&self, operation: &'static str, call: String) -> Result<()> {
        self.calls.lock().expect("lock").push(call);
        if self.failing.contains(operation) {
            return Err(GitError::CommandFailed {
                command: operation.to_string(),
                stderr: "simulated failure".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

fn forced(force: bool) -> &'static str {
    if force { " --force" } else { "" }
}

impl GitOperations for RecordingGit {
    async fn stage(&self, paths: &[PathBuf]) -> Result<()> {
        let joined: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
        self.record("stage", format!("stage {}", joined.join(" ")))
    }

    async fn stage_all(&self) -> Result<()> {
        self.record("stage_all", "stage_all".to_string())
    }

    async fn commit(&self, message: &str) -> Result<CommitInfo> {
        self.record("commit", format!("commit {message}"))?;
        Ok(CommitInfo {
            hash: "0123456789abcdef0123456789abcdef01234567".to_string(),
            message: message.to_string(),
        })
    }

    async fn push_branch(&self, remote: &str, branch: &str, force: bool) -> Result<PushInfo> {
        self.record(
            "push_branch",
            format!("push_branch {remote} {branch}{}", forced(force)),
        )?;
        Ok(PushInfo {
            remote_name: remote.to_string(),
            refspec: branch.to_string(),
            forced: force,
        })
    }

    async fn delete_local_tag(&self, tag: &str) -> Result<()> {
        self.record("delete_tag", format!("delete_tag {tag}"))?;
        if self.tags.lock().expect("lock").remove(tag) {
            Ok(())
        } else {
            Err(GitError::CommandFailed {
                command: format!("tag -d {tag}"),
                stderr: format!("error: tag '{tag}' not found."),
            }
            .into())
        }
    }

    async fn create_tag(&self, tag: &str, message: Option<&str>) -> Result<TagInfo> {
        let style = if message.is_some() { "annotated" } else { "lightweight" };
        self.record("create_tag", format!("create_tag {tag} {style}"))?;
        if !self.tags.lock().expect("lock").insert(tag.to_string()) {
            return Err(GitError::CommandFailed {
                command: format!("tag {tag}"),
                stderr: format!("fatal: tag '{tag}' already exists"),
            }
            .into());
        }
        Ok(TagInfo {
            name: tag.to_string(),
            message: message.map(str::to_string),
            is_annotated: message.is_some(),
        })
    }

    async fn push_tag(&self, remote: &str, tag: &str, force: bool) -> Result<PushInfo> {
        self.record("push_tag", format!("push_tag {remote} {tag}{}", forced(force)))?;
        Ok(PushInfo {
            remote_name: remote.to_string(),
            refspec: format!("refs/tags/{tag}"),
            forced: force,
        })
    }

    async fn pull(&self, remote: &str, branch: &str) -> Result<()> {
        self.record("pull", format!("pull {remote} {branch}"))?;
        for path in &self.delete_on_pull {
            let _ = std::fs::remove_file(path);
        }
        #[cfg(unix)]
        for path in &self.dangle_on_pull {
            let _ = std::fs::remove_file(path);
            let target = path.with_file_name("missing-dir").join("gone");
            std::os::unix::fs::symlink(target, path).expect("symlink");
        }
        Ok(())
    }

    async fn remote_url(&self, remote: &str) -> Result<String> {
        self.record("remote_url", format!("remote_url {remote}"))?;
        Ok(FAKE_REMOTE_URL.to_string())
    }

    async fn reinitialize(&self, branch: &str, remote: &str, url: &str) -> Result<()> {
        self.record("reinitialize", format!("reinitialize {branch} {remote} {url}"))?;
        self.tags.lock().expect("lock").clear();
        Ok(())
    }
}

/// Workflow trigger returning a fixed outcome
pub struct FakeTrigger {
    outcome: DispatchOutcome,
    requests: Mutex<Vec<DispatchRequest>>,
}

impl FakeTrigger {
    pub fn cli() -> Self {
        Self {
            outcome: DispatchOutcome::Cli,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn manual() -> Self {
        Self {
            outcome: DispatchOutcome::Manual {
                url: None,
                reason: "no credentials".to_string(),
            },
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<DispatchRequest> {
        self.requests.lock().expect("lock").clone()
    }
}

impl WorkflowTrigger for FakeTrigger {
    async fn dispatch(&self, request: &DispatchRequest) -> Result<DispatchOutcome> {
        self.requests.lock().expect("lock").push(request.clone());
        Ok(self.outcome.clone())
    }
}
