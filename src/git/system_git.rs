//! [`GitOperations`] backed by the system `git` binary.

use crate::error::{GitError, Result};
use crate::git::{CommitInfo, GitOperations, PushInfo, TagInfo};
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Captured output of a successful git invocation
struct GitOutput {
    stdout: String,
}

/// Git client running `git` in a fixed working tree
#[derive(Debug, Clone)]
pub struct SystemGit {
    work_dir: PathBuf,
}

impl SystemGit {
    /// Client for `work_dir` without checking it is a repository
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
        }
    }

    /// Client for `work_dir`, failing when it is not inside a work tree
    pub async fn open(work_dir: impl Into<PathBuf>) -> Result<Self> {
        let git = Self::new(work_dir);
        let inside = git
            .run(&["rev-parse", "--is-inside-work-tree"])
            .await
            .map(|out| out.stdout.trim() == "true")
            .unwrap_or(false);
        if !inside {
            return Err(GitError::NotRepository.into());
        }
        Ok(git)
    }

    /// Working tree this client operates on
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    async fn run(&self, args: &[&str]) -> Result<GitOutput> {
        let command = args.join(" ");
        log::debug!("git {}", command);

        let output = Command::new("git")
            .args(args)
            .current_dir(&self.work_dir)
            .output()
            .await
            .map_err(|e| GitError::SpawnFailed {
                command: command.clone(),
                reason: e.to_string(),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            let detail = if stderr.trim().is_empty() {
                stdout.trim().to_string()
            } else {
                stderr.trim().to_string()
            };
            return Err(GitError::CommandFailed {
                command,
                stderr: detail,
            }
            .into());
        }

        Ok(GitOutput { stdout })
    }
}

/// Whether git's commit failure output means nothing was staged
fn is_nothing_to_commit(detail: &str) -> bool {
    let lower = detail.to_lowercase();
    lower.contains("nothing to commit") || lower.contains("nothing added to commit")
}

impl GitOperations for SystemGit {
    async fn stage(&self, paths: &[PathBuf]) -> Result<()> {
        let rendered: Vec<String> = paths
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect();
        let mut args = vec!["add", "--"];
        args.extend(rendered.iter().map(String::as_str));
        self.run(&args).await?;
        Ok(())
    }

    async fn stage_all(&self) -> Result<()> {
        self.run(&["add", "-A"]).await?;
        Ok(())
    }

    async fn commit(&self, message: &str) -> Result<CommitInfo> {
        match self.run(&["commit", "-m", message]).await {
            Ok(_) => {}
            Err(crate::error::ReleaseError::Git(GitError::CommandFailed { stderr, .. }))
                if is_nothing_to_commit(&stderr) =>
            {
                return Err(GitError::NothingToCommit.into());
            }
            Err(e) => return Err(e),
        }

        let hash = self.run(&["rev-parse", "HEAD"]).await?.stdout.trim().to_string();
        Ok(CommitInfo {
            hash,
            message: message.to_string(),
        })
    }

    async fn push_branch(&self, remote: &str, branch: &str, force: bool) -> Result<PushInfo> {
        let mut args = vec!["push"];
        if force {
            args.push("--force");
        }
        args.extend([remote, branch]);
        self.run(&args).await?;
        Ok(PushInfo {
            remote_name: remote.to_string(),
            refspec: branch.to_string(),
            forced: force,
        })
    }

    async fn delete_local_tag(&self, tag: &str) -> Result<()> {
        self.run(&["tag", "-d", tag]).await?;
        Ok(())
    }

    async fn create_tag(&self, tag: &str, message: Option<&str>) -> Result<TagInfo> {
        match message {
            Some(msg) => self.run(&["tag", "-a", tag, "-m", msg]).await?,
            None => self.run(&["tag", tag]).await?,
        };
        Ok(TagInfo {
            name: tag.to_string(),
            message: message.map(str::to_string),
            is_annotated: message.is_some(),
        })
    }

    async fn push_tag(&self, remote: &str, tag: &str, force: bool) -> Result<PushInfo> {
        let refspec = format!("refs/tags/{tag}");
        let mut args = vec!["push"];
        if force {
            args.push("--force");
        }
        args.extend([remote, refspec.as_str()]);
        self.run(&args).await?;
        Ok(PushInfo {
            remote_name: remote.to_string(),
            refspec,
            forced: force,
        })
    }

    async fn pull(&self, remote: &str, branch: &str) -> Result<()> {
        self.run(&["pull", remote, branch]).await?;
        Ok(())
    }

    async fn remote_url(&self, remote: &str) -> Result<String> {
        match self.run(&["remote", "get-url", remote]).await {
            Ok(out) => Ok(out.stdout.trim().to_string()),
            Err(_) => Err(GitError::RemoteNotFound {
                remote: remote.to_string(),
            }
            .into()),
        }
    }

    async fn reinitialize(&self, branch: &str, remote: &str, url: &str) -> Result<()> {
        let git_dir = self.work_dir.join(".git");
        if git_dir.exists() {
            tokio::fs::remove_dir_all(&git_dir).await?;
            log::info!("Removed {}", git_dir.display());
        }

        self.run(&["init"]).await?;
        let head = format!("refs/heads/{branch}");
        self.run(&["symbolic-ref", "HEAD", head.as_str()]).await?;
        self.run(&["remote", "add", remote, url]).await?;
        Ok(())
    }
}
