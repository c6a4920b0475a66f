//! Git operations trait and result types.
//!
//! The pipeline talks to version control only through [`GitOperations`], so
//! tests can drive it with a recording fake instead of a real repository.

use crate::error::Result;
use std::future::Future;
use std::path::PathBuf;

/// Version-control operations needed by the release pipelines
pub trait GitOperations {
    /// Stage specific paths (relative to the tree root)
    fn stage(&self, paths: &[PathBuf]) -> impl Future<Output = Result<()>>;

    /// Stage every change in the tree, including deletions
    fn stage_all(&self) -> impl Future<Output = Result<()>>;

    /// Commit staged changes
    fn commit(&self, message: &str) -> impl Future<Output = Result<CommitInfo>>;

    /// Push a branch to a remote
    fn push_branch(
        &self,
        remote: &str,
        branch: &str,
        force: bool,
    ) -> impl Future<Output = Result<PushInfo>>;

    /// Delete a local tag
    fn delete_local_tag(&self, tag: &str) -> impl Future<Output = Result<()>>;

    /// Create a tag on HEAD; annotated when a message is given
    fn create_tag(&self, tag: &str, message: Option<&str>) -> impl Future<Output = Result<TagInfo>>;

    /// Push a single tag to a remote
    fn push_tag(
        &self,
        remote: &str,
        tag: &str,
        force: bool,
    ) -> impl Future<Output = Result<PushInfo>>;

    /// Pull a remote branch into the current branch
    fn pull(&self, remote: &str, branch: &str) -> impl Future<Output = Result<()>>;

    /// URL configured for a remote
    fn remote_url(&self, remote: &str) -> impl Future<Output = Result<String>>;

    /// Erase all history and start a fresh repository on `branch` with `remote` re-added
    fn reinitialize(
        &self,
        branch: &str,
        remote: &str,
        url: &str,
    ) -> impl Future<Output = Result<()>>;
}

/// Information about a created commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    /// Commit hash (full SHA)
    pub hash: String,
    /// Commit message
    pub message: String,
}

/// Information about a created tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagInfo {
    /// Tag name
    pub name: String,
    /// Tag message (if annotated)
    pub message: Option<String>,
    /// Whether this is an annotated tag
    pub is_annotated: bool,
}

/// Information about a push
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushInfo {
    /// Remote name that was pushed to
    pub remote_name: String,
    /// Ref that was pushed
    pub refspec: String,
    /// Whether the push was forced
    pub forced: bool,
}
