//! Remote handle.

use crate::github::RepoSlug;

/// The remote a release pushes to and pulls from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteHandle {
    /// Remote name (e.g. `origin`)
    pub name: String,
    /// Branch pushed and pulled
    pub branch: String,
    /// Hosting repository, when known
    pub repository: Option<RepoSlug>,
}

impl RemoteHandle {
    /// Create a handle
    pub fn new(name: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            branch: branch.into(),
            repository: None,
        }
    }

    /// Attach the hosting repository
    pub fn with_repository(mut self, repository: Option<RepoSlug>) -> Self {
        self.repository = repository;
        self
    }
}
