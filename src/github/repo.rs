//! GitHub repository identification.

use crate::error::{Result, WorkflowError};
use std::fmt;

/// `owner/name` of a GitHub repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSlug {
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub name: String,
}

impl RepoSlug {
    /// Parse `owner/name`
    pub fn parse(slug: &str) -> Result<Self> {
        let parts: Vec<&str> = slug.trim().split('/').collect();
        match parts.as_slice() {
            [owner, name] if !owner.is_empty() && !name.is_empty() => Ok(Self {
                owner: owner.to_string(),
                name: name.trim_end_matches(".git").to_string(),
            }),
            _ => Err(WorkflowError::UnknownRepository {
                reason: format!("invalid repository '{slug}', expected owner/name"),
            }
            .into()),
        }
    }

    /// Parse owner/name from a git remote URL.
    ///
    /// Supports Git URL formats:
    /// - SSH SCP-like: git@github.com:owner/repo.git
    /// - HTTPS: https://github.com/owner/repo.git
    pub fn from_remote_url(url: &str) -> Result<Self> {
        let url = url.trim();

        if url.contains('@') && url.contains(':') && !url.contains("://") {
            let parts: Vec<&str> = url.split(':').collect();
            if parts.len() == 2 {
                let path = parts[1].trim_end_matches(".git");
                if let Ok(slug) = Self::parse(path) {
                    return Ok(slug);
                }
            }
        }

        if let Some(path_start) = url.find("github.com/") {
            let path = url[path_start + 11..].trim_end_matches(".git");
            let parts: Vec<&str> = path.split('/').collect();
            if parts.len() >= 2 && !parts[0].is_empty() && !parts[1].is_empty() {
                return Ok(Self {
                    owner: parts[0].to_string(),
                    name: parts[1].to_string(),
                });
            }
        }

        Err(WorkflowError::UnknownRepository {
            reason: format!("could not parse GitHub owner/repo from URL '{url}'"),
        }
        .into())
    }

    /// Browser URL of a workflow's runs page
    pub fn workflow_url(&self, workflow: &str) -> String {
        format!(
            "https://github.com/{}/{}/actions/workflows/{}",
            self.owner, self.name, workflow
        )
    }
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ssh_url() {
        let slug = RepoSlug::from_remote_url("git@github.com:gamesstore/GamesStore.git")
            .expect("ssh url");
        assert_eq!(slug.to_string(), "gamesstore/GamesStore");
    }

    #[test]
    fn test_parse_https_url() {
        let slug = RepoSlug::from_remote_url("https://github.com/gamesstore/GamesStore.git\n")
            .expect("https url");
        assert_eq!(slug.owner, "gamesstore");
        assert_eq!(slug.name, "GamesStore");
    }

    #[test]
    fn test_parse_non_github_url_fails() {
        assert!(RepoSlug::from_remote_url("/srv/git/remote.git").is_err());
    }

    #[test]
    fn test_parse_slug() {
        assert!(RepoSlug::parse("owner/name").is_ok());
        assert!(RepoSlug::parse("owner").is_err());
        assert!(RepoSlug::parse("a/b/c").is_err());
        assert!(RepoSlug::parse("/name").is_err());
    }

    #[test]
    fn test_workflow_url() {
        let slug = RepoSlug::parse("o/r").expect("slug");
        assert_eq!(
            slug.workflow_url("build.yml"),
            "https://github.com/o/r/actions/workflows/build.yml"
        );
    }
}
