//! Explicit remote workflow dispatch.
//!
//! Tries the `gh` CLI first, then the REST API with a token from the
//! environment. When neither is usable the caller gets a manual URL instead of
//! an error.

use crate::config::EnvConfig;
use crate::error::{Result, WorkflowError};
use crate::github::RepoSlug;
use serde::Serialize;
use std::collections::BTreeMap;
use std::future::Future;
use std::path::PathBuf;

/// GitHub REST API base URL
pub const API_BASE: &str = "https://api.github.com";

/// A request to start a named workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchRequest {
    /// Workflow file name or id
    pub workflow: String,
    /// Branch or tag the workflow runs against
    pub git_ref: String,
    /// Workflow inputs
    pub inputs: BTreeMap<String, String>,
}

impl DispatchRequest {
    /// Request without inputs
    pub fn new(workflow: impl Into<String>, git_ref: impl Into<String>) -> Self {
        Self {
            workflow: workflow.into(),
            git_ref: git_ref.into(),
            inputs: BTreeMap::new(),
        }
    }

    /// Add an input parameter
    pub fn input(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.inputs.insert(key.into(), value.into());
        self
    }
}

/// How a dispatch was delivered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Started through the `gh` CLI
    Cli,
    /// Started through the REST API
    Api,
    /// Nothing could start it; the operator must trigger it by hand
    Manual {
        /// Workflow page, when the repository is known
        url: Option<String>,
        /// Why automatic dispatch was skipped
        reason: String,
    },
}

/// Something that can start a remote workflow
pub trait WorkflowTrigger {
    /// Dispatch a workflow run
    fn dispatch(&self, request: &DispatchRequest)
    -> impl Future<Output = Result<DispatchOutcome>>;
}

#[derive(Serialize)]
struct DispatchPayload<'a> {
    #[serde(rename = "ref")]
    git_ref: &'a str,
    inputs: &'a BTreeMap<String, String>,
}

/// GitHub Actions dispatcher
#[derive(Debug, Clone)]
pub struct GitHubDispatcher {
    work_dir: PathBuf,
    repository: Option<RepoSlug>,
    token: Option<String>,
    gh_path: Option<PathBuf>,
    client: reqwest::Client,
}

impl GitHubDispatcher {
    /// Create a dispatcher; `use_cli` enables lookup of `gh` on `PATH`
    pub fn new(
        work_dir: impl Into<PathBuf>,
        repository: Option<RepoSlug>,
        env: &EnvConfig,
        use_cli: bool,
    ) -> Self {
        let gh_path = if use_cli { which::which("gh").ok() } else { None };
        Self {
            work_dir: work_dir.into(),
            repository,
            token: env.github_token(),
            gh_path,
            client: reqwest::Client::new(),
        }
    }

    fn manual(&self, request: &DispatchRequest, reason: impl Into<String>) -> DispatchOutcome {
        DispatchOutcome::Manual {
            url: self
                .repository
                .as_ref()
                .map(|repo| repo.workflow_url(&request.workflow)),
            reason: reason.into(),
        }
    }

    async fn dispatch_with_cli(&self, gh: &PathBuf, request: &DispatchRequest) -> Result<()> {
        let mut command = tokio::process::Command::new(gh);
        command
            .args([
                "workflow",
                "run",
                request.workflow.as_str(),
                "--ref",
                request.git_ref.as_str(),
            ])
            .current_dir(&self.work_dir);
        if let Some(repo) = &self.repository {
            command.args(["--repo", repo.to_string().as_str()]);
        }
        for (key, value) in &request.inputs {
            command.args(["-f", format!("{key}={value}").as_str()]);
        }

        let output = command.output().await.map_err(|e| WorkflowError::CliFailed {
            reason: e.to_string(),
        })?;
        if !output.status.success() {
            return Err(WorkflowError::CliFailed {
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }
        Ok(())
    }

    async fn dispatch_with_api(
        &self,
        repo: &RepoSlug,
        token: &str,
        request: &DispatchRequest,
    ) -> Result<()> {
        let url = format!(
            "{}/repos/{}/{}/actions/workflows/{}/dispatches",
            API_BASE, repo.owner, repo.name, request.workflow
        );
        let payload = DispatchPayload {
            git_ref: &request.git_ref,
            inputs: &request.inputs,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .header("User-Agent", "gamesstore_release")
            .json(&payload)
            .send()
            .await
            .map_err(|e| WorkflowError::RequestFailed {
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(WorkflowError::Rejected {
                status,
                body: rejection_message(&body),
            }
            .into());
        }
        Ok(())
    }
}

/// The `message` field of a GitHub error body, or the raw body
fn rejection_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message")?.as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

impl WorkflowTrigger for GitHubDispatcher {
    async fn dispatch(&self, request: &DispatchRequest) -> Result<DispatchOutcome> {
        if let Some(gh) = &self.gh_path {
            match self.dispatch_with_cli(gh, request).await {
                Ok(()) => {
                    log::info!("Dispatched {} via gh", request.workflow);
                    return Ok(DispatchOutcome::Cli);
                }
                Err(e) => log::warn!("gh dispatch failed, trying the API: {}", e),
            }
        }

        let Some(token) = self.token.as_deref() else {
            return Ok(self.manual(request, "gh CLI unavailable and no API token set"));
        };
        let Some(repo) = self.repository.as_ref() else {
            return Ok(self.manual(request, "GitHub repository unknown"));
        };

        self.dispatch_with_api(repo, token, request).await?;
        log::info!("Dispatched {} via API on {}", request.workflow, repo);
        Ok(DispatchOutcome::Api)
    }
}
