//! Release orchestration for the stable, beta, paired-beta and special modes.
//!
//! Order of a run: preflight, backup, then per planned commit the version
//! write, stage, commit, branch push and tag, then dispatch, wait, pull and the
//! restoration pass. Only preflight, backup and the version write can abort.

use crate::backup::BackupManager;
use crate::cli::RuntimeConfig;
use crate::error::{CliError, Result};
use crate::git::{GitOperations, RemoteHandle};
use crate::github::{DispatchOutcome, DispatchRequest, WorkflowTrigger};
use crate::pipeline::plan::{CommitPlan, ReleaseRequest, TagStyle};
use crate::pipeline::step::{RunReport, Step};
use crate::pipeline::wait::WaitStrategy;
use crate::version::{ReleaseMode, write_version_file};
use crate::workspace::{PreflightValidator, WorkspaceHandle};
use chrono::{Local, NaiveDateTime};

/// Default workflow file name
pub const DEFAULT_WORKFLOW: &str = "build.yml";

/// Drives one release run against explicit workspace and remote handles
pub struct ReleaseOrchestrator<'a, G, T, W> {
    workspace: &'a WorkspaceHandle,
    remote: &'a RemoteHandle,
    git: &'a G,
    trigger: &'a T,
    wait: &'a W,
    config: &'a RuntimeConfig,
    workflow: String,
    started_at: NaiveDateTime,
}

impl<'a, G, T, W> ReleaseOrchestrator<'a, G, T, W>
where
    G: GitOperations,
    T: WorkflowTrigger,
    W: WaitStrategy,
{
    /// Create an orchestrator; the run timestamp is taken now
    pub fn new(
        workspace: &'a WorkspaceHandle,
        remote: &'a RemoteHandle,
        git: &'a G,
        trigger: &'a T,
        wait: &'a W,
        config: &'a RuntimeConfig,
    ) -> Self {
        Self {
            workspace,
            remote,
            git,
            trigger,
            wait,
            config,
            workflow: DEFAULT_WORKFLOW.to_string(),
            started_at: Local::now().naive_local(),
        }
    }

    /// Workflow dispatched by `--dispatch`
    pub fn with_workflow(mut self, workflow: impl Into<String>) -> Self {
        self.workflow = workflow.into();
        self
    }

    /// Override the run timestamp shared by all backups
    pub fn with_timestamp(mut self, at: NaiveDateTime) -> Self {
        self.started_at = at;
        self
    }

    /// Execute a release
    pub async fn run(&self, request: &ReleaseRequest) -> Result<RunReport> {
        if request.mode == ReleaseMode::Secure {
            return Err(CliError::InvalidArguments {
                reason: "secure releases run through the secure pipeline".to_string(),
            }
            .into());
        }

        let config = self.config;
        let mut report = RunReport::default();
        let plans = request.plan();

        config.section(&match &request.version {
            Some(v) => format!("{} {}", request.mode.name(), v),
            None => request.mode.name().to_string(),
        });

        let preflight = PreflightValidator::new(self.workspace).ensure();
        if let Some(preflight) = report.settle(Step::Preflight, None, preflight, config)? {
            config.success_println(&preflight.summary());
        }

        let backups = BackupManager::new(self.workspace.root(), self.workspace.backup_dir());
        let records = backups.backup_all(self.workspace.required().files(), self.started_at);
        if let Some(records) = report.settle(Step::Backup, None, records, config)? {
            config.success_println(&format!(
                "Backed up {} file(s) to {}",
                records.len(),
                backups.backup_dir().display()
            ));
            report.backups = records;
        }

        for plan in &plans {
            self.commit_and_tag(plan, request, &mut report).await?;
        }

        if !plans.iter().any(|p| p.tag.is_some()) {
            return Ok(report);
        }

        if request.dispatch {
            self.dispatch(&plans, request, &mut report).await?;
        } else if let Some(repo) = &self.remote.repository {
            config.info_println(&format!(
                "Tag push triggers the build: {}",
                repo.workflow_url(&self.workflow)
            ));
        }

        config.info_println(&self.wait.describe());
        report.settle(Step::Wait, None, self.wait.wait().await, config)?;

        let pulled = self.git.pull(&self.remote.name, &self.remote.branch).await;
        if report
            .settle(Step::Pull, Some(self.remote.branch.as_str()), pulled, config)?
            .is_some()
        {
            config.success_println(&format!(
                "Pulled {}/{}",
                self.remote.name, self.remote.branch
            ));
        }

        self.restore_missing(&backups, &mut report);

        Ok(report)
    }

    async fn commit_and_tag(
        &self,
        plan: &CommitPlan,
        request: &ReleaseRequest,
        report: &mut RunReport,
    ) -> Result<()> {
        let config = self.config;
        let subject = plan.tag.as_ref().map(|t| t.name.as_str());

        if let Some(value) = &plan.file_version {
            let path = self.workspace.resolve(self.workspace.version_file());
            report.settle(
                Step::WriteVersion,
                Some(value.as_str()),
                write_version_file(&path, value),
                config,
            )?;
            config.success_println(&format!(
                "Set {} to {}",
                self.workspace.version_file().display(),
                value
            ));
        }

        let staged = if request.commit_all {
            self.git.stage_all().await
        } else {
            self.git.stage(&self.workspace.staged_paths()).await
        };
        report.settle(Step::Stage, subject, staged, config)?;

        let commit = self.git.commit(&plan.message).await;
        if let Some(commit) = report.settle(Step::Commit, subject, commit, config)? {
            let short = commit.hash.get(..7).unwrap_or(commit.hash.as_str());
            config.success_println(&format!("Committed {}: {}", short, commit.message));
        }

        let pushed = self
            .git
            .push_branch(&self.remote.name, &self.remote.branch, false)
            .await;
        if report
            .settle(Step::PushBranch, Some(self.remote.branch.as_str()), pushed, config)?
            .is_some()
        {
            config.success_println(&format!(
                "Pushed {} to {}",
                self.remote.branch, self.remote.name
            ));
        }

        let Some(tag) = &plan.tag else {
            return Ok(());
        };

        let deleted = self.git.delete_local_tag(&tag.name).await;
        report.settle(Step::DeleteTag, Some(tag.name.as_str()), deleted, config)?;

        let message = match tag.style {
            TagStyle::Annotated => Some(plan.message.as_str()),
            TagStyle::Lightweight => None,
        };
        let created = self.git.create_tag(&tag.name, message).await;
        if report
            .settle(Step::CreateTag, Some(tag.name.as_str()), created, config)?
            .is_none()
        {
            return Ok(());
        }
        report.tags.push(tag.name.clone());

        let pushed = self
            .git
            .push_tag(&self.remote.name, &tag.name, tag.push.is_forced())
            .await;
        if let Some(push) = report.settle(Step::PushTag, Some(tag.name.as_str()), pushed, config)? {
            config.success_println(&format!(
                "Pushed tag {}{}",
                tag.name,
                if push.forced { " (forced)" } else { "" }
            ));
        }

        Ok(())
    }

    async fn dispatch(
        &self,
        plans: &[CommitPlan],
        request: &ReleaseRequest,
        report: &mut RunReport,
    ) -> Result<()> {
        let config = self.config;
        let mut dispatch = DispatchRequest::new(&self.workflow, &self.remote.branch);
        if let Some(version) = plans.last().and_then(|p| p.file_version.as_deref()) {
            dispatch = dispatch.input("version", version);
        }
        if request.is_paired()
            && let Some(base) = plans.first().and_then(|p| p.file_version.as_deref())
        {
            dispatch = dispatch.input("base_version", base);
        }

        match self.trigger.dispatch(&dispatch).await {
            Ok(DispatchOutcome::Manual { url, reason }) => {
                let target = url.as_deref().unwrap_or("the repository's Actions page");
                report.warn(
                    Step::Dispatch,
                    Some(self.workflow.as_str()),
                    format!(
                        "Could not dispatch {} ({}); trigger it manually at {}",
                        self.workflow, reason, target
                    ),
                    config,
                );
                report.dispatch = Some(DispatchOutcome::Manual { url, reason });
            }
            other => {
                if let Some(outcome) =
                    report.settle(Step::Dispatch, Some(self.workflow.as_str()), other, config)?
                {
                    config.success_println(&format!("Dispatched {}", self.workflow));
                    report.dispatch = Some(outcome);
                }
            }
        }
        Ok(())
    }

    /// Put back required files the remote round-trip removed
    fn restore_missing(&self, backups: &BackupManager, report: &mut RunReport) {
        let config = self.config;
        for relative in self.workspace.required().files() {
            if self.workspace.resolve(relative).exists() {
                report.already_present.push(relative.to_path_buf());
                continue;
            }

            let subject = relative.to_string_lossy();
            match backups.restore_latest(relative) {
                Ok(Some(record)) => {
                    config.success_println(&format!(
                        "Restored {} from {}",
                        relative.display(),
                        record.backup_path.display()
                    ));
                    report.restored.push(relative.to_path_buf());
                }
                Ok(None) => report.warn(
                    Step::Restore,
                    Some(subject.as_ref()),
                    format!("No backup found for {}", relative.display()),
                    config,
                ),
                Err(e) => report.warn(
                    Step::Restore,
                    Some(subject.as_ref()),
                    format!("Could not restore {}: {}", relative.display(), e),
                    config,
                ),
            }
        }
    }
}
