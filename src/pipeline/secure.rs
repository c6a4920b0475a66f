//! Secure release: publish compiled modules only, with history erased.
//!
//! Destructive. The full tree is snapshotted next to the root before anything
//! is removed, and the run stops before stripping if the snapshot, the version
//! write or the build fails.

use crate::cli::RuntimeConfig;
use crate::config::{CONFIG_FILE_NAME, SecureConfig};
use crate::error::{CliError, Result, SecureError};
use crate::git::{GitOperations, RemoteHandle};
use crate::pipeline::plan::{ReleaseRequest, TagStyle};
use crate::pipeline::step::{RunReport, Step};
use crate::secure::{
    RemovalSummary, StripPolicy, run_build, snapshot_path, snapshot_tree, write_ignore_rules,
};
use crate::version::{ReleaseMode, write_version_file};
use crate::workspace::{PreflightValidator, WorkspaceHandle};
use chrono::{Local, NaiveDateTime};

/// Drives one secure release
pub struct SecurePipeline<'a, G> {
    workspace: &'a WorkspaceHandle,
    remote: &'a RemoteHandle,
    git: &'a G,
    settings: &'a SecureConfig,
    config: &'a RuntimeConfig,
    backup_dir: std::path::PathBuf,
    keep_extra: Vec<String>,
    started_at: NaiveDateTime,
}

impl<'a, G: GitOperations> SecurePipeline<'a, G> {
    /// Create a pipeline; the snapshot timestamp is taken now
    pub fn new(
        workspace: &'a WorkspaceHandle,
        remote: &'a RemoteHandle,
        git: &'a G,
        settings: &'a SecureConfig,
        config: &'a RuntimeConfig,
    ) -> Self {
        let backup_dir = workspace
            .backup_dir()
            .strip_prefix(workspace.root())
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|_| workspace.backup_dir());
        let mut keep_extra = vec![CONFIG_FILE_NAME.to_string()];
        if let Some(name) = workspace.version_file().file_name() {
            keep_extra.push(name.to_string_lossy().into_owned());
        }
        Self {
            workspace,
            remote,
            git,
            settings,
            config,
            backup_dir,
            keep_extra,
            started_at: Local::now().naive_local(),
        }
    }

    /// Override the snapshot timestamp
    pub fn with_timestamp(mut self, at: NaiveDateTime) -> Self {
        self.started_at = at;
        self
    }

    fn report_removals(&self, step: Step, summary: RemovalSummary, report: &mut RunReport) {
        for (path, reason) in &summary.failed {
            let subject = path.to_string_lossy();
            report.warn(
                step,
                Some(subject.as_ref()),
                format!("Could not remove {}: {}", path.display(), reason),
                self.config,
            );
        }
        self.config.success_println(&format!(
            "{}: removed {} path(s)",
            step,
            summary.removed.len()
        ));
        report.removed.extend(summary.removed);
    }

    /// Execute the secure release; `confirmed` is the operator's explicit consent
    pub async fn run(&self, request: &ReleaseRequest, confirmed: bool) -> Result<RunReport> {
        if !confirmed {
            return Err(SecureError::NotConfirmed.into());
        }
        let (Some(plan), ReleaseMode::Secure) = (request.plan().into_iter().next(), request.mode)
        else {
            return Err(CliError::InvalidArguments {
                reason: "the secure pipeline only runs secure releases".to_string(),
            }
            .into());
        };

        let config = self.config;
        let root = self.workspace.root();
        let mut report = RunReport::default();
        config.section(&format!(
            "{} {}",
            request.mode.name(),
            plan.file_version.as_deref().unwrap_or_default()
        ));

        let preflight = PreflightValidator::new(self.workspace).ensure();
        if let Some(preflight) = report.settle(Step::Preflight, None, preflight, config)? {
            config.success_println(&preflight.summary());
        }

        let url = self.git.remote_url(&self.remote.name).await;
        let url = report
            .settle(Step::ResolveRemote, Some(self.remote.name.as_str()), url, config)?
            .unwrap_or_default();

        let snapshot = match snapshot_path(root, self.started_at) {
            Ok(dest) => match snapshot_tree(root, &dest).await {
                Ok(count) => Ok((dest, count)),
                Err(e) => Err(e),
            },
            Err(e) => Err(e),
        };
        if let Some((dest, count)) = report.settle(Step::Snapshot, None, snapshot, config)? {
            config.success_println(&format!(
                "Snapshot of {} file(s) at {}",
                count,
                dest.display()
            ));
            report.snapshot = Some(dest);
        }

        if let Some(value) = &plan.file_version {
            let path = self.workspace.resolve(self.workspace.version_file());
            report.settle(
                Step::WriteVersion,
                Some(value.as_str()),
                write_version_file(&path, value),
                config,
            )?;
        }

        config.println(&format!("Building: {}", self.settings.build_command.join(" ")));
        let built = run_build(root, &self.settings.build_command).await;
        report.settle(Step::Build, None, built, config)?;
        config.success_println("Build succeeded");

        let policy = StripPolicy::new(self.settings, self.keep_extra.iter().cloned());
        self.report_removals(Step::Strip, policy.strip_sources(root), &mut report);
        self.report_removals(Step::CleanArtifacts, policy.clean_artifacts(root), &mut report);

        let reinit = self
            .git
            .reinitialize(&self.remote.branch, &self.remote.name, &url)
            .await;
        report.settle(Step::ReinitRepository, None, reinit, config)?;
        config.success_println(&format!(
            "Repository reinitialized on {} with {} -> {}",
            self.remote.branch, self.remote.name, url
        ));

        let ignored =
            write_ignore_rules(root, self.settings, &self.keep_extra, &self.backup_dir);
        report.settle(Step::WriteIgnoreRules, None, ignored, config)?;

        let subject = plan.tag.as_ref().map(|t| t.name.as_str());
        let staged = self.git.stage_all().await;
        report.settle(Step::Stage, subject, staged, config)?;

        let commit = self.git.commit(&plan.message).await;
        if let Some(commit) = report.settle(Step::Commit, subject, commit, config)? {
            config.success_println(&format!("Committed: {}", commit.message));
        }

        let pushed = self
            .git
            .push_branch(&self.remote.name, &self.remote.branch, true)
            .await;
        if report
            .settle(Step::PushBranch, Some(self.remote.branch.as_str()), pushed, config)?
            .is_some()
        {
            config.success_println(&format!(
                "Force-pushed {} to {}",
                self.remote.branch, self.remote.name
            ));
        }

        if let Some(tag) = &plan.tag {
            let deleted = self.git.delete_local_tag(&tag.name).await;
            report.settle(Step::DeleteTag, Some(tag.name.as_str()), deleted, config)?;

            let message = match tag.style {
                TagStyle::Annotated => Some(plan.message.as_str()),
                TagStyle::Lightweight => None,
            };
            let created = self.git.create_tag(&tag.name, message).await;
            if report
                .settle(Step::CreateTag, Some(tag.name.as_str()), created, config)?
                .is_some()
            {
                report.tags.push(tag.name.clone());
                let pushed = self
                    .git
                    .push_tag(&self.remote.name, &tag.name, tag.push.is_forced())
                    .await;
                if report
                    .settle(Step::PushTag, Some(tag.name.as_str()), pushed, config)?
                    .is_some()
                {
                    config.success_println(&format!("Pushed tag {}", tag.name));
                }
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::testing::{
        FAKE_REMOTE_URL, RecordingGit, fixture_tree, fixture_tree_with_version, run_at,
    };

    fn settings(build: &[&str]) -> SecureConfig {
        SecureConfig {
            build_command: build.iter().map(|s| s.to_string()).collect(),
            ..SecureConfig::default()
        }
    }

    fn request() -> ReleaseRequest {
        ReleaseRequest::new(ReleaseMode::Secure, Some("3.0.0"), Some("Ship it")).expect("valid")
    }

    #[tokio::test]
    async fn test_unconfirmed_run_touches_nothing() {
        let tree = fixture_tree(&["uxmod.py", "xcore.py", "datax.py"]);
        let git = RecordingGit::default();
        let settings = settings(&["true"]);
        let config = RuntimeConfig::quiet();

        let result = SecurePipeline::new(&tree.workspace, &tree.remote, &git, &settings, &config)
            .run(&request(), false)
            .await;

        assert!(result.is_err());
        assert!(git.calls().is_empty());
        assert!(tree.path("uxmod.py").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_build_failure_stops_before_stripping() {
        let tree = fixture_tree(&["uxmod.py", "xcore.py", "datax.py"]);
        let git = RecordingGit::default();
        let settings = settings(&["false"]);
        let config = RuntimeConfig::quiet();

        let err = SecurePipeline::new(&tree.workspace, &tree.remote, &git, &settings, &config)
            .with_timestamp(run_at())
            .run(&request(), true)
            .await
            .expect_err("build fails");

        assert!(err.to_string().contains("Build command"));
        assert!(tree.path("uxmod.py").exists());
        assert_eq!(git.calls(), vec![format!("remote_url origin")]);
        let snapshot = snapshot_path(&tree.root, run_at()).expect("path");
        assert!(snapshot.join("uxmod.py").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_secure_release_end_to_end() {
        let tree = fixture_tree(&["uxmod.py", "xcore.py", "datax.py", "main.py"]);
        tree.write("uxmod.so", "binary");
        tree.write("uxmod.c", "generated");
        tree.write("core/engine.py", "engine");
        tree.write("core/__pycache__/engine.pyc", "cache");
        let git = RecordingGit::default();
        let settings = settings(&["true"]);
        let config = RuntimeConfig::quiet();

        let report = SecurePipeline::new(&tree.workspace, &tree.remote, &git, &settings, &config)
            .with_timestamp(run_at())
            .run(&request(), true)
            .await
            .expect("secure release");

        assert!(!tree.path("uxmod.py").exists());
        assert!(!tree.path("uxmod.c").exists());
        assert!(!tree.path("core/engine.py").exists());
        assert!(!tree.path("core/__pycache__").exists());
        assert!(tree.path("uxmod.so").exists());
        assert!(tree.path("main.py").exists());
        assert_eq!(
            std::fs::read_to_string(tree.path("version.py")).expect("version"),
            "__version__ = \"3.0.0\""
        );
        assert!(tree.path(".gitignore").exists());

        assert_eq!(
            git.calls(),
            vec![
                "remote_url origin".to_string(),
                format!("reinitialize main origin {FAKE_REMOTE_URL}"),
                "stage_all".to_string(),
                "commit v3.0.0 - Ship it (Secure Build)".to_string(),
                "push_branch origin main --force".to_string(),
                "delete_tag v3.0.0".to_string(),
                "create_tag v3.0.0 annotated".to_string(),
                "push_tag origin v3.0.0 --force".to_string(),
            ]
        );
        assert_eq!(report.tags, vec!["v3.0.0"]);

        let snapshot = report.snapshot.expect("snapshot");
        assert!(snapshot.join("uxmod.py").exists());
        assert!(snapshot.join("core/engine.py").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_configured_version_file_survives_stripping() {
        let tree = fixture_tree_with_version(
            &["uxmod.py", "xcore.py", "datax.py"],
            "app_version.py",
        );
        let git = RecordingGit::default();
        let settings = settings(&["true"]);
        let config = RuntimeConfig::quiet();

        SecurePipeline::new(&tree.workspace, &tree.remote, &git, &settings, &config)
            .with_timestamp(run_at())
            .run(&request(), true)
            .await
            .expect("secure release");

        assert_eq!(
            std::fs::read_to_string(tree.path("app_version.py")).expect("version"),
            "__version__ = \"3.0.0\""
        );
        assert!(!tree.path("uxmod.py").exists());
        let rules = std::fs::read_to_string(tree.path(".gitignore")).expect("ignore rules");
        assert!(rules.lines().any(|l| l == "!app_version.py"), "{rules}");
    }
}
