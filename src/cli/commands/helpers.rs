//! Shared helper functions for command execution.

use crate::cli::{Args, RuntimeConfig};
use crate::config::{EnvConfig, ProjectConfig};
use crate::error::Result;
use crate::git::{GitOperations, RemoteHandle, SystemGit};
use crate::github::{DispatchOutcome, RepoSlug};
use crate::pipeline::{RunReport, StepOutcome};
use crate::workspace::{PreflightValidator, WorkspaceHandle};

/// Everything a command needs before a pipeline starts
pub(super) struct ReleaseSetup {
    pub project: ProjectConfig,
    pub env: EnvConfig,
    pub workspace: WorkspaceHandle,
    pub remote: RemoteHandle,
    pub git: SystemGit,
}

/// Load configuration, check required entries, then open the repository.
///
/// Required entries are checked before git is touched, so a failed preflight
/// runs no VCS command at all.
pub(super) async fn prepare(args: &Args) -> Result<ReleaseSetup> {
    let project = ProjectConfig::load(&args.root, args.config.as_deref())?;
    let env = EnvConfig::from_env();
    let workspace = WorkspaceHandle::from_config(&args.root, &project)?;
    PreflightValidator::new(&workspace).ensure()?;

    let git = SystemGit::open(&args.root).await?;
    let repository = match &project.repository {
        Some(slug) => Some(RepoSlug::parse(slug)?),
        None => match git.remote_url(&project.remote).await {
            Ok(url) => RepoSlug::from_remote_url(&url)
                .inspect_err(|e| log::debug!("Remote is not a GitHub URL: {}", e))
                .ok(),
            Err(e) => {
                log::debug!("Could not read remote '{}': {}", project.remote, e);
                None
            }
        },
    };
    let remote = RemoteHandle::new(&project.remote, &project.branch).with_repository(repository);

    Ok(ReleaseSetup {
        project,
        env,
        workspace,
        remote,
        git,
    })
}

/// Prompt user for confirmation with y/n input
pub(super) fn prompt_confirmation(prompt: &str) -> std::io::Result<bool> {
    use std::io::Write;

    print!("{} [y/N]: ", prompt);
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;

    let response = input.trim().to_lowercase();
    Ok(matches!(response.as_str(), "y" | "yes"))
}

/// Print the end-of-run summary
pub(super) fn print_report(config: &RuntimeConfig, report: &RunReport) {
    config.section("Summary");

    if !report.tags.is_empty() {
        config.println(&format!("Tags: {}", report.tags.join(", ")));
    }
    if !report.backups.is_empty() {
        config.println(&format!("Backups: {}", report.backups.len()));
    }
    if let Some(snapshot) = &report.snapshot {
        config.println(&format!("Snapshot: {}", snapshot.display()));
    }
    if !report.removed.is_empty() {
        config.println(&format!("Removed: {} path(s)", report.removed.len()));
    }
    for restored in &report.restored {
        config.indent(&format!("restored {}", restored.display()));
    }
    match &report.dispatch {
        Some(DispatchOutcome::Cli) => config.println("Dispatch: gh CLI"),
        Some(DispatchOutcome::Api) => config.println("Dispatch: REST API"),
        Some(DispatchOutcome::Manual { url, .. }) => config.println(&format!(
            "Dispatch: manual{}",
            url.as_deref().map(|u| format!(" ({u})")).unwrap_or_default()
        )),
        None => {}
    }

    let warnings = report.warnings();
    if warnings.is_empty() {
        config.success_println("Completed without warnings");
    } else {
        config.warning_println(&format!("Completed with {} warning(s):", warnings.len()));
        for record in &report.steps {
            if let StepOutcome::Warning(message) = &record.outcome {
                config.indent(&format!("{}: {}", record.step, message));
            }
        }
    }
}
