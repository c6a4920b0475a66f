//! Stable, beta, paired-beta and special release commands.

use super::helpers::{ReleaseSetup, prepare, print_report};
use crate::cli::{Args, Command, RuntimeConfig};
use crate::error::Result;
use crate::github::GitHubDispatcher;
use crate::pipeline::{
    FixedDelay, NoWait, ReleaseOrchestrator, ReleaseRequest, RunReport, WaitStrategy,
};

/// Build the release request for a command
pub(super) fn build_request(command: &Command) -> Result<ReleaseRequest> {
    let mode = command.mode();
    let request = match command {
        Command::Release {
            version,
            message,
            lightweight_tag,
            publish,
        } => ReleaseRequest::new(mode, Some(version.as_str()), message.as_deref())?
            .with_lightweight_tag(*lightweight_tag)
            .with_commit_all(publish.all)
            .with_dispatch(publish.dispatch),
        Command::ReleaseBeta {
            version,
            message,
            create_old_version,
            old_reason,
            publish,
        } => ReleaseRequest::new(mode, Some(version.as_str()), message.as_deref())?
            .with_create_old_version(*create_old_version)
            .with_old_reason(old_reason.as_deref())
            .with_commit_all(publish.all)
            .with_dispatch(publish.dispatch),
        Command::ReleaseBetaOldPair {
            version,
            message,
            old_reason,
            publish,
        } => ReleaseRequest::new(mode, Some(version.as_str()), message.as_deref())?
            .with_old_reason(old_reason.as_deref())
            .with_commit_all(publish.all)
            .with_dispatch(publish.dispatch),
        Command::ReleaseSpecial {
            message,
            tag_version,
            dispatch,
        } => ReleaseRequest::new(mode, tag_version.as_deref(), message.as_deref())?
            .with_dispatch(*dispatch),
        Command::SecureRelease {
            version, message, ..
        } => ReleaseRequest::new(mode, Some(version.as_str()), message.as_deref())?,
    };
    Ok(request)
}

/// Execute a non-secure release command
pub(super) async fn execute_release(args: &Args, config: &RuntimeConfig) -> Result<i32> {
    let request = build_request(&args.command)?;
    let setup = prepare(args).await?;
    let dispatcher = GitHubDispatcher::new(
        setup.workspace.root(),
        setup.remote.repository.clone(),
        &setup.env,
        true,
    );

    let report = if args.no_wait {
        run(&setup, &dispatcher, &NoWait, &request, config).await?
    } else {
        let delay = setup
            .project
            .wait_duration(request.mode.is_beta(), &setup.env);
        run(&setup, &dispatcher, &FixedDelay::new(delay), &request, config).await?
    };

    print_report(config, &report);
    Ok(0)
}

async fn run<W: WaitStrategy>(
    setup: &ReleaseSetup,
    dispatcher: &GitHubDispatcher,
    wait: &W,
    request: &ReleaseRequest,
    config: &RuntimeConfig,
) -> Result<RunReport> {
    ReleaseOrchestrator::new(
        &setup.workspace,
        &setup.remote,
        &setup.git,
        dispatcher,
        wait,
        config,
    )
    .with_workflow(&setup.project.workflow)
    .run(request)
    .await
}
