//! Secure (compiled-only) release command.

use super::helpers::{prepare, print_report, prompt_confirmation};
use super::release::build_request;
use crate::cli::{Args, Command, RuntimeConfig};
use crate::error::Result;
use crate::pipeline::SecurePipeline;

/// Execute `secure-release`
pub(super) async fn execute_secure(args: &Args, config: &RuntimeConfig) -> Result<i32> {
    let request = build_request(&args.command)?;
    let confirmed_by_flag = matches!(args.command, Command::SecureRelease { yes: true, .. });
    let setup = prepare(args).await?;

    config.warning_println("Secure release deletes source files and erases git history.");
    config.indent(&format!(
        "A full snapshot is written next to {} before anything is removed.",
        setup.workspace.root().display()
    ));
    let confirmed = confirmed_by_flag
        || prompt_confirmation("Continue with the secure release?").unwrap_or_else(|e| {
            log::warn!("Could not read confirmation: {}", e);
            false
        });

    let report = SecurePipeline::new(
        &setup.workspace,
        &setup.remote,
        &setup.git,
        &setup.project.secure,
        config,
    )
    .run(&request, confirmed)
    .await?;

    print_report(config, &report);
    Ok(0)
}
