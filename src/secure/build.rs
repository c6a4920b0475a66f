//! Native module build step.

use crate::error::{Result, SecureError};
use std::path::Path;
use tokio::process::Command;

/// Lines of build stderr kept in the error
const STDERR_TAIL_LINES: usize = 20;

/// Run the configured build command in `root`
pub async fn run_build(root: &Path, command: &[String]) -> Result<()> {
    let (program, args) = command.split_first().ok_or(SecureError::NoBuildCommand)?;
    let display = command.join(" ");
    log::info!("Running build: {}", display);

    let output = Command::new(program)
        .args(args)
        .current_dir(root)
        .output()
        .await
        .map_err(|e| SecureError::BuildFailed {
            command: display.clone(),
            reason: e.to_string(),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let lines: Vec<&str> = stderr.lines().collect();
        let tail = lines[lines.len().saturating_sub(STDERR_TAIL_LINES)..].join("\n");
        let reason = if tail.trim().is_empty() {
            format!("exited with {}", output.status)
        } else {
            tail
        };
        return Err(SecureError::BuildFailed {
            command: display,
            reason,
        }
        .into());
    }

    Ok(())
}
